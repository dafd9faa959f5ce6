//! # MetaPlan
//!
//! The mutable working state threaded through every planning stage: the tile grid,
//! descriptive room and corridor metadata, and the population lists.

use crate::{ConfigError, Direction, Position, RandomSource, Room, Tile, TileCatalog};
use log::trace;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Kind of warp portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WarpKind {
    /// Leads deeper; every playable level has at least one
    Next,
    /// Leaves the dungeon; at most one per level
    Escape,
}

/// A planned warp portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarpPortal {
    pub position: Position,
    pub kind: WarpKind,
}

/// How an NPC behaves towards the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NpcDisposition {
    Hostile,
    Conversation,
}

/// A planned NPC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NpcPlacement {
    pub position: Position,
    pub name: String,
    pub disposition: NpcDisposition,
}

/// A planned item or prop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub position: Position,
    pub name: String,
}

impl Placement {
    pub fn new(position: Position, name: impl Into<String>) -> Self {
        Self {
            position,
            name: name.into(),
        }
    }
}

/// Everything placed on top of the terrain.
///
/// On successful planning no two entries across portals, NPCs, items, props and doors
/// share a coordinate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Population {
    pub warp_portals: Vec<WarpPortal>,
    pub npcs: Vec<NpcPlacement>,
    pub items: Vec<Placement>,
    pub props: Vec<Placement>,
    pub doors: Vec<Position>,
}

impl Population {
    /// Checks whether anything is planned at `pos`.
    pub fn is_occupied(&self, pos: Position) -> bool {
        self.warp_portals.iter().any(|portal| portal.position == pos)
            || self.npcs.iter().any(|npc| npc.position == pos)
            || self.items.iter().any(|item| item.position == pos)
            || self.props.iter().any(|prop| prop.position == pos)
            || self.doors.contains(&pos)
    }

    /// Checks whether a portal of the given kind is planned.
    pub fn has_portal(&self, kind: WarpKind) -> bool {
        self.warp_portals.iter().any(|portal| portal.kind == kind)
    }

    /// Number of portals of the given kind.
    pub fn portal_count(&self, kind: WarpKind) -> usize {
        self.warp_portals
            .iter()
            .filter(|portal| portal.kind == kind)
            .count()
    }

    /// All occupied coordinates, in list order (portals, NPCs, items, props, doors).
    pub fn occupied_positions(&self) -> Vec<Position> {
        self.warp_portals
            .iter()
            .map(|portal| portal.position)
            .chain(self.npcs.iter().map(|npc| npc.position))
            .chain(self.items.iter().map(|item| item.position))
            .chain(self.props.iter().map(|prop| prop.position))
            .chain(self.doors.iter().copied())
            .collect()
    }
}

/// Mutable in-progress level description.
///
/// The grid always holds exactly `width * height` tiles, indexed `y * width + x`.
pub struct MetaPlan {
    width: i32,
    height: i32,
    tiles: Vec<Tile>,
    depth: u32,
    catalog: Option<Arc<dyn TileCatalog>>,
    empty: Tile,
    /// Room rectangles; descriptive only
    pub rooms: Vec<Room>,
    /// Corridor polylines; descriptive only
    pub corridors: Vec<Vec<Position>>,
    /// Portals, NPCs, items, props and doors
    pub population: Population,
    /// Preferred player start set by fixed layouts
    pub player_start_hint: Option<Position>,
    /// Random stream for this attempt
    pub rng: RandomSource,
}

impl std::fmt::Debug for MetaPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetaPlan")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("depth", &self.depth)
            .field("seed", &self.rng.seed())
            .field("rooms", &self.rooms.len())
            .field("population", &self.population)
            .field("has_catalog", &self.catalog.is_some())
            .finish()
    }
}

impl MetaPlan {
    /// Creates an all-`Empty` plan with no catalog attached.
    ///
    /// # Examples
    ///
    /// ```
    /// use tileplan::MetaPlan;
    ///
    /// let plan = MetaPlan::new(10, 4, 1, 0).unwrap();
    /// assert_eq!(plan.tiles().len(), 40);
    /// assert!(plan.tiles().iter().all(|tile| tile.is_empty()));
    /// ```
    pub fn new(width: i32, height: i32, seed: u64, depth: u32) -> Result<Self, ConfigError> {
        let cells = match width.checked_mul(height) {
            Some(cells) if width > 0 && height > 0 => cells as usize,
            _ => return Err(ConfigError::InvalidDimensions { width, height }),
        };

        Ok(Self {
            width,
            height,
            tiles: vec![Tile::empty(); cells],
            depth,
            catalog: None,
            empty: Tile::empty(),
            rooms: Vec::new(),
            corridors: Vec::new(),
            population: Population::default(),
            player_start_hint: None,
            rng: RandomSource::new(seed),
        })
    }

    /// Attaches the tile catalog.
    pub fn attach_catalog(&mut self, catalog: Arc<dyn TileCatalog>) {
        self.catalog = Some(catalog);
    }

    /// Builder form of [`MetaPlan::attach_catalog`].
    pub fn with_catalog(mut self, catalog: Arc<dyn TileCatalog>) -> Self {
        self.attach_catalog(catalog);
        self
    }

    /// The attached catalog.
    pub fn catalog(&self) -> Result<&dyn TileCatalog, ConfigError> {
        self.catalog.as_deref().ok_or(ConfigError::MissingCatalog)
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Dungeon depth this level is planned for.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// The full grid in row-major order.
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Center cell of the map.
    pub fn center(&self) -> Position {
        Position::new(self.width / 2, self.height / 2)
    }

    /// Checks if a position lies on the grid.
    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.width && pos.y < self.height
    }

    /// Checks if a position lies on the outermost ring.
    pub fn is_boundary(&self, pos: Position) -> bool {
        self.in_bounds(pos)
            && (pos.x == 0 || pos.y == 0 || pos.x == self.width - 1 || pos.y == self.height - 1)
    }

    /// Grid index of a position, or `None` when out of bounds.
    pub fn index_of(&self, pos: Position) -> Option<usize> {
        if self.in_bounds(pos) {
            Some((pos.y * self.width + pos.x) as usize)
        } else {
            None
        }
    }

    /// Position of a grid index.
    pub fn position_of(&self, index: usize) -> Position {
        let index = index as i32;
        Position::new(index % self.width, index / self.width)
    }

    /// Tile at `pos`, or the `Empty` sentinel when out of bounds.
    pub fn tile_at(&self, pos: Position) -> &Tile {
        match self.index_of(pos) {
            Some(index) => &self.tiles[index],
            None => &self.empty,
        }
    }

    /// Replaces the tile at `pos`. Returns false when out of bounds.
    pub fn set_tile(&mut self, pos: Position, tile: Tile) -> bool {
        match self.index_of(pos) {
            Some(index) => {
                self.tiles[index] = tile;
                true
            }
            None => false,
        }
    }

    /// Resolves a tile name through the catalog.
    ///
    /// Fails with a fatal error if no catalog is attached or the name is unknown.
    pub fn generate_tile(&self, name: &str) -> Result<Tile, ConfigError> {
        self.catalog()?
            .generate_tile(name)
            .ok_or_else(|| ConfigError::UnknownTile(name.to_string()))
    }

    /// Sets every cell to `tile`.
    pub fn fill(&mut self, tile: &Tile) {
        trace!("filling {}x{} grid with {}", self.width, self.height, tile);
        for cell in self.tiles.iter_mut() {
            cell.clone_from(tile);
        }
    }

    /// Neighbor in a direction, or `Empty` when out of bounds.
    pub fn neighbor(&self, pos: Position, direction: Direction) -> &Tile {
        self.tile_at(pos.step(direction))
    }

    pub fn up(&self, pos: Position) -> &Tile {
        self.neighbor(pos, Direction::North)
    }

    pub fn down(&self, pos: Position) -> &Tile {
        self.neighbor(pos, Direction::South)
    }

    pub fn left(&self, pos: Position) -> &Tile {
        self.neighbor(pos, Direction::West)
    }

    pub fn right(&self, pos: Position) -> &Tile {
        self.neighbor(pos, Direction::East)
    }

    /// Checks if the tile at `pos` is walkable. Out of bounds is never walkable.
    pub fn is_walkable(&self, pos: Position) -> bool {
        self.tile_at(pos).walkable
    }

    /// Checks the 8-neighborhood for any walkable tile.
    pub fn adjacent_any_floor(&self, pos: Position) -> bool {
        pos.adjacent_positions()
            .iter()
            .any(|&neighbor| self.is_walkable(neighbor))
    }

    /// Counts walkable tiles among the 8 neighbors.
    pub fn walkable_neighbor_count(&self, pos: Position) -> usize {
        pos.adjacent_positions()
            .iter()
            .filter(|&&neighbor| self.is_walkable(neighbor))
            .count()
    }

    /// Checks whether a portal, NPC, item, prop or door is planned at `pos`.
    pub fn is_occupied(&self, pos: Position) -> bool {
        self.population.is_occupied(pos)
    }

    /// Walkable and not already occupied.
    pub fn is_spawnable_tile(&self, pos: Position) -> bool {
        self.is_walkable(pos) && !self.is_occupied(pos)
    }

    /// Samples random cells until a spawnable one is found.
    ///
    /// Returns `None` after `max_attempts` misses.
    pub fn find_spawnable_tile(&mut self, max_attempts: u32) -> Option<Position> {
        for _ in 0..max_attempts {
            let x = self.rng.int_range(self.width);
            let y = self.rng.int_range(self.height);
            let pos = Position::new(x, y);
            if self.is_spawnable_tile(pos) {
                return Some(pos);
            }
        }
        None
    }

    /// Number of cells holding a tile with the given name.
    pub fn count_tiles(&self, name: &str) -> usize {
        self.tiles.iter().filter(|tile| tile.name == name).count()
    }

    /// Number of walkable cells.
    pub fn walkable_count(&self) -> usize {
        self.tiles.iter().filter(|tile| tile.walkable).count()
    }

    /// Iterates over all grid positions in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        let width = self.width;
        let height = self.height;
        (0..height).flat_map(move |y| (0..width).map(move |x| Position::new(x, y)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StaticCatalog;

    fn floor_plan(width: i32, height: i32) -> MetaPlan {
        let mut plan = MetaPlan::new(width, height, 1, 0)
            .unwrap()
            .with_catalog(Arc::new(StaticCatalog::builtin()));
        let floor = plan.generate_tile("Floor").unwrap();
        plan.fill(&floor);
        plan
    }

    #[test]
    fn test_grid_length_matches_dimensions() {
        for (w, h) in [(1, 1), (7, 3), (3, 7), (80, 40)] {
            let plan = MetaPlan::new(w, h, 0, 0).unwrap();
            assert_eq!(plan.tiles().len(), (w * h) as usize);
        }
        assert!(matches!(
            MetaPlan::new(0, 5, 0, 0),
            Err(ConfigError::InvalidDimensions { width: 0, height: 5 })
        ));
    }

    #[test]
    fn test_overflowing_dimensions_are_rejected() {
        assert!(matches!(
            MetaPlan::new(70_000, 70_000, 0, 0),
            Err(ConfigError::InvalidDimensions { width: 70_000, height: 70_000 })
        ));
    }

    #[test]
    fn test_index_layout_is_row_major() {
        let plan = MetaPlan::new(5, 3, 0, 0).unwrap();
        assert_eq!(plan.index_of(Position::new(2, 1)), Some(7));
        assert_eq!(plan.position_of(7), Position::new(2, 1));
        assert_eq!(plan.index_of(Position::new(5, 0)), None);
        assert_eq!(plan.index_of(Position::new(0, -1)), None);
    }

    #[test]
    fn test_neighbors_out_of_bounds_return_empty() {
        let plan = floor_plan(3, 3);
        let corner = Position::new(0, 0);
        assert!(plan.up(corner).is_empty());
        assert!(plan.left(corner).is_empty());
        assert_eq!(plan.right(corner).name, "Floor");
        assert_eq!(plan.down(corner).name, "Floor");
        assert!(plan.tile_at(Position::new(9, 9)).is_empty());
    }

    #[test]
    fn test_generate_tile_requires_catalog() {
        let plan = MetaPlan::new(3, 3, 0, 0).unwrap();
        assert!(matches!(
            plan.generate_tile("Floor"),
            Err(ConfigError::MissingCatalog)
        ));

        let plan = floor_plan(3, 3);
        assert!(matches!(
            plan.generate_tile("Lava"),
            Err(ConfigError::UnknownTile(name)) if name == "Lava"
        ));
    }

    #[test]
    fn test_adjacent_any_floor_checks_diagonals() {
        let mut plan = MetaPlan::new(3, 3, 0, 0)
            .unwrap()
            .with_catalog(Arc::new(StaticCatalog::builtin()));
        let wall = plan.generate_tile("Wall").unwrap();
        plan.fill(&wall);
        assert!(!plan.adjacent_any_floor(Position::new(1, 1)));

        let floor = plan.generate_tile("Floor").unwrap();
        plan.set_tile(Position::new(2, 2), floor);
        assert!(plan.adjacent_any_floor(Position::new(1, 1)));
        assert!(!plan.adjacent_any_floor(Position::new(0, 0)));
    }

    #[test]
    fn test_spawnable_excludes_occupied_tiles() {
        let mut plan = floor_plan(4, 4);
        let pos = Position::new(1, 2);
        assert!(plan.is_spawnable_tile(pos));

        plan.population.items.push(Placement::new(pos, "Dagger"));
        assert!(!plan.is_spawnable_tile(pos));

        plan.population.doors.push(Position::new(3, 3));
        assert!(!plan.is_spawnable_tile(Position::new(3, 3)));
        assert!(!plan.is_spawnable_tile(Position::new(4, 0)));
    }

    #[test]
    fn test_find_spawnable_tile_gives_up() {
        let mut plan = MetaPlan::new(4, 4, 3, 0).unwrap();
        assert!(plan.find_spawnable_tile(200).is_none());

        let mut plan = floor_plan(4, 4);
        let found = plan.find_spawnable_tile(200).unwrap();
        assert!(plan.is_spawnable_tile(found));
    }

    #[test]
    fn test_population_occupancy_queries() {
        let mut population = Population::default();
        population.warp_portals.push(WarpPortal {
            position: Position::new(1, 1),
            kind: WarpKind::Next,
        });
        population.npcs.push(NpcPlacement {
            position: Position::new(2, 2),
            name: "Rat".into(),
            disposition: NpcDisposition::Hostile,
        });
        assert!(population.has_portal(WarpKind::Next));
        assert!(!population.has_portal(WarpKind::Escape));
        assert_eq!(population.portal_count(WarpKind::Next), 1);
        assert!(population.is_occupied(Position::new(2, 2)));
        assert_eq!(
            population.occupied_positions(),
            vec![Position::new(1, 1), Position::new(2, 2)]
        );
    }
}
