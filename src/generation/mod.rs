//! # Generation Module
//!
//! Procedural level generation: planner stages, the chain that runs them, the
//! population planners, and the retrying `plan` entry point.
//!
//! A level recipe is an ordered chain of stages over one shared [`MetaPlan`]. One
//! [`InitialMapPlanner`] runs first, then every [`MetaMapPlanner`] in registration order.
//! Stage order is itself the recipe; there is no rollback.

pub mod big_room;
pub mod caves;
pub mod chain;
pub mod encounters;
pub mod forest;
pub mod items;
pub mod layout;
pub mod planner;
pub mod portals;
pub mod props;
pub mod rooms;
pub mod ruins;
pub mod town;

pub use big_room::*;
pub use caves::*;
pub use chain::*;
pub use encounters::*;
pub use forest::*;
pub use items::*;
pub use layout::*;
pub use planner::*;
pub use portals::*;
pub use props::*;
pub use rooms::*;
pub use ruins::*;
pub use town::*;

use crate::{config, ConfigError, MetaPlan, PlanResult, Position};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for one planning request.
///
/// Controls map size, seeding, the retry policy and population tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Base random seed; attempt `i` uses `seed + i * seed_offset`
    pub seed: u64,
    /// Map width in tiles
    pub width: i32,
    /// Map height in tiles
    pub height: i32,
    /// Current dungeon depth
    pub depth: u32,
    /// Maximum reseeded attempts
    pub max_attempts: u32,
    /// Seed distance between attempts
    pub seed_offset: u64,
    /// Random samples per placement before a population planner gives up
    pub placement_attempts: u32,
    /// Escape portals appear when depth is a multiple of this
    pub escape_portal_interval: u32,
    /// Depth from which one extra item is placed
    pub item_bonus_depth: u32,
    /// Minimum hostile NPCs
    pub enemy_base: u32,
    /// Up to this many additional hostile NPCs
    pub enemy_extra: u32,
    /// Minimum items
    pub item_base: u32,
    /// Up to this many additional items
    pub item_extra: u32,
}

impl GenerationConfig {
    /// Creates a default configuration with the given seed.
    ///
    /// # Examples
    ///
    /// ```
    /// use tileplan::GenerationConfig;
    ///
    /// let config = GenerationConfig::new(7);
    /// assert_eq!(config.seed, 7);
    /// assert!(config.validate().is_ok());
    /// ```
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            width: config::DEFAULT_MAP_WIDTH,
            height: config::DEFAULT_MAP_HEIGHT,
            depth: 1,
            max_attempts: config::DEFAULT_MAX_ATTEMPTS,
            seed_offset: config::DEFAULT_SEED_OFFSET,
            placement_attempts: config::DEFAULT_PLACEMENT_ATTEMPTS,
            escape_portal_interval: config::ESCAPE_PORTAL_INTERVAL,
            item_bonus_depth: config::ITEM_BONUS_DEPTH,
            enemy_base: 3,
            enemy_extra: 4,
            item_base: 2,
            item_extra: 3,
        }
    }

    /// Creates a configuration for testing with smaller, sparser levels.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            width: 40,
            height: 24,
            enemy_base: 1,
            enemy_extra: 2,
            item_base: 1,
            item_extra: 1,
            ..Self::new(seed)
        }
    }

    /// Returns a copy with a different size.
    pub fn with_size(mut self, width: i32, height: i32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Returns a copy for a different depth.
    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    /// Seed used by a 0-based attempt index.
    pub fn attempt_seed(&self, attempt: u32) -> u64 {
        self.seed
            .wrapping_add((attempt as u64).wrapping_mul(self.seed_offset))
    }

    /// Checks that every value is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width < config::MIN_MAP_SIDE
            || self.height < config::MIN_MAP_SIDE
            || self.width > config::MAX_MAP_SIDE
            || self.height > config::MAX_MAP_SIDE
        {
            return Err(ConfigError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::InvalidConfig(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        if self.placement_attempts == 0 {
            return Err(ConfigError::InvalidConfig(
                "placement_attempts must be at least 1".to_string(),
            ));
        }
        if self.escape_portal_interval == 0 {
            return Err(ConfigError::InvalidConfig(
                "escape_portal_interval must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Parses a configuration from JSON. Missing fields take default values.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(42)
    }
}

/// Axis-aligned rectangle with inclusive corners.
///
/// Rooms describe the layout; the tile grid stays authoritative for occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Room {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Room {
    /// Creates a room from inclusive corners. Swapped corners are reordered.
    ///
    /// # Examples
    ///
    /// ```
    /// use tileplan::{Position, Room};
    ///
    /// let room = Room::new(2, 3, 6, 5);
    /// assert_eq!(room.width(), 5);
    /// assert_eq!(room.height(), 3);
    /// assert_eq!(room.center(), Position::new(4, 4));
    /// ```
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self {
            x1: x1.min(x2),
            y1: y1.min(y2),
            x2: x1.max(x2),
            y2: y1.max(y2),
        }
    }

    /// Creates a room from its top-left corner and size.
    pub fn with_size(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::new(x, y, x + width.max(1) - 1, y + height.max(1) - 1)
    }

    pub fn width(&self) -> i32 {
        self.x2 - self.x1 + 1
    }

    pub fn height(&self) -> i32 {
        self.y2 - self.y1 + 1
    }

    /// Gets the area of the room in tiles.
    pub fn area(&self) -> i32 {
        self.width() * self.height()
    }

    /// Gets the center position of the room.
    pub fn center(&self) -> Position {
        Position::new((self.x1 + self.x2) / 2, (self.y1 + self.y2) / 2)
    }

    /// Checks if a position is inside this room.
    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= self.x1 && pos.x <= self.x2 && pos.y >= self.y1 && pos.y <= self.y2
    }

    /// Checks if this room overlaps with another room.
    pub fn intersects(&self, other: &Room) -> bool {
        self.x1 <= other.x2 && self.x2 >= other.x1 && self.y1 <= other.y2 && self.y2 >= other.y1
    }

    /// The room grown by `margin` tiles on every side.
    pub fn expanded(&self, margin: i32) -> Room {
        Room::new(
            self.x1 - margin,
            self.y1 - margin,
            self.x2 + margin,
            self.y2 + margin,
        )
    }

    /// Checks if a position is on the outermost ring of this room.
    pub fn is_edge(&self, pos: Position) -> bool {
        self.contains(pos)
            && (pos.x == self.x1 || pos.x == self.x2 || pos.y == self.y1 || pos.y == self.y2)
    }

    /// All positions inside the room in row-major order.
    pub fn positions(&self) -> Vec<Position> {
        let mut positions = Vec::with_capacity(self.area().max(0) as usize);
        for y in self.y1..=self.y2 {
            for x in self.x1..=self.x2 {
                positions.push(Position::new(x, y));
            }
        }
        positions
    }

    /// Positions on the room's outermost ring, clockwise from the top-left corner.
    pub fn edge_positions(&self) -> Vec<Position> {
        let mut positions = Vec::new();
        for x in self.x1..=self.x2 {
            positions.push(Position::new(x, self.y1));
        }
        for y in (self.y1 + 1)..=self.y2 {
            positions.push(Position::new(self.x2, y));
        }
        if self.y2 > self.y1 {
            for x in (self.x1..self.x2).rev() {
                positions.push(Position::new(x, self.y2));
            }
        }
        if self.x2 > self.x1 {
            for y in ((self.y1 + 1)..self.y2).rev() {
                positions.push(Position::new(self.x1, y));
            }
        }
        positions
    }
}

/// The first stage of a chain. Runs exactly once.
///
/// Starters usually only record room metadata; drawing is not guaranteed.
pub trait InitialMapPlanner {
    /// Stage name for logging and error context.
    fn name(&self) -> &'static str;

    /// Performs the stage.
    fn plan_initial(&mut self, plan: &mut MetaPlan) -> PlanResult<()>;

    /// Whether this stage places its own progress portal.
    fn places_warp_portal(&self) -> bool {
        false
    }
}

/// A refinement stage that reads and mutates the shared plan.
pub trait MetaMapPlanner {
    /// Stage name for logging and error context.
    fn name(&self) -> &'static str;

    /// Performs the stage.
    fn plan_meta(&mut self, plan: &mut MetaPlan) -> PlanResult<()>;

    /// Whether this stage places its own progress portal.
    fn places_warp_portal(&self) -> bool {
        false
    }
}

/// Utility functions shared by generation algorithms.
pub mod utils {
    use super::*;
    use crate::Tile;
    use ::pathfinding::prelude::bfs_reach;

    /// Carves a straight horizontal run, clamped to the map interior.
    pub fn carve_horizontal(
        plan: &mut MetaPlan,
        y: i32,
        from_x: i32,
        to_x: i32,
        tile: &Tile,
        path: &mut Vec<Position>,
    ) {
        let (start, end) = (from_x.min(to_x), from_x.max(to_x));
        let xs: Vec<i32> = if from_x <= to_x {
            (start..=end).collect()
        } else {
            (start..=end).rev().collect()
        };
        for x in xs {
            carve_interior(plan, Position::new(x, y), tile, path);
        }
    }

    /// Carves a straight vertical run, clamped to the map interior.
    pub fn carve_vertical(
        plan: &mut MetaPlan,
        x: i32,
        from_y: i32,
        to_y: i32,
        tile: &Tile,
        path: &mut Vec<Position>,
    ) {
        let (start, end) = (from_y.min(to_y), from_y.max(to_y));
        let ys: Vec<i32> = if from_y <= to_y {
            (start..=end).collect()
        } else {
            (start..=end).rev().collect()
        };
        for y in ys {
            carve_interior(plan, Position::new(x, y), tile, path);
        }
    }

    /// Carves an L-shaped corridor from `start` to `end` and returns its polyline.
    ///
    /// Cells on the outermost ring are never carved.
    pub fn carve_l_corridor(
        plan: &mut MetaPlan,
        start: Position,
        end: Position,
        horizontal_first: bool,
        tile: &Tile,
    ) -> Vec<Position> {
        let mut path = Vec::new();
        if horizontal_first {
            carve_horizontal(plan, start.y, start.x, end.x, tile, &mut path);
            carve_vertical(plan, end.x, start.y, end.y, tile, &mut path);
        } else {
            carve_vertical(plan, start.x, start.y, end.y, tile, &mut path);
            carve_horizontal(plan, end.y, start.x, end.x, tile, &mut path);
        }
        path
    }

    fn carve_interior(plan: &mut MetaPlan, pos: Position, tile: &Tile, path: &mut Vec<Position>) {
        if !plan.in_bounds(pos) || plan.is_boundary(pos) {
            return;
        }
        if !plan.tile_at(pos).walkable {
            plan.set_tile(pos, tile.clone());
        }
        if path.last() != Some(&pos) {
            path.push(pos);
        }
    }

    /// Rolls a population size: `base` plus a uniform draw from `0..=extra`.
    pub fn roll_count(plan: &mut MetaPlan, base: u32, extra: u32) -> u32 {
        base + plan.rng.int_range(extra.min(i32::MAX as u32 - 1) as i32 + 1) as u32
    }

    /// Clamps a position into the map interior (one tile in from every edge).
    pub fn clamp_to_interior(plan: &MetaPlan, pos: Position) -> Position {
        let max_x = (plan.width() - 2).max(1);
        let max_y = (plan.height() - 2).max(1);
        Position::new(pos.x.clamp(1, max_x), pos.y.clamp(1, max_y))
    }

    /// Groups walkable cells into 4-connected regions, largest first.
    ///
    /// Ties keep row-major discovery order.
    pub fn walkable_regions(plan: &MetaPlan) -> Vec<Vec<Position>> {
        let mut seen = vec![false; plan.tiles().len()];
        let mut regions = Vec::new();

        for start in plan.positions() {
            let Some(start_index) = plan.index_of(start) else {
                continue;
            };
            if seen[start_index] || !plan.is_walkable(start) {
                continue;
            }

            let region: Vec<Position> = bfs_reach(start, |pos| {
                pos.cardinal_adjacent_positions()
                    .into_iter()
                    .filter(|&next| plan.is_walkable(next))
                    .collect::<Vec<_>>()
            })
            .collect();
            for pos in &region {
                if let Some(index) = plan.index_of(*pos) {
                    seen[index] = true;
                }
            }
            regions.push(region);
        }

        regions.sort_by(|a, b| b.len().cmp(&a.len()));
        regions
    }

    /// Smallest room enclosing a set of positions.
    pub fn bounding_room(positions: &[Position]) -> Option<Room> {
        let first = positions.first()?;
        let mut room = Room::new(first.x, first.y, first.x, first.y);
        for pos in positions {
            room.x1 = room.x1.min(pos.x);
            room.y1 = room.y1.min(pos.y);
            room.x2 = room.x2.max(pos.x);
            room.y2 = room.y2.max(pos.y);
        }
        Some(room)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::{MetaPlan, StaticCatalog};
    use std::sync::Arc;

    /// Creates an empty plan with the built-in catalog attached.
    pub fn catalog_plan(width: i32, height: i32, seed: u64) -> MetaPlan {
        MetaPlan::new(width, height, seed, 1)
            .unwrap()
            .with_catalog(Arc::new(StaticCatalog::builtin()))
    }

    /// Renders the grid with '.' for walkable and '#' for blocked cells.
    pub fn walkability_rows(plan: &MetaPlan) -> Vec<String> {
        (0..plan.height())
            .map(|y| {
                (0..plan.width())
                    .map(|x| {
                        if plan.is_walkable(crate::Position::new(x, y)) {
                            '.'
                        } else {
                            '#'
                        }
                    })
                    .collect()
            })
            .collect()
    }
}
