//! # Catalog Module
//!
//! The static data collaborator consumed by planning: tile definitions and depth-aware
//! weighted spawn tables.
//!
//! Planning only depends on the [`TileCatalog`] trait. [`StaticCatalog`] is an in-memory
//! implementation with a built-in default data set, and can also be deserialized from
//! JSON so hosts can ship their own tables.

use crate::{ConfigError, RandomSource, Tile};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Source of tile definitions and spawn tables.
pub trait TileCatalog {
    /// Looks up a tile by name.
    fn generate_tile(&self, name: &str) -> Option<Tile>;

    /// Looks up a hostile spawn table by name.
    fn enemy_table(&self, name: &str) -> Option<&SpawnTable>;

    /// Looks up an item spawn table by name.
    fn item_table(&self, name: &str) -> Option<&SpawnTable>;
}

/// One weighted entry in a spawn table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnEntry {
    /// Name of the spawned thing
    pub name: String,
    /// Relative weight; zero disables the entry
    pub weight: u32,
    /// Shallowest depth the entry may appear at
    #[serde(default)]
    pub min_depth: u32,
    /// Deepest depth the entry may appear at
    #[serde(default)]
    pub max_depth: Option<u32>,
}

impl SpawnEntry {
    /// Creates an entry available from `min_depth` onwards.
    pub fn new(name: impl Into<String>, weight: u32, min_depth: u32) -> Self {
        Self {
            name: name.into(),
            weight,
            min_depth,
            max_depth: None,
        }
    }

    /// Limits the entry to depths up to and including `max_depth`.
    pub fn until(mut self, max_depth: u32) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    fn available_at(&self, depth: u32) -> bool {
        self.weight > 0
            && depth >= self.min_depth
            && self.max_depth.map_or(true, |max| depth <= max)
    }
}

/// Depth-aware weighted random selection table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpawnTable {
    pub entries: Vec<SpawnEntry>,
}

impl SpawnTable {
    /// Creates a table from entries.
    pub fn new(entries: Vec<SpawnEntry>) -> Self {
        Self { entries }
    }

    /// Sum of weights available at `depth`.
    pub fn total_weight(&self, depth: u32) -> u32 {
        self.entries
            .iter()
            .filter(|entry| entry.available_at(depth))
            .map(|entry| entry.weight)
            .sum()
    }

    /// Picks an entry name by weight, or `None` if nothing is available at `depth`.
    ///
    /// Draws exactly one value from `rng` when anything is available.
    ///
    /// # Examples
    ///
    /// ```
    /// use tileplan::{RandomSource, SpawnEntry, SpawnTable};
    ///
    /// let table = SpawnTable::new(vec![SpawnEntry::new("Rat", 1, 0)]);
    /// let mut rng = RandomSource::new(1);
    /// assert_eq!(table.select_by_weight(&mut rng, 0).as_deref(), Some("Rat"));
    /// ```
    pub fn select_by_weight(&self, rng: &mut RandomSource, depth: u32) -> Option<String> {
        let total = self.total_weight(depth);
        if total == 0 {
            return None;
        }

        let mut roll = rng.int_range(total.min(i32::MAX as u32) as i32) as u32;
        for entry in self.entries.iter().filter(|entry| entry.available_at(depth)) {
            if roll < entry.weight {
                return Some(entry.name.clone());
            }
            roll -= entry.weight;
        }
        None
    }
}

/// In-memory catalog of tiles and spawn tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticCatalog {
    /// Tile definitions keyed by name (value is the walkable flag)
    pub tiles: BTreeMap<String, bool>,
    /// Enemy tables keyed by name
    #[serde(default)]
    pub enemy_tables: BTreeMap<String, SpawnTable>,
    /// Item tables keyed by name
    #[serde(default)]
    pub item_tables: BTreeMap<String, SpawnTable>,
}

impl StaticCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tile definition.
    pub fn with_tile(mut self, name: &str, walkable: bool) -> Self {
        self.tiles.insert(name.to_string(), walkable);
        self
    }

    /// Registers an enemy table.
    pub fn with_enemy_table(mut self, name: &str, table: SpawnTable) -> Self {
        self.enemy_tables.insert(name.to_string(), table);
        self
    }

    /// Registers an item table.
    pub fn with_item_table(mut self, name: &str, table: SpawnTable) -> Self {
        self.item_tables.insert(name.to_string(), table);
        self
    }

    /// Parses a catalog from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a catalog JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// The built-in data set used by the stock planner types.
    ///
    /// # Examples
    ///
    /// ```
    /// use tileplan::{StaticCatalog, TileCatalog};
    ///
    /// let catalog = StaticCatalog::builtin();
    /// assert!(catalog.generate_tile("Floor").unwrap().walkable);
    /// assert!(!catalog.generate_tile("Wall").unwrap().walkable);
    /// assert!(catalog.generate_tile("Lava").is_none());
    /// ```
    pub fn builtin() -> Self {
        Self::new()
            .with_tile(tiles::FLOOR, true)
            .with_tile(tiles::WALL, false)
            .with_tile(tiles::DIRT, true)
            .with_tile(tiles::GRASS, true)
            .with_tile(tiles::TREE, false)
            .with_tile(tiles::WATER, false)
            .with_tile(tiles::RUBBLE, true)
            .with_tile(tiles::ROAD, true)
            .with_tile(tiles::BOULDER, false)
            .with_tile(tiles::CAVE_FLOOR, true)
            .with_tile(tiles::CAVE_WALL, false)
            .with_tile(tiles::RUINED_WALL, false)
            .with_enemy_table(
                tables::DUNGEON_ENEMIES,
                SpawnTable::new(vec![
                    SpawnEntry::new("Rat", 10, 0).until(4),
                    SpawnEntry::new("Goblin", 8, 1),
                    SpawnEntry::new("Skeleton", 5, 3),
                    SpawnEntry::new("Orc", 4, 5),
                    SpawnEntry::new("Wraith", 2, 8),
                ]),
            )
            .with_enemy_table(
                tables::WILD_ENEMIES,
                SpawnTable::new(vec![
                    SpawnEntry::new("Wolf", 8, 0),
                    SpawnEntry::new("Giant Spider", 5, 2),
                    SpawnEntry::new("Bandit", 4, 3),
                    SpawnEntry::new("Troll", 2, 6),
                ]),
            )
            .with_enemy_table(
                tables::TOWNSFOLK,
                SpawnTable::new(vec![
                    SpawnEntry::new("Villager", 6, 0),
                    SpawnEntry::new("Merchant", 2, 0),
                    SpawnEntry::new("Guard", 2, 0),
                ]),
            )
            .with_item_table(
                tables::DUNGEON_ITEMS,
                SpawnTable::new(vec![
                    SpawnEntry::new("Health Potion", 10, 0),
                    SpawnEntry::new("Dagger", 6, 0).until(3),
                    SpawnEntry::new("Short Sword", 5, 2),
                    SpawnEntry::new("Chain Mail", 3, 4),
                    SpawnEntry::new("Scroll of Teleport", 3, 3),
                    SpawnEntry::new("Flame Sword", 1, 7),
                ]),
            )
    }
}

impl TileCatalog for StaticCatalog {
    fn generate_tile(&self, name: &str) -> Option<Tile> {
        self.tiles
            .get(name)
            .map(|&walkable| Tile::new(name, walkable))
    }

    fn enemy_table(&self, name: &str) -> Option<&SpawnTable> {
        self.enemy_tables.get(name)
    }

    fn item_table(&self, name: &str) -> Option<&SpawnTable> {
        self.item_tables.get(name)
    }
}

/// Names of the tiles in the built-in catalog.
pub mod tiles {
    pub const FLOOR: &str = "Floor";
    pub const WALL: &str = "Wall";
    pub const DIRT: &str = "Dirt";
    pub const GRASS: &str = "Grass";
    pub const TREE: &str = "Tree";
    pub const WATER: &str = "Water";
    pub const RUBBLE: &str = "Rubble";
    pub const ROAD: &str = "Road";
    pub const BOULDER: &str = "Boulder";
    pub const CAVE_FLOOR: &str = "CaveFloor";
    pub const CAVE_WALL: &str = "CaveWall";
    pub const RUINED_WALL: &str = "RuinedWall";
}

/// Names of the spawn tables in the built-in catalog.
pub mod tables {
    pub const DUNGEON_ENEMIES: &str = "dungeon";
    pub const WILD_ENEMIES: &str = "wilds";
    pub const TOWNSFOLK: &str = "townsfolk";
    pub const DUNGEON_ITEMS: &str = "dungeon";
}
