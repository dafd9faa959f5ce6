//! # Tiles
//!
//! A tile is the immutable content of one grid cell: a catalog name and a walkable flag.

use serde::{Deserialize, Serialize};

/// Name of the sentinel tile used for unset cells and out-of-bounds lookups.
pub const EMPTY_TILE: &str = "Empty";

/// One grid cell's content.
///
/// Tiles compare by name and walkability. Two tiles are "the same type" for autotiling
/// when their names match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tile {
    /// Catalog name of the tile
    pub name: String,
    /// Whether actors can stand on this tile
    pub walkable: bool,
}

impl Tile {
    /// Creates a tile with an explicit name and walkability.
    pub fn new(name: impl Into<String>, walkable: bool) -> Self {
        Self {
            name: name.into(),
            walkable,
        }
    }

    /// The sentinel tile returned for unset cells and out-of-bounds queries.
    ///
    /// # Examples
    ///
    /// ```
    /// use tileplan::Tile;
    ///
    /// let empty = Tile::empty();
    /// assert!(empty.is_empty());
    /// assert!(!empty.walkable);
    /// ```
    pub fn empty() -> Self {
        Self::new(EMPTY_TILE, false)
    }

    /// Checks whether this is the sentinel tile.
    pub fn is_empty(&self) -> bool {
        self.name == EMPTY_TILE
    }

    /// Checks whether two tiles share a type.
    pub fn same_type(&self, other: &Tile) -> bool {
        self.name == other.name
    }
}

impl Default for Tile {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Display for Tile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tile_is_empty() {
        assert_eq!(Tile::default(), Tile::empty());
        assert_eq!(Tile::default().to_string(), "Empty");
    }

    #[test]
    fn test_same_type_ignores_walkability() {
        let a = Tile::new("Dirt", true);
        let b = Tile::new("Dirt", false);
        assert!(a.same_type(&b));
        assert_ne!(a, b);
        assert!(!a.same_type(&Tile::new("Grass", true)));
    }
}
