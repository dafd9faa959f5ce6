//! # Autotiling
//!
//! Post-hoc classifiers over a finished grid, used to pick sprite variants.
//!
//! Both are pure functions of the current grid and are never cached.

use crate::{Direction, MetaPlan, Position};
use serde::{Deserialize, Serialize};

/// Sprite index from a 4-bit same-type neighbor mask (N=1, E=2, S=4, W=8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum AutoTile {
    Isolated = 0,
    Up = 1,
    Right = 2,
    UpRight = 3,
    Down = 4,
    Vertical = 5,
    DownRight = 6,
    VerticalRight = 7,
    Left = 8,
    UpLeft = 9,
    Horizontal = 10,
    HorizontalUp = 11,
    DownLeft = 12,
    VerticalLeft = 13,
    HorizontalDown = 14,
    Center = 15,
}

impl AutoTile {
    /// Maps a mask to its variant; bits above the low four are ignored.
    pub fn from_mask(mask: u8) -> Self {
        match mask & 0x0f {
            0 => AutoTile::Isolated,
            1 => AutoTile::Up,
            2 => AutoTile::Right,
            3 => AutoTile::UpRight,
            4 => AutoTile::Down,
            5 => AutoTile::Vertical,
            6 => AutoTile::DownRight,
            7 => AutoTile::VerticalRight,
            8 => AutoTile::Left,
            9 => AutoTile::UpLeft,
            10 => AutoTile::Horizontal,
            11 => AutoTile::HorizontalUp,
            12 => AutoTile::DownLeft,
            13 => AutoTile::VerticalLeft,
            14 => AutoTile::HorizontalDown,
            _ => AutoTile::Center,
        }
    }

    pub fn index(self) -> u8 {
        self as u8
    }
}

/// Computes the autotile variant of the cell at `pos`.
///
/// A direction's bit is set when the neighbor there has the same tile name. Out of
/// bounds neighbors are the `Empty` sentinel and so only match `Empty` cells.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use tileplan::{calculate_autotile_index, AutoTile, MetaPlan, Position, StaticCatalog};
///
/// let mut plan = MetaPlan::new(3, 3, 0, 0)
///     .unwrap()
///     .with_catalog(Arc::new(StaticCatalog::builtin()));
/// let floor = plan.generate_tile("Floor").unwrap();
/// plan.fill(&floor);
/// assert_eq!(calculate_autotile_index(&plan, Position::new(1, 1)), AutoTile::Center);
/// assert_eq!(calculate_autotile_index(&plan, Position::new(0, 0)), AutoTile::DownRight);
/// ```
pub fn calculate_autotile_index(plan: &MetaPlan, pos: Position) -> AutoTile {
    let tile = plan.tile_at(pos);
    let mask = Direction::CARDINAL
        .iter()
        .filter(|&&direction| plan.neighbor(pos, direction).same_type(tile))
        .fold(0u8, |mask, direction| mask | direction.bit());
    AutoTile::from_mask(mask)
}

/// Orientation of a wall cell relative to the floor next to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WallType {
    /// Floor below
    Top,
    /// Floor above
    Bottom,
    /// Floor to the right
    Left,
    /// Floor to the left
    Right,
    /// Floor below and to the right
    TopLeft,
    /// Floor below and to the left
    TopRight,
    /// Floor above and to the right
    BottomLeft,
    /// Floor above and to the left
    BottomRight,
    Generic,
}

/// Classifies a wall from its walkable orthogonal neighbors.
pub fn classify_wall(plan: &MetaPlan, pos: Position) -> WallType {
    let open = |direction| plan.neighbor(pos, direction).walkable;
    let (n, e, s, w) = (
        open(Direction::North),
        open(Direction::East),
        open(Direction::South),
        open(Direction::West),
    );

    match (n, e, s, w) {
        (false, false, true, false) => WallType::Top,
        (true, false, false, false) => WallType::Bottom,
        (false, true, false, false) => WallType::Left,
        (false, false, false, true) => WallType::Right,
        (false, true, true, false) => WallType::TopLeft,
        (false, false, true, true) => WallType::TopRight,
        (true, true, false, false) => WallType::BottomLeft,
        (true, false, false, true) => WallType::BottomRight,
        _ => WallType::Generic,
    }
}
