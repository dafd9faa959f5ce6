//! # Utilities Module
//!
//! Deterministic randomness and grid pathfinding shared by every planning stage.

pub mod pathfinding;
pub mod random;

pub use self::pathfinding::*;
pub use random::*;
