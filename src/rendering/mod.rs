//! # Rendering Module
//!
//! Presentation helpers that read a finished plan: autotile and wall classification for
//! sprite selection, and ASCII output.

pub mod autotile;
pub mod display;

pub use autotile::*;
pub use display::*;
