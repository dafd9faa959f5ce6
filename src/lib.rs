//! # Tileplan
//!
//! Procedural generation of 2D tile-based level layouts with built-in playability
//! validation.
//!
//! ## Architecture Overview
//!
//! A level is produced by a pipeline of planning stages that all operate on one shared,
//! mutable working grid. The core concepts are:
//!
//! - **RandomSource**: Deterministic seeded random stream driving every decision
//! - **MetaPlan**: The mutable working grid plus room, corridor and population lists
//! - **PlannerChain**: One initial stage followed by ordered refinement stages
//! - **EntityPlan**: The immutable placement list handed to a spawning collaborator
//! - **PathFinder**: Breadth-first search used to prove the level is playable
//!
//! ## Recovery
//!
//! Generation may legitimately produce an unplayable map. [`plan`] detects this with a
//! connectivity check and retries with a reseeded chain, up to a fixed number of
//! attempts. Misconfiguration is never retried.

pub mod catalog;
pub mod generation;
pub mod plan;
pub mod rendering;
pub mod utils;

// Core module re-exports
pub use catalog::*;
pub use generation::*;
pub use plan::*;
pub use rendering::*;
pub use utils::*;

/// Fatal misconfiguration errors.
///
/// These indicate broken setup rather than bad luck and are never retried.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// A tile was requested before any catalog was attached
    #[error("no tile catalog attached to the plan")]
    MissingCatalog,

    /// The catalog does not know the requested tile
    #[error("unknown tile '{0}'")]
    UnknownTile(String),

    /// A planner chain was executed without an initial stage
    #[error("planner chain '{0}' has no starter stage")]
    NoStarter(String),

    /// A string layout contains a character with no mapping
    #[error("unknown layout character '{ch}' at ({x}, {y})")]
    UnknownLayoutChar { ch: char, x: i32, y: i32 },

    /// Tile and entity layout grids disagree in shape
    #[error("layout dimensions mismatch: {0}")]
    LayoutDimensions(String),

    /// A fixed layout is not enclosed by walls
    #[error("layout border is not solid wall at ({x}, {y})")]
    LayoutBorder { x: i32, y: i32 },

    /// A fixed layout must contain exactly one progress warp
    #[error("layout must contain exactly one progress warp, found {0}")]
    LayoutWarpCount(usize),

    /// Requested map size cannot hold a level
    #[error("invalid map dimensions {width}x{height}")]
    InvalidDimensions { width: i32, height: i32 },

    /// No planner type with that name is registered
    #[error("unknown planner type '{0}'")]
    UnknownPlanner(String),

    /// Configuration value out of range
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Recoverable playability failures.
///
/// These trigger a reseeded retry in [`plan`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectivityError {
    /// The player start is missing or not walkable
    #[error("player start {0:?} is not walkable")]
    PlayerPlacement(Option<Position>),

    /// No warp portal has been planned
    #[error("no warp portal planned")]
    NoWarpPortal,

    /// None of the planned portals can be reached from the player start
    #[error("no warp portal reachable from {start:?} ({portals} planned)")]
    Connectivity { start: Position, portals: usize },
}

/// Core error type for the planning pipeline.
#[derive(thiserror::Error, Debug)]
pub enum PlanError {
    /// Broken setup; aborts immediately
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The generated level is not playable
    #[error("connectivity error: {0}")]
    Connectivity(#[from] ConnectivityError),

    /// The finished plan violates a structural invariant
    #[error("invalid plan structure: {0}")]
    Structure(String),

    /// An error raised inside a named planning stage
    #[error("stage '{stage}' failed: {source}")]
    Stage {
        stage: String,
        #[source]
        source: Box<PlanError>,
    },

    /// Every retry attempt failed with a recoverable error
    #[error("planning failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: Box<PlanError>,
    },
}

impl PlanError {
    /// Wraps an error with the name of the stage that raised it.
    pub fn in_stage(stage: &str, source: PlanError) -> Self {
        PlanError::Stage {
            stage: stage.to_string(),
            source: Box::new(source),
        }
    }

    /// Returns true for connectivity-class errors, looking through stage wrappers.
    ///
    /// # Examples
    ///
    /// ```
    /// use tileplan::{ConnectivityError, PlanError};
    ///
    /// let err = PlanError::in_stage("caves", ConnectivityError::NoWarpPortal.into());
    /// assert!(err.is_recoverable());
    /// assert!(!PlanError::Structure("overlap".to_string()).is_recoverable());
    /// ```
    pub fn is_recoverable(&self) -> bool {
        match self {
            PlanError::Connectivity(_) => true,
            PlanError::Stage { source, .. } => source.is_recoverable(),
            _ => false,
        }
    }

    /// Returns the underlying connectivity error, if any.
    pub fn connectivity(&self) -> Option<&ConnectivityError> {
        match self {
            PlanError::Connectivity(err) => Some(err),
            PlanError::Stage { source, .. } | PlanError::RetriesExhausted { source, .. } => {
                source.connectivity()
            }
            _ => None,
        }
    }
}

/// Result type used throughout the Tileplan codebase.
pub type PlanResult<T> = Result<T, PlanError>;

/// Version information for the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Planning configuration constants.
pub mod config {
    /// Default map width in tiles
    pub const DEFAULT_MAP_WIDTH: i32 = 80;

    /// Default map height in tiles
    pub const DEFAULT_MAP_HEIGHT: i32 = 40;

    /// Smallest map either side may have
    pub const MIN_MAP_SIDE: i32 = 8;

    /// Largest map either side may have
    pub const MAX_MAP_SIDE: i32 = 4096;

    /// Maximum number of reseeded attempts in one plan call
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

    /// Seed distance between consecutive attempts
    pub const DEFAULT_SEED_OFFSET: u64 = 7919;

    /// Random samples a population planner may draw before giving up
    pub const DEFAULT_PLACEMENT_ATTEMPTS: u32 = 200;

    /// Escape portals appear on depths that are a multiple of this
    pub const ESCAPE_PORTAL_INTERVAL: u32 = 5;

    /// Depth from which levels hold one extra item
    pub const ITEM_BONUS_DEPTH: u32 = 3;
}
