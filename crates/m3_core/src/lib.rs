//! # m3_core - Deterministic Match-3 Puzzle Simulation Engine
//!
//! This library provides the headless, tick-driven simulation core of a
//! match-3 puzzle game: board state, swap/tap commands, match detection,
//! power-up generation and chaining, gravity and refill, layered cells,
//! objectives, and an ordered event stream sufficient to drive any renderer
//! or to replay a session byte-for-byte from a seed plus command log.
//!
//! ## Features
//! - 100% deterministic simulation (same seed + commands = same events)
//! - Fixed-timestep tick pipeline, single-threaded, no suspension points
//! - Snapshot/restore and versioned session recordings
//! - Collaborator traits for initial fill and refill spawn models

// Allow unused code for features under development
#![allow(dead_code)]
// Game engine internals pass wide mutable contexts around
#![allow(clippy::too_many_arguments)]
// Loop style - can fix incrementally
#![allow(clippy::needless_range_loop)]

pub mod engine;
pub mod error;
pub mod level;
pub mod replay;

// Re-export the host-facing API surface
pub use engine::{
    BombKind, Cover, CoverKind, DestroyReason, EventBase, GameBoard, GameEvent, GameState,
    GameStateSnapshot, GridDims, Ground, GroundKind, LevelStatus, MatchShape, ObjectiveSlot,
    ObjectiveTarget, Pos, RngDomain, SeedManager, SimEngine, SnapshotError, SpawnContext,
    SpawnModel, SwapPhase, Tile, TileColor, TileGenerator, TileId, XorShift64, SWAP_DURATION,
    TICK_DT,
};
pub use error::{Result, SimError};
pub use level::{LevelConfig, ObjectiveConfig};
pub use replay::{Command, GameRecording, RecordedCommand, ReplayError};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const SCHEMA_VERSION: u8 = 1;
