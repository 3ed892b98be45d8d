//! State snapshot for replay and checkpointing.
//!
//! A snapshot is the fully serialized mutable state plus the engine clock.
//! The PRNG streams are deliberately excluded: `SimEngine::restore`
//! re-derives them from the master seed. That is exact for recordings
//! because the `Main` stream is only consumed by initial board fill
//! (before the initial snapshot is taken) and the gameplay streams are
//! untouched at that point.

use serde::{Deserialize, Serialize};

use super::state::GameState;

/// Bump when the serialized layout changes incompatibly.
pub const SNAPSHOT_VERSION: u8 = 1;

#[derive(Debug, Clone)]
pub enum SnapshotError {
    VersionMismatch { expected: u8, found: u8 },
    InvalidData(String),
}

impl std::fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SnapshotError::VersionMismatch { expected, found } => {
                write!(f, "Snapshot version mismatch: expected {}, got {}", expected, found)
            }
            SnapshotError::InvalidData(msg) => write!(f, "Invalid snapshot data: {}", msg),
        }
    }
}

impl std::error::Error for SnapshotError {}

/// Complete mutable state at a tick boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameStateSnapshot {
    pub version: u8,
    pub tick: u64,
    pub sim_time: f32,
    pub state: GameState,
}

impl GameStateSnapshot {
    pub fn new(tick: u64, sim_time: f32, state: GameState) -> Self {
        GameStateSnapshot { version: SNAPSHOT_VERSION, tick, sim_time, state }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
