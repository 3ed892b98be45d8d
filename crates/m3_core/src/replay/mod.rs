//! Session recording and replay.
//!
//! A `GameRecording` is everything needed to reproduce a session
//! byte-for-byte: the master seed, the initial snapshot, and the ordered
//! command log with the tick each command was issued at. Replaying feeds
//! the commands back through a restored engine at the recorded ticks.

use serde::{Deserialize, Serialize};

use crate::engine::grid::Pos;
use crate::engine::sim::SimEngine;
use crate::engine::snapshot::{GameStateSnapshot, SnapshotError};
use crate::engine::timestep::TICK_DT;

/// Bump when the recording layout changes incompatibly.
pub const RECORDING_VERSION: u8 = 1;

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("Recording version mismatch: expected {expected}, got {found}")]
    VersionMismatch { expected: u8, found: u8 },
    #[error("Snapshot rejected: {0}")]
    Snapshot(#[from] SnapshotError),
    #[error("Command at tick {tick} rejected during replay: {command:?}")]
    CommandRejected { tick: u64, command: Command },
    #[error("Serialization failed: {0}")]
    Serde(#[from] serde_json::Error),
}

/// One player input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    Swap { from: Pos, to: Pos },
    Tap { pos: Pos },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedCommand {
    pub tick: u64,
    #[serde(flatten)]
    pub command: Command,
}

/// A complete recorded session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecording {
    pub version: u8,
    pub master_seed: u64,
    pub initial_snapshot: GameStateSnapshot,
    pub commands: Vec<RecordedCommand>,
}

impl GameRecording {
    pub fn new(master_seed: u64, initial_snapshot: GameStateSnapshot) -> Self {
        GameRecording {
            version: RECORDING_VERSION,
            master_seed,
            initial_snapshot,
            commands: Vec::new(),
        }
    }

    /// Appends a command issued at `tick`. Call with the engine's tick
    /// counter at submission time; command order must be non-decreasing.
    pub fn record(&mut self, tick: u64, command: Command) {
        debug_assert!(
            self.commands.last().map_or(true, |last| last.tick <= tick),
            "commands must be recorded in tick order"
        );
        self.commands.push(RecordedCommand { tick, command });
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, ReplayError> {
        let recording: GameRecording = serde_json::from_str(json)?;
        if recording.version != RECORDING_VERSION {
            return Err(ReplayError::VersionMismatch {
                expected: RECORDING_VERSION,
                found: recording.version,
            });
        }
        Ok(recording)
    }

    /// Rebuilds the engine from the initial snapshot and drives the command
    /// log to completion at the default timestep. Returns the finished
    /// engine (events drained along the way are discarded; callers that
    /// need the stream should step manually).
    pub fn replay(&self) -> Result<SimEngine, ReplayError> {
        let mut engine = SimEngine::restore(self.initial_snapshot.clone(), self.master_seed)?;
        for recorded in &self.commands {
            while engine.tick_count() < recorded.tick {
                engine.tick(TICK_DT);
            }
            let accepted = match recorded.command {
                Command::Swap { from, to } => engine.apply_move(from, to),
                Command::Tap { pos } => engine.handle_tap(pos),
            };
            if !accepted {
                return Err(ReplayError::CommandRejected {
                    tick: recorded.tick,
                    command: recorded.command,
                });
            }
        }
        engine.run_until_stable(10_000);
        Ok(engine)
    }
}
