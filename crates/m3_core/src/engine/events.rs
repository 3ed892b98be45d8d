//! Event stream.
//!
//! Every state change the renderer (or a replay verifier) can observe is
//! emitted as a `GameEvent`. Events are appended in source-order of
//! occurrence within a tick; ties inside one logical step follow scanline
//! order. Two runs with the same seed and command log produce byte-identical
//! serialized event sequences.

use serde::{Deserialize, Serialize};

use super::grid::Pos;
use super::layers::{CoverKind, GroundKind};
use super::objectives::LevelStatus;
use super::tile::{BombKind, TileColor, TileId};

/// Common event metadata: the tick the event was produced in and the
/// replay-stable simulation timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EventBase {
    pub tick: u64,
    pub sim_time: f32,
}

/// Why a tile was destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DestroyReason {
    Match,
    Bomb,
}

/// Swap lifecycle marker on `TilesSwapped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapPhase {
    Committed,
    Reverted,
}

/// Shape classification of a scored match group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchShape {
    Straight3,
    Straight4Horizontal,
    Straight4Vertical,
    Bent5,
    Straight5,
    Square,
}

/// One observable simulation event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GameEvent {
    TileMoved {
        base: EventBase,
        id: TileId,
        from: Pos,
        to: Pos,
    },
    TileDestroyed {
        base: EventBase,
        id: TileId,
        pos: Pos,
        #[serde(skip_serializing_if = "Option::is_none")]
        color: Option<TileColor>,
        reason: DestroyReason,
    },
    TileSpawned {
        base: EventBase,
        id: TileId,
        pos: Pos,
        color: TileColor,
        /// Visual start position, one cell above the grid cell.
        visual_from: (f32, f32),
    },
    TilesSwapped {
        base: EventBase,
        from: Pos,
        to: Pos,
        phase: SwapPhase,
    },
    MatchDetected {
        base: EventBase,
        positions: Vec<Pos>,
        color: TileColor,
        shape: MatchShape,
    },
    BombCreated {
        base: EventBase,
        id: TileId,
        pos: Pos,
        bomb: BombKind,
        #[serde(skip_serializing_if = "Option::is_none")]
        color: Option<TileColor>,
    },
    BombActivated {
        base: EventBase,
        id: TileId,
        pos: Pos,
        bomb: BombKind,
    },
    BombCombo {
        base: EventBase,
        a: Pos,
        b: Pos,
        kind_a: BombKind,
        kind_b: BombKind,
    },
    /// UFO extension shot leaving its origin.
    ProjectileLaunched {
        base: EventBase,
        from: Pos,
        target: Pos,
    },
    ProjectileLanded {
        base: EventBase,
        target: Pos,
    },
    ScoreAdded {
        base: EventBase,
        amount: i32,
        total: i32,
    },
    ComboChanged {
        base: EventBase,
        depth: u32,
    },
    MoveCompleted {
        base: EventBase,
        move_count: u32,
    },
    CoverDestroyed {
        base: EventBase,
        pos: Pos,
        cover: CoverKind,
    },
    GroundDestroyed {
        base: EventBase,
        pos: Pos,
        ground: GroundKind,
    },
    ObjectiveProgress {
        base: EventBase,
        slot: usize,
        current_count: u32,
        target_count: u32,
    },
    LevelCompleted {
        base: EventBase,
        status: LevelStatus,
    },
}

impl GameEvent {
    pub fn base(&self) -> EventBase {
        match self {
            GameEvent::TileMoved { base, .. }
            | GameEvent::TileDestroyed { base, .. }
            | GameEvent::TileSpawned { base, .. }
            | GameEvent::TilesSwapped { base, .. }
            | GameEvent::MatchDetected { base, .. }
            | GameEvent::BombCreated { base, .. }
            | GameEvent::BombActivated { base, .. }
            | GameEvent::BombCombo { base, .. }
            | GameEvent::ProjectileLaunched { base, .. }
            | GameEvent::ProjectileLanded { base, .. }
            | GameEvent::ScoreAdded { base, .. }
            | GameEvent::ComboChanged { base, .. }
            | GameEvent::MoveCompleted { base, .. }
            | GameEvent::CoverDestroyed { base, .. }
            | GameEvent::GroundDestroyed { base, .. }
            | GameEvent::ObjectiveProgress { base, .. }
            | GameEvent::LevelCompleted { base, .. } => *base,
        }
    }
}

/// Append-only in-memory event buffer with an atomic drain.
#[derive(Debug, Default)]
pub struct EventCollector {
    buffer: Vec<GameEvent>,
    tick: u64,
    sim_time: f32,
}

impl EventCollector {
    pub fn new() -> Self {
        EventCollector { buffer: Vec::with_capacity(64), tick: 0, sim_time: 0.0 }
    }

    /// Called by the engine at the top of each tick so emitted events carry
    /// the right timestamp.
    pub fn set_clock(&mut self, tick: u64, sim_time: f32) {
        self.tick = tick;
        self.sim_time = sim_time;
    }

    /// Metadata stamp for the current tick.
    pub fn stamp(&self) -> EventBase {
        EventBase { tick: self.tick, sim_time: self.sim_time }
    }

    pub fn push(&mut self, event: GameEvent) {
        self.buffer.push(event);
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Returns the buffered events and empties the buffer.
    pub fn drain(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.buffer)
    }

    /// Read-only view without draining (used by tests).
    pub fn peek(&self) -> &[GameEvent] {
        &self.buffer
    }
}
