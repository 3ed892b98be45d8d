//! Objectives and level status.
//!
//! A level carries up to four objective slots. Every destruction increments
//! all matching active slots (at most once per destruction event); progress
//! is monotone and capped at the target. Status is evaluated only after the
//! pipeline stabilizes and is terminal once it leaves `InProgress`.

use serde::{Deserialize, Serialize};

use super::events::{EventCollector, GameEvent};
use super::layers::{CoverKind, GroundKind};
use super::tile::TileColor;

pub const OBJECTIVE_SLOTS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LevelStatus {
    InProgress,
    Victory,
    Defeat,
}

/// What an objective slot counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "layer", rename_all = "snake_case")]
pub enum ObjectiveTarget {
    Tile { color: TileColor },
    Cover { cover: CoverKind },
    Ground { ground: GroundKind },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectiveSlot {
    pub target: ObjectiveTarget,
    pub target_count: u32,
    pub current_count: u32,
}

impl ObjectiveSlot {
    pub fn new(target: ObjectiveTarget, target_count: u32) -> Self {
        ObjectiveSlot { target, target_count, current_count: 0 }
    }

    pub fn is_completed(&self) -> bool {
        self.current_count >= self.target_count
    }
}

/// The four objective slots of a running level.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Objectives {
    pub slots: [Option<ObjectiveSlot>; OBJECTIVE_SLOTS],
}

impl Objectives {
    pub fn new(slots: [Option<ObjectiveSlot>; OBJECTIVE_SLOTS]) -> Self {
        Objectives { slots }
    }

    /// True when every active slot reached its target. A level with no
    /// active slots never completes by objectives.
    pub fn all_completed(&self) -> bool {
        let mut any = false;
        for slot in self.slots.iter().flatten() {
            any = true;
            if !slot.is_completed() {
                return false;
            }
        }
        any
    }

    pub fn on_tile_destroyed(&mut self, color: Option<TileColor>, events: &mut EventCollector) {
        let Some(color) = color else { return };
        self.bump(
            |t| matches!(t, ObjectiveTarget::Tile { color: c } if *c == color),
            events,
        );
    }

    pub fn on_cover_destroyed(&mut self, kind: CoverKind, events: &mut EventCollector) {
        self.bump(
            |t| matches!(t, ObjectiveTarget::Cover { cover } if *cover == kind),
            events,
        );
    }

    pub fn on_ground_destroyed(&mut self, kind: GroundKind, events: &mut EventCollector) {
        self.bump(
            |t| matches!(t, ObjectiveTarget::Ground { ground } if *ground == kind),
            events,
        );
    }

    fn bump<F: Fn(&ObjectiveTarget) -> bool>(&mut self, matches: F, events: &mut EventCollector) {
        for (i, slot) in self.slots.iter_mut().enumerate() {
            let Some(slot) = slot else { continue };
            if slot.is_completed() || !matches(&slot.target) {
                continue;
            }
            slot.current_count += 1;
            let base = events.stamp();
            events.push(GameEvent::ObjectiveProgress {
                base,
                slot: i,
                current_count: slot.current_count,
                target_count: slot.target_count,
            });
        }
    }

    /// Terminal-status evaluation, called once the board has stabilized.
    pub fn evaluate(&self, move_count: u32, move_limit: u32) -> LevelStatus {
        if self.all_completed() {
            LevelStatus::Victory
        } else if move_limit > 0 && move_count >= move_limit {
            LevelStatus::Defeat
        } else {
            LevelStatus::InProgress
        }
    }
}
