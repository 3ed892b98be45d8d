//! Level configuration.
//!
//! The host hands the engine a `LevelConfig` with flat row-major layer
//! arrays. Empty arrays mean "all default" (generator-filled tiles, no
//! bombs, no covers, no ground). Validation happens up front; a config that
//! passes `validate()` can always be instantiated.
//!
//! Cell encodings:
//! - `grid`: `-1` = hole (permanently unplayable), `0` = generator fill,
//!   `1..=color_count` = fixed color (value − 1).
//! - `bombs`: `0` = none, `1` = horizontal rocket, `2` = vertical rocket,
//!   `3` = area, `4` = color bomb, `5` = UFO.
//! - `covers`: `0` = none, `1` = cage, `2` = chain, `3` = bubble, `4` = ice.
//! - `grounds`: `0` = none, `1` = ice, `2` = jelly, `3` = honey.
//! - `cover_healths` / `ground_healths`: `0` = kind default.

use serde::{Deserialize, Serialize};

use crate::engine::layers::{CoverKind, GroundKind};
use crate::engine::objectives::{ObjectiveTarget, OBJECTIVE_SLOTS};
use crate::engine::tile::BombKind;
use crate::error::{Result, SimError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectiveConfig {
    #[serde(flatten)]
    pub target: ObjectiveTarget,
    pub target_count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LevelConfig {
    pub width: i32,
    pub height: i32,
    pub color_count: u8,
    pub move_limit: u32,
    #[serde(default)]
    pub target_difficulty: f32,
    #[serde(default)]
    pub grid: Vec<i16>,
    #[serde(default)]
    pub bombs: Vec<u8>,
    #[serde(default)]
    pub covers: Vec<u8>,
    #[serde(default)]
    pub cover_healths: Vec<u8>,
    #[serde(default)]
    pub grounds: Vec<u8>,
    #[serde(default)]
    pub ground_healths: Vec<u8>,
    #[serde(default)]
    pub objectives: Vec<ObjectiveConfig>,
}

impl LevelConfig {
    /// A plain generator-filled level with no layers and no objectives.
    pub fn basic(width: i32, height: i32, color_count: u8, move_limit: u32) -> Self {
        LevelConfig {
            width,
            height,
            color_count,
            move_limit,
            target_difficulty: 0.5,
            grid: Vec::new(),
            bombs: Vec::new(),
            covers: Vec::new(),
            cover_healths: Vec::new(),
            grounds: Vec::new(),
            ground_healths: Vec::new(),
            objectives: Vec::new(),
        }
    }

    pub fn cell_count(&self) -> usize {
        (self.width * self.height) as usize
    }

    pub fn validate(&self) -> Result<()> {
        if self.width <= 0 || self.height <= 0 || self.width > 64 || self.height > 64 {
            return Err(SimError::InvalidDimensions { width: self.width, height: self.height });
        }
        if !(3..=8).contains(&self.color_count) {
            return Err(SimError::InvalidColorCount(self.color_count));
        }

        let expected = self.cell_count();
        self.check_layer_len("grid", self.grid.len(), expected)?;
        self.check_layer_len("bombs", self.bombs.len(), expected)?;
        self.check_layer_len("covers", self.covers.len(), expected)?;
        self.check_layer_len("cover_healths", self.cover_healths.len(), expected)?;
        self.check_layer_len("grounds", self.grounds.len(), expected)?;
        self.check_layer_len("ground_healths", self.ground_healths.len(), expected)?;

        for (i, &code) in self.grid.iter().enumerate() {
            if code < -1 || code > self.color_count as i16 {
                return Err(SimError::InvalidCellValue {
                    layer: "grid",
                    index: i,
                    value: code as i32,
                });
            }
        }
        for (i, &code) in self.bombs.iter().enumerate() {
            if bomb_kind_from_code(code).is_none() {
                return Err(SimError::InvalidCellValue {
                    layer: "bombs",
                    index: i,
                    value: code as i32,
                });
            }
        }
        for (i, &code) in self.covers.iter().enumerate() {
            if code > 4 {
                return Err(SimError::InvalidCellValue {
                    layer: "covers",
                    index: i,
                    value: code as i32,
                });
            }
        }
        for (i, &code) in self.grounds.iter().enumerate() {
            if code > 3 {
                return Err(SimError::InvalidCellValue {
                    layer: "grounds",
                    index: i,
                    value: code as i32,
                });
            }
        }

        if self.objectives.len() > OBJECTIVE_SLOTS {
            return Err(SimError::TooManyObjectives(self.objectives.len()));
        }
        for objective in &self.objectives {
            if objective.target_count == 0 {
                return Err(SimError::InvalidObjective("target_count must be positive".into()));
            }
            if let ObjectiveTarget::Tile { color } = objective.target {
                if color.0 >= self.color_count {
                    return Err(SimError::InvalidObjective(format!(
                        "objective color {} outside palette of {}",
                        color.0, self.color_count
                    )));
                }
            }
        }
        Ok(())
    }

    fn check_layer_len(&self, layer: &'static str, found: usize, expected: usize) -> Result<()> {
        if found != 0 && found != expected {
            return Err(SimError::LayerLengthMismatch { layer, expected, found });
        }
        Ok(())
    }
}

pub fn bomb_kind_from_code(code: u8) -> Option<BombKind> {
    match code {
        0 => Some(BombKind::None),
        1 => Some(BombKind::HorizontalRocket),
        2 => Some(BombKind::VerticalRocket),
        3 => Some(BombKind::Area),
        4 => Some(BombKind::Color),
        5 => Some(BombKind::Ufo),
        _ => None,
    }
}

pub fn cover_kind_from_code(code: u8) -> Option<CoverKind> {
    match code {
        1 => Some(CoverKind::Cage),
        2 => Some(CoverKind::Chain),
        3 => Some(CoverKind::Bubble),
        4 => Some(CoverKind::IceCover),
        _ => None,
    }
}

pub fn ground_kind_from_code(code: u8) -> Option<GroundKind> {
    match code {
        1 => Some(GroundKind::Ice),
        2 => Some(GroundKind::Jelly),
        3 => Some(GroundKind::Honey),
        _ => None,
    }
}
