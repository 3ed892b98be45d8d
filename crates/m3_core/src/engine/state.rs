//! Aggregate game state and level instantiation.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::level::{bomb_kind_from_code, cover_kind_from_code, ground_kind_from_code, LevelConfig};

use super::board::GameBoard;
use super::grid::Pos;
use super::layers::{Cover, Ground};
use super::objectives::{LevelStatus, Objectives, ObjectiveSlot, OBJECTIVE_SLOTS};
use super::rng::XorShift64;
use super::spawn_model::TileGenerator;
use super::tile::{BombKind, Tile, TileColor};

/// Everything the simulation mutates. Serializable as a whole, which is
/// what makes snapshots one-liners.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub board: GameBoard,
    pub score: i32,
    pub move_count: u32,
    pub move_limit: u32,
    pub target_difficulty: f32,
    pub selected: Option<Pos>,
    pub objectives: Objectives,
    pub status: LevelStatus,
}

impl GameState {
    /// Builds the initial state from a validated level config. Generator
    /// cells draw from the `Main` stream through `generator`, with colors
    /// that would complete a run of 3 to the left or above forbidden, so a
    /// fresh board never starts mid-cascade.
    pub fn from_level(
        config: &LevelConfig,
        generator: &mut dyn TileGenerator,
        rng: &mut XorShift64,
    ) -> Result<Self> {
        config.validate()?;

        let mut board = GameBoard::new(config.width, config.height, config.color_count);
        let cells = config.cell_count();

        for idx in 0..cells {
            let pos = board.dims().pos(idx);
            let grid_code = config.grid.get(idx).copied().unwrap_or(0);
            if grid_code == -1 {
                board.set_playable(pos, false);
                continue;
            }

            let bomb = config
                .bombs
                .get(idx)
                .copied()
                .and_then(bomb_kind_from_code)
                .unwrap_or(BombKind::None);

            let color = if bomb == BombKind::Color {
                None
            } else if grid_code > 0 {
                Some(TileColor((grid_code - 1) as u8))
            } else {
                let forbidden = forbidden_colors(&board, pos);
                Some(generator.pick(pos, &forbidden, config.color_count, rng))
            };

            let id = board.alloc_tile_id();
            let tile = if bomb == BombKind::None {
                match color {
                    Some(c) => Tile::colored(id, c, pos.x as f32, pos.y as f32),
                    None => continue,
                }
            } else {
                Tile::with_bomb(id, color, bomb, pos.x as f32, pos.y as f32)
            };
            board.set_tile(pos, Some(tile));

            if let Some(kind) = config.covers.get(idx).copied().and_then(cover_kind_from_code) {
                let hp = config.cover_healths.get(idx).copied().unwrap_or(0);
                board.set_cover(pos, Some(Cover::with_hp(kind, hp)));
            }
            if let Some(kind) = config.grounds.get(idx).copied().and_then(ground_kind_from_code) {
                let hp = config.ground_healths.get(idx).copied().unwrap_or(0);
                let hp = if hp == 0 { kind.default_hp() } else { hp };
                board.set_ground(pos, Some(Ground { kind, hp }));
            }
        }

        let mut slots: [Option<ObjectiveSlot>; OBJECTIVE_SLOTS] = [None; OBJECTIVE_SLOTS];
        for (i, objective) in config.objectives.iter().enumerate() {
            slots[i] = Some(ObjectiveSlot::new(objective.target, objective.target_count));
        }

        Ok(GameState {
            board,
            score: 0,
            move_count: 0,
            move_limit: config.move_limit,
            target_difficulty: config.target_difficulty,
            selected: None,
            objectives: Objectives::new(slots),
            status: LevelStatus::InProgress,
        })
    }
}

/// Colors that would complete a horizontal run to the left or a vertical
/// run above `pos`. Fill proceeds in scanline order, so right/below cells
/// do not exist yet.
fn forbidden_colors(board: &GameBoard, pos: Pos) -> Vec<TileColor> {
    let mut forbidden = Vec::with_capacity(2);
    let color_at = |p: Pos| board.tile(p).and_then(|t| t.color);

    let left1 = color_at(Pos::new(pos.x - 1, pos.y));
    let left2 = color_at(Pos::new(pos.x - 2, pos.y));
    if let (Some(a), Some(b)) = (left1, left2) {
        if a == b && !forbidden.contains(&a) {
            forbidden.push(a);
        }
    }

    let up1 = color_at(Pos::new(pos.x, pos.y - 1));
    let up2 = color_at(Pos::new(pos.x, pos.y - 2));
    if let (Some(a), Some(b)) = (up1, up2) {
        if a == b && !forbidden.contains(&a) {
            forbidden.push(a);
        }
    }

    forbidden
}
