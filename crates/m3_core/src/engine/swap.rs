//! Swap validation and the pending-move FSM.
//!
//! A swap is committed immediately (grid indices exchange, the committed
//! event fires) and then animates for `SWAP_DURATION`. When the animation
//! window closes the move either drops into chain resolution, fires its
//! bomb combination, or reverts. A resolving swap cannot be cancelled and
//! no second swap is accepted while one is pending.

use super::board::GameBoard;
use super::grid::Pos;
use super::objectives::LevelStatus;
use super::tile::BombKind;

/// In-flight swap bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingMove {
    pub from: Pos,
    pub to: Pos,
    pub had_match: bool,
    pub is_combo: bool,
    pub anim_time: f32,
}

impl PendingMove {
    pub fn new(from: Pos, to: Pos, had_match: bool, is_combo: bool) -> Self {
        PendingMove { from, to, had_match, is_combo, anim_time: 0.0 }
    }

    /// Advances the animation clock; true once the window has elapsed.
    pub fn advance(&mut self, dt: f32, swap_duration: f32) -> bool {
        self.anim_time += dt;
        self.anim_time >= swap_duration
    }
}

/// Preconditions for accepting a swap. Violations are reported to the
/// caller as a plain refusal; nothing mutates and no event fires.
pub fn validate_swap(
    board: &GameBoard,
    status: LevelStatus,
    pending: bool,
    from: Pos,
    to: Pos,
) -> bool {
    status == LevelStatus::InProgress
        && !pending
        && board.dims().contains(from)
        && board.dims().contains(to)
        && from.is_adjacent(to)
        && board.is_swappable(from)
        && board.is_swappable(to)
}

/// The bomb-combo fast path applies when both sides carry bombs, or when
/// either side is the rainbow wildcard (which has no color to match with).
/// A single ordinary bomb swapped against a plain tile keeps its color and
/// goes through normal match detection.
pub fn is_combo_swap(kind_from: BombKind, kind_to: BombKind) -> bool {
    (kind_from.is_some() && kind_to.is_some())
        || kind_from == BombKind::Color
        || kind_to == BombKind::Color
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::layers::{Cover, CoverKind};
    use crate::engine::tile::{Tile, TileColor};

    fn filled_board() -> GameBoard {
        let mut board = GameBoard::new(4, 4, 4);
        for y in 0..4 {
            for x in 0..4 {
                let id = board.alloc_tile_id();
                board.set_tile(
                    Pos::new(x, y),
                    Some(Tile::colored(id, TileColor(((x + 2 * y) % 4) as u8), x as f32, y as f32)),
                );
            }
        }
        board
    }

    #[test]
    fn test_valid_swap() {
        let board = filled_board();
        assert!(validate_swap(&board, LevelStatus::InProgress, false, Pos::new(1, 1), Pos::new(2, 1)));
    }

    #[test]
    fn test_rejects_diagonal_and_distant() {
        let board = filled_board();
        assert!(!validate_swap(&board, LevelStatus::InProgress, false, Pos::new(1, 1), Pos::new(2, 2)));
        assert!(!validate_swap(&board, LevelStatus::InProgress, false, Pos::new(0, 0), Pos::new(3, 0)));
    }

    #[test]
    fn test_rejects_out_of_bounds() {
        let board = filled_board();
        assert!(!validate_swap(&board, LevelStatus::InProgress, false, Pos::new(-1, 0), Pos::new(0, 0)));
        assert!(!validate_swap(&board, LevelStatus::InProgress, false, Pos::new(3, 3), Pos::new(4, 3)));
    }

    #[test]
    fn test_rejects_while_pending() {
        let board = filled_board();
        assert!(!validate_swap(&board, LevelStatus::InProgress, true, Pos::new(1, 1), Pos::new(2, 1)));
    }

    #[test]
    fn test_rejects_after_level_end() {
        let board = filled_board();
        assert!(!validate_swap(&board, LevelStatus::Victory, false, Pos::new(1, 1), Pos::new(2, 1)));
        assert!(!validate_swap(&board, LevelStatus::Defeat, false, Pos::new(1, 1), Pos::new(2, 1)));
    }

    #[test]
    fn test_rejects_swap_blocking_cover() {
        let mut board = filled_board();
        board.set_cover(Pos::new(2, 1), Some(Cover::new(CoverKind::Chain)));
        assert!(!validate_swap(&board, LevelStatus::InProgress, false, Pos::new(1, 1), Pos::new(2, 1)));
    }

    #[test]
    fn test_combo_swap_detection() {
        use BombKind::*;
        assert!(is_combo_swap(HorizontalRocket, VerticalRocket));
        assert!(is_combo_swap(Area, Area));
        assert!(is_combo_swap(Color, None));
        assert!(is_combo_swap(None, Color));
        assert!(!is_combo_swap(HorizontalRocket, None), "lone rocket swaps like a tile");
        assert!(!is_combo_swap(None, None));
    }

    #[test]
    fn test_pending_move_advances_to_completion() {
        let mut pending = PendingMove::new(Pos::new(0, 0), Pos::new(1, 0), true, false);
        assert!(!pending.advance(0.1, 0.25));
        assert!(!pending.advance(0.1, 0.25));
        assert!(pending.advance(0.1, 0.25));
    }
}
