//! Bomb effects.
//!
//! A single `compute_victims` switch maps a bomb kind to its victim cells;
//! two-bomb combinations go through `compute_combo_victims`, keyed on the
//! kind pair rather than polymorphic dispatch. The activation queue is
//! strict FIFO and every bomb instance activates at most once per session.

use std::collections::VecDeque;

use fxhash::FxHashSet;

use super::board::GameBoard;
use super::grid::Pos;
use super::rng::XorShift64;
use super::tile::{BombKind, TileColor, TileId};

/// Blast radius of the area bomb (3×3 at radius 1).
pub const AREA_RADIUS: i32 = 1;

/// Half-width of the banded combo effects (area + rocket).
const BAND_RADIUS: i32 = 1;

/// Radius of the area + area combined blast (5×5).
const DOUBLE_AREA_RADIUS: i32 = 2;

/// One queued activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Activation {
    pub pos: Pos,
    pub id: TileId,
}

/// FIFO activation queue with the at-most-once guarantee.
#[derive(Debug, Default)]
pub struct ActivationQueue {
    queue: VecDeque<Activation>,
    activated: FxHashSet<TileId>,
}

impl ActivationQueue {
    pub fn new() -> Self {
        ActivationQueue::default()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn enqueue(&mut self, pos: Pos, id: TileId) {
        if self.activated.contains(&id) {
            return;
        }
        self.queue.push_back(Activation { pos, id });
    }

    /// Pops the next activation that has not fired yet and marks it fired.
    pub fn pop(&mut self) -> Option<Activation> {
        while let Some(activation) = self.queue.pop_front() {
            if self.activated.insert(activation.id) {
                return Some(activation);
            }
        }
        None
    }

    /// Marks a bomb as spent without queueing it (combo partners).
    /// Returns false if it had already activated.
    pub fn mark_activated(&mut self, id: TileId) -> bool {
        self.activated.insert(id)
    }

    pub fn was_activated(&self, id: TileId) -> bool {
        self.activated.contains(&id)
    }

    pub fn clear_pending(&mut self) {
        self.queue.clear();
    }
}

/// Victim cells of one activation, scanline-sorted. The UFO extension
/// target is kept separate so the projectile choreography can be emitted
/// around it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VictimSet {
    pub cells: Vec<Pos>,
    pub ufo_target: Option<Pos>,
}

/// The most common color among live tiles; ties resolve to the lowest
/// color index.
pub fn most_common_color(board: &GameBoard) -> Option<TileColor> {
    let histogram = board.color_histogram();
    let mut best: Option<(u32, u8)> = None;
    for (color, &count) in histogram.iter().enumerate() {
        if count == 0 {
            continue;
        }
        match best {
            Some((max, _)) if count <= max => {}
            _ => best = Some((count, color as u8)),
        }
    }
    best.map(|(_, c)| TileColor(c))
}

fn all_of_color(board: &GameBoard, color: TileColor, out: &mut Vec<Pos>) {
    for pos in board.dims().iter() {
        if board.tile(pos).and_then(|t| t.color) == Some(color) {
            out.push(pos);
        }
    }
}

fn row_cells(board: &GameBoard, y: i32, out: &mut Vec<Pos>) {
    for x in 0..board.width() {
        let pos = Pos::new(x, y);
        if board.tile(pos).is_some() {
            out.push(pos);
        }
    }
}

fn column_cells(board: &GameBoard, x: i32, out: &mut Vec<Pos>) {
    for y in 0..board.height() {
        let pos = Pos::new(x, y);
        if board.tile(pos).is_some() {
            out.push(pos);
        }
    }
}

fn rect_cells(board: &GameBoard, center: Pos, radius: i32, out: &mut Vec<Pos>) {
    for y in center.y - radius..=center.y + radius {
        for x in center.x - radius..=center.x + radius {
            let pos = Pos::new(x, y);
            if board.tile(pos).is_some() {
                out.push(pos);
            }
        }
    }
}

fn finish(mut cells: Vec<Pos>, exclude: &[Pos], ufo_target: Option<Pos>) -> VictimSet {
    cells.retain(|p| !exclude.contains(p));
    cells.sort();
    cells.dedup();
    VictimSet { cells, ufo_target }
}

/// Picks the UFO extension target: uniform over tiled cells that are
/// neither the origin nor already part of `cells`. Empty candidate set
/// means no extension (single-survivor boards degrade to a no-op).
fn ufo_extension(
    board: &GameBoard,
    origin: Pos,
    cells: &[Pos],
    rng: &mut XorShift64,
) -> Option<Pos> {
    let candidates: Vec<Pos> = board
        .dims()
        .iter()
        .filter(|&p| p != origin && !cells.contains(&p) && board.tile(p).is_some())
        .collect();
    if candidates.is_empty() {
        return None;
    }
    let i = rng.next_max(candidates.len() as u32) as usize;
    Some(candidates[i])
}

/// Victim cells for a single bomb activated at `origin`. The bomb tile
/// itself is not part of the set; the activator destroys it separately.
pub fn compute_victims(
    kind: BombKind,
    board: &GameBoard,
    origin: Pos,
    rng: &mut XorShift64,
) -> VictimSet {
    let mut cells = Vec::new();
    match kind {
        BombKind::None => {}
        BombKind::HorizontalRocket => row_cells(board, origin.y, &mut cells),
        BombKind::VerticalRocket => column_cells(board, origin.x, &mut cells),
        BombKind::Area => rect_cells(board, origin, AREA_RADIUS, &mut cells),
        BombKind::Ufo => {
            for pos in origin.neighbors4() {
                if board.tile(pos).is_some() {
                    cells.push(pos);
                }
            }
            let target = ufo_extension(board, origin, &cells, rng);
            return finish(cells, &[origin], target);
        }
        BombKind::Color => {
            if let Some(color) = most_common_color(board) {
                all_of_color(board, color, &mut cells);
            }
        }
    }
    finish(cells, &[origin], None)
}

/// Victim cells for a two-bomb combination resolved at `origin` (the cell
/// the initiating tile landed on). `partner_pos` is the other swap cell;
/// both bomb tiles are excluded, the combo handler destroys them itself.
///
/// `partner_color` is consulted for the color-bomb + colored-tile pairing,
/// where the partner is an ordinary tile and dies with its color group.
pub fn compute_combo_victims(
    kind_a: BombKind,
    kind_b: BombKind,
    partner_color: Option<TileColor>,
    board: &GameBoard,
    origin: Pos,
    partner_pos: Pos,
    rng: &mut XorShift64,
) -> VictimSet {
    use BombKind::*;

    let mut cells = Vec::new();
    let exclude = [origin, partner_pos];

    match (kind_a, kind_b) {
        // The whole board.
        (Color, Color) => {
            for pos in board.dims().iter() {
                if board.tile(pos).is_some() {
                    cells.push(pos);
                }
            }
        }
        // Color bomb + anything colored: every tile of that color dies, the
        // triggering tile included (it carries the color, so the sweep picks
        // it up wherever the swap left it).
        (Color, _) | (_, Color) => {
            if let Some(color) = partner_color {
                all_of_color(board, color, &mut cells);
                let bomb_cell = if kind_a == Color { origin } else { partner_pos };
                return finish(cells, &[bomb_cell], Option::None);
            }
            // Color + colorless partner (a second wildcard is caught by the
            // arm above); degrade to the alone behavior.
            if let Some(color) = most_common_color(board) {
                all_of_color(board, color, &mut cells);
            }
        }
        // Cross blast: the row and the column of the combined pair.
        (
            HorizontalRocket | VerticalRocket,
            HorizontalRocket | VerticalRocket,
        ) => {
            row_cells(board, origin.y, &mut cells);
            column_cells(board, origin.x, &mut cells);
        }
        // Banded rocket: 3 rows or 3 columns depending on orientation.
        (Area, HorizontalRocket) | (HorizontalRocket, Area) => {
            for y in origin.y - BAND_RADIUS..=origin.y + BAND_RADIUS {
                row_cells(board, y, &mut cells);
            }
        }
        (Area, VerticalRocket) | (VerticalRocket, Area) => {
            for x in origin.x - BAND_RADIUS..=origin.x + BAND_RADIUS {
                column_cells(board, x, &mut cells);
            }
        }
        // Big blast.
        (Area, Area) => {
            rect_cells(board, origin, DOUBLE_AREA_RADIUS, &mut cells);
        }
        // UFO + anything: the partner bomb's own effect plus the UFO
        // extension shot.
        (Ufo, other) | (other, Ufo) => {
            let base = compute_victims(other, board, origin, rng);
            cells = base.cells;
            let mut target = base.ufo_target;
            if target.is_none() {
                target = ufo_extension(board, origin, &cells, rng);
            }
            return finish(cells, &exclude, target);
        }
        (None, _) | (_, None) => {
            log::debug!("combo with a non-bomb side at {:?}, ignoring", origin);
        }
    }

    finish(cells, &exclude, Option::None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::tile::Tile;

    fn filled_board(width: i32, height: i32) -> GameBoard {
        let mut board = GameBoard::new(width, height, 3);
        for y in 0..height {
            for x in 0..width {
                let id = board.alloc_tile_id();
                let color = TileColor(((x + y) % 3) as u8);
                board.set_tile(Pos::new(x, y), Some(Tile::colored(id, color, x as f32, y as f32)));
            }
        }
        board
    }

    #[test]
    fn test_queue_is_fifo() {
        let mut queue = ActivationQueue::new();
        queue.enqueue(Pos::new(0, 0), TileId(1));
        queue.enqueue(Pos::new(1, 0), TileId(2));
        queue.enqueue(Pos::new(2, 0), TileId(3));

        assert_eq!(queue.pop().unwrap().id, TileId(1));
        assert_eq!(queue.pop().unwrap().id, TileId(2));
        assert_eq!(queue.pop().unwrap().id, TileId(3));
        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_at_most_once() {
        let mut queue = ActivationQueue::new();
        queue.enqueue(Pos::new(0, 0), TileId(7));
        queue.enqueue(Pos::new(0, 0), TileId(7));
        assert!(queue.pop().is_some());
        assert!(queue.pop().is_none(), "second enqueue of the same bomb must not fire");

        // Even re-enqueueing after activation is ignored.
        queue.enqueue(Pos::new(0, 0), TileId(7));
        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_horizontal_rocket_takes_row() {
        let board = filled_board(6, 6);
        let mut rng = XorShift64::new(1);
        let victims = compute_victims(BombKind::HorizontalRocket, &board, Pos::new(2, 3), &mut rng);
        assert_eq!(victims.cells.len(), 5, "row minus the bomb cell");
        assert!(victims.cells.iter().all(|p| p.y == 3));
    }

    #[test]
    fn test_vertical_rocket_takes_column() {
        let board = filled_board(6, 6);
        let mut rng = XorShift64::new(1);
        let victims = compute_victims(BombKind::VerticalRocket, &board, Pos::new(2, 3), &mut rng);
        assert_eq!(victims.cells.len(), 5);
        assert!(victims.cells.iter().all(|p| p.x == 2));
    }

    #[test]
    fn test_area_bomb_is_three_by_three() {
        let board = filled_board(6, 6);
        let mut rng = XorShift64::new(1);
        let victims = compute_victims(BombKind::Area, &board, Pos::new(2, 2), &mut rng);
        assert_eq!(victims.cells.len(), 8, "3x3 minus the bomb cell");
    }

    #[test]
    fn test_area_bomb_clips_at_edges() {
        let board = filled_board(6, 6);
        let mut rng = XorShift64::new(1);
        let victims = compute_victims(BombKind::Area, &board, Pos::new(0, 0), &mut rng);
        assert_eq!(victims.cells.len(), 3);
    }

    #[test]
    fn test_victims_are_scanline_sorted() {
        let board = filled_board(6, 6);
        let mut rng = XorShift64::new(1);
        let victims = compute_victims(BombKind::Area, &board, Pos::new(3, 3), &mut rng);
        let mut sorted = victims.cells.clone();
        sorted.sort();
        assert_eq!(victims.cells, sorted);
    }

    #[test]
    fn test_ufo_cross_and_extension() {
        let board = filled_board(6, 6);
        let mut rng = XorShift64::new(42);
        let origin = Pos::new(3, 3);
        let victims = compute_victims(BombKind::Ufo, &board, origin, &mut rng);
        assert_eq!(victims.cells.len(), 4, "orthogonal cross");
        let target = victims.ufo_target.expect("full board must yield a target");
        assert_ne!(target, origin);
        assert!(!victims.cells.contains(&target));
    }

    #[test]
    fn test_ufo_extension_noop_on_bare_board() {
        let mut board = GameBoard::new(3, 3, 3);
        let id = board.alloc_tile_id();
        let origin = Pos::new(1, 1);
        board.set_tile(origin, Some(Tile::with_bomb(id, Some(TileColor(0)), BombKind::Ufo, 1.0, 1.0)));
        let mut rng = XorShift64::new(5);
        let victims = compute_victims(BombKind::Ufo, &board, origin, &mut rng);
        assert!(victims.cells.is_empty());
        assert!(victims.ufo_target.is_none());
    }

    #[test]
    fn test_color_bomb_alone_hits_most_common_color() {
        let mut board = GameBoard::new(3, 2, 3);
        for (i, &(x, y, c)) in
            [(0, 0, 0), (1, 0, 0), (2, 0, 0), (0, 1, 1), (1, 1, 1), (2, 1, 2)].iter().enumerate()
        {
            board.set_tile(
                Pos::new(x, y),
                Some(Tile::colored(TileId(i as u64 + 1), TileColor(c), x as f32, y as f32)),
            );
        }
        let mut rng = XorShift64::new(1);
        let victims = compute_victims(BombKind::Color, &board, Pos::new(2, 1), &mut rng);
        assert_eq!(victims.cells.len(), 3);
        assert!(victims.cells.iter().all(|p| p.y == 0), "color 0 dominates");
    }

    #[test]
    fn test_most_common_color_tie_is_lexicographic() {
        let mut board = GameBoard::new(2, 2, 3);
        for (i, &(x, y, c)) in [(0, 0, 2), (1, 0, 2), (0, 1, 1), (1, 1, 1)].iter().enumerate() {
            board.set_tile(
                Pos::new(x, y),
                Some(Tile::colored(TileId(i as u64 + 1), TileColor(c), 0.0, 0.0)),
            );
        }
        assert_eq!(most_common_color(&board), Some(TileColor(1)));
    }

    #[test]
    fn test_rocket_rocket_combo_is_row_plus_column() {
        let board = filled_board(6, 6);
        let mut rng = XorShift64::new(1);
        let origin = Pos::new(1, 3);
        let partner = Pos::new(0, 3);
        let victims = compute_combo_victims(
            BombKind::HorizontalRocket,
            BombKind::VerticalRocket,
            Some(TileColor(0)),
            &board,
            origin,
            partner,
            &mut rng,
        );
        // Row 3 and column 1, minus both bomb cells.
        assert!(victims.cells.iter().all(|p| p.y == 3 || p.x == 1));
        assert!(!victims.cells.contains(&origin));
        assert!(!victims.cells.contains(&partner));
        assert_eq!(victims.cells.len(), 6 + 6 - 1 - 2);
    }

    #[test]
    fn test_area_area_combo_is_five_by_five() {
        let board = filled_board(8, 8);
        let mut rng = XorShift64::new(1);
        let victims = compute_combo_victims(
            BombKind::Area,
            BombKind::Area,
            None,
            &board,
            Pos::new(4, 4),
            Pos::new(3, 4),
            &mut rng,
        );
        assert_eq!(victims.cells.len(), 25 - 2, "5x5 minus the two bomb cells");
    }

    #[test]
    fn test_area_rocket_combo_is_band() {
        let board = filled_board(6, 6);
        let mut rng = XorShift64::new(1);
        let victims = compute_combo_victims(
            BombKind::Area,
            BombKind::HorizontalRocket,
            None,
            &board,
            Pos::new(2, 3),
            Pos::new(2, 2),
            &mut rng,
        );
        assert!(victims.cells.iter().all(|p| (2..=4).contains(&p.y)));
        assert_eq!(victims.cells.len(), 18 - 2);
    }

    #[test]
    fn test_color_plus_colored_tile_takes_that_color() {
        let board = filled_board(6, 6);
        let mut rng = XorShift64::new(1);
        let partner = Pos::new(5, 4);
        let partner_color = board.tile(partner).unwrap().color;
        let victims = compute_combo_victims(
            BombKind::Color,
            BombKind::None,
            partner_color,
            &board,
            Pos::new(4, 4),
            partner,
            &mut rng,
        );
        assert!(victims.cells.contains(&partner), "the triggering tile dies too");
        for p in &victims.cells {
            assert_eq!(board.tile(*p).unwrap().color, partner_color);
        }
    }

    #[test]
    fn test_color_color_combo_clears_board() {
        let board = filled_board(4, 4);
        let mut rng = XorShift64::new(1);
        let victims = compute_combo_victims(
            BombKind::Color,
            BombKind::Color,
            None,
            &board,
            Pos::new(1, 1),
            Pos::new(2, 1),
            &mut rng,
        );
        assert_eq!(victims.cells.len(), 16 - 2);
    }
}
