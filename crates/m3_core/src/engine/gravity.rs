//! Gravity and refill.
//!
//! Columns compact independently: each empty playable cell pulls the
//! nearest movable, non-empty tile above it. Tiles pinned by a
//! gravity-blocking cover never move; everything else slides past them.
//! After compaction, each column's top playable cell (the spawner) receives
//! a new tile whose color comes from the spawn model on the Refill stream;
//! the two passes alternate until the column is settled.

use super::board::GameBoard;
use super::events::{EventCollector, GameEvent};
use super::grid::Pos;
use super::rng::XorShift64;
use super::spawn_model::{SpawnContext, SpawnModel};
use super::tile::Tile;

/// One full compaction pass. Returns true if any tile moved.
pub fn apply_gravity(board: &mut GameBoard, events: &mut EventCollector) -> bool {
    let mut moved = false;
    for x in 0..board.width() {
        for y in (0..board.height()).rev() {
            let dest = Pos::new(x, y);
            if !board.is_empty_playable(dest) {
                continue;
            }
            let Some(src) = nearest_movable_above(board, dest) else { continue };

            let Some(mut tile) = board.take_tile(src) else { continue };
            // The grid index updates now; the visual stays at the origin so
            // the animation driver can interpolate the drop.
            tile.is_falling = true;
            let id = tile.id;
            let dynamic_cover =
                board.cover(src).map_or(false, |c| c.kind.is_dynamic());
            board.set_tile(dest, Some(tile));
            if dynamic_cover {
                board.transplant_cover(src, dest);
            }

            let base = events.stamp();
            events.push(GameEvent::TileMoved { base, id, from: src, to: dest });
            moved = true;
        }
    }
    moved
}

/// Nearest cell above `dest` in the same column holding a movable tile.
fn nearest_movable_above(board: &GameBoard, dest: Pos) -> Option<Pos> {
    for y in (0..dest.y).rev() {
        let pos = Pos::new(dest.x, y);
        if board.tile(pos).is_none() {
            continue;
        }
        if board.is_movable(pos) {
            return Some(pos);
        }
        // Pinned tile: gravity slides later tiles past it.
    }
    None
}

/// Fills each column's empty top source with one new tile. Returns true if
/// anything spawned.
pub fn refill_step(
    board: &mut GameBoard,
    events: &mut EventCollector,
    spawn_model: &mut dyn SpawnModel,
    rng: &mut XorShift64,
    target_difficulty: f32,
) -> bool {
    let mut spawned = false;
    for x in 0..board.width() {
        let Some(top) = top_source(board, x) else { continue };
        if board.tile(top).is_some() {
            continue;
        }

        let histogram = board.color_histogram();
        let ctx = SpawnContext {
            column: x,
            histogram: &histogram,
            color_count: board.color_count(),
            target_difficulty,
        };
        let color = spawn_model.spawn_color(ctx, rng);

        let id = board.alloc_tile_id();
        let visual_from = (top.x as f32, (top.y - 1) as f32);
        let mut tile = Tile::colored(id, color, visual_from.0, visual_from.1);
        tile.is_falling = true;
        board.set_tile(top, Some(tile));

        let base = events.stamp();
        events.push(GameEvent::TileSpawned { base, id, pos: top, color, visual_from });
        spawned = true;
    }
    spawned
}

/// Topmost playable cell of the column, if any.
fn top_source(board: &GameBoard, x: i32) -> Option<Pos> {
    (0..board.height()).map(|y| Pos::new(x, y)).find(|&p| board.is_playable(p))
}

/// Alternates gravity and refill until the board stops changing.
/// Returns true if anything moved or spawned.
pub fn settle(
    board: &mut GameBoard,
    events: &mut EventCollector,
    spawn_model: &mut dyn SpawnModel,
    rng: &mut XorShift64,
    target_difficulty: f32,
) -> bool {
    let mut changed = false;
    loop {
        let moved = apply_gravity(board, events);
        let spawned = refill_step(board, events, spawn_model, rng, target_difficulty);
        if !moved && !spawned {
            break;
        }
        changed = true;
    }
    changed
}
