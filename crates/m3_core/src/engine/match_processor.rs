//! Destruction and scoring.
//!
//! One routing function decides what actually happens when a cell is hit:
//! a cover with HP absorbs the damage, a bomb enqueues for activation, and
//! only a plain uncovered tile is destroyed outright (damaging the ground
//! beneath it). Both match resolution and bomb blasts go through this path
//! so layer bookkeeping cannot diverge.

use super::board::GameBoard;
use super::bomb_activator::ActivationQueue;
use super::bomb_generator::Partition;
use super::events::{DestroyReason, EventCollector, GameEvent};
use super::grid::Pos;
use super::objectives::Objectives;
use super::tile::BombKind;

/// Base score for one destroyed tile.
pub const TILE_BASE_SCORE: i32 = 10;

/// Mutable engine context threaded through destruction.
pub struct DestructionCtx<'a> {
    pub board: &'a mut GameBoard,
    pub objectives: &'a mut Objectives,
    pub events: &'a mut EventCollector,
    pub bombs: &'a mut ActivationQueue,
    pub score: &'a mut i32,
}

/// Score multiplier for the current cascade depth.
pub fn cascade_multiplier(cascade_depth: u32) -> f32 {
    1.0 + cascade_depth as f32 * 0.5
}

/// Bonus for longer matched runs; a plain 3 scores exactly its base.
fn length_bonus(len: usize) -> f32 {
    1.0 + 0.25 * (len.saturating_sub(3)) as f32
}

/// Routes one unit of damage into the cell at `pos`.
/// Returns true iff a tile was removed from the board.
pub fn destroy_or_damage(ctx: &mut DestructionCtx<'_>, pos: Pos, reason: DestroyReason) -> bool {
    if ctx.board.tile(pos).is_none() {
        return false;
    }

    // A cover with HP absorbs the hit instead of the tile.
    if let Some(cover) = ctx.board.cover_mut(pos) {
        let kind = cover.kind;
        if cover.damage() {
            ctx.board.remove_cover(pos);
            let base = ctx.events.stamp();
            ctx.events.push(GameEvent::CoverDestroyed { base, pos, cover: kind });
            ctx.objectives.on_cover_destroyed(kind, ctx.events);
        }
        return false;
    }

    // Bombs never die in place; being hit is an activation source.
    let Some(&tile) = ctx.board.tile(pos) else { return false };
    if tile.bomb.is_some() {
        ctx.bombs.enqueue(pos, tile.id);
        return false;
    }

    force_destroy(ctx, pos, reason)
}

/// Unconditional tile removal, bypassing cover absorption and bomb
/// queueing. Used for the tile's own death during bomb activation.
pub fn force_destroy(ctx: &mut DestructionCtx<'_>, pos: Pos, reason: DestroyReason) -> bool {
    let Some(tile) = ctx.board.take_tile(pos) else { return false };
    let base = ctx.events.stamp();
    ctx.events.push(GameEvent::TileDestroyed {
        base,
        id: tile.id,
        pos,
        color: tile.color,
        reason,
    });
    ctx.objectives.on_tile_destroyed(tile.color, ctx.events);
    damage_ground(ctx, pos);
    true
}

/// Ground under a destroyed tile takes one damage, whatever the reason.
pub fn damage_ground(ctx: &mut DestructionCtx<'_>, pos: Pos) {
    if let Some(ground) = ctx.board.ground_mut(pos) {
        let kind = ground.kind;
        if ground.damage() {
            ctx.board.remove_ground(pos);
            let base = ctx.events.stamp();
            ctx.events.push(GameEvent::GroundDestroyed { base, pos, ground: kind });
            ctx.objectives.on_ground_destroyed(kind, ctx.events);
        }
    }
}

/// Adds `amount` to the running score and emits the event.
pub fn add_score(ctx: &mut DestructionCtx<'_>, amount: i32) {
    if amount <= 0 {
        return;
    }
    *ctx.score += amount;
    let base = ctx.events.stamp();
    ctx.events.push(GameEvent::ScoreAdded { base, amount, total: *ctx.score });
}

/// Consumes the partitioned groups of one component: marks tiles for
/// destruction, spawns bombs at their anchors, damages covers and ground,
/// and applies the score.
pub fn process_partition(
    ctx: &mut DestructionCtx<'_>,
    partition: &Partition,
    cascade_depth: u32,
) {
    let multiplier = cascade_multiplier(cascade_depth);

    for group in &partition.groups {
        let base = ctx.events.stamp();
        ctx.events.push(GameEvent::MatchDetected {
            base,
            positions: group.positions.clone(),
            color: group.color,
            shape: group.shape,
        });

        for &pos in &group.positions {
            destroy_or_damage(ctx, pos, DestroyReason::Match);
        }

        if group.spawn_bomb.is_some() {
            spawn_bomb(ctx, group.anchor, &group.positions, group.spawn_bomb, group.color);
        }

        let len = group.positions.len();
        let amount =
            (TILE_BASE_SCORE as f32 * len as f32 * multiplier * length_bonus(len)).round() as i32;
        add_score(ctx, amount);
    }

    if !partition.scrap.is_empty() {
        for &pos in &partition.scrap {
            destroy_or_damage(ctx, pos, DestroyReason::Match);
        }
        let amount =
            (TILE_BASE_SCORE as f32 * partition.scrap.len() as f32 * multiplier).round() as i32;
        add_score(ctx, amount);
    }
}

/// Places a freshly generated bomb tile. The anchor normally emptied during
/// group destruction; if a cover absorbed the hit there, the spawn falls
/// back to the first emptied cell of the shape.
fn spawn_bomb(
    ctx: &mut DestructionCtx<'_>,
    anchor: Pos,
    shape_cells: &[Pos],
    kind: BombKind,
    color: super::tile::TileColor,
) {
    let target = if ctx.board.is_empty_playable(anchor) {
        Some(anchor)
    } else {
        shape_cells.iter().copied().find(|&p| ctx.board.is_empty_playable(p))
    };
    let Some(pos) = target else {
        log::debug!("bomb spawn skipped: no free cell in shape at {:?}", anchor);
        return;
    };

    let id = ctx.board.alloc_tile_id();
    let tile_color = if kind == BombKind::Color { None } else { Some(color) };
    let tile = super::tile::Tile::with_bomb(id, tile_color, kind, pos.x as f32, pos.y as f32);
    ctx.board.set_tile(pos, Some(tile));

    let base = ctx.events.stamp();
    ctx.events.push(GameEvent::BombCreated { base, id, pos, bomb: kind, color: tile_color });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::bomb_generator::partition_component;
    use crate::engine::layers::{Cover, CoverKind, Ground, GroundKind};
    use crate::engine::match_finder::{find_components, Component};
    use crate::engine::objectives::Objectives;
    use crate::engine::pools::ScratchPools;
    use crate::engine::tile::{Tile, TileColor, TileId};

    fn board_from_rows(rows: &[&str]) -> GameBoard {
        let height = rows.len() as i32;
        let width = rows[0].len() as i32;
        let mut board = GameBoard::new(width, height, 6);
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                if ch == '.' {
                    continue;
                }
                let color = TileColor(ch.to_digit(10).unwrap() as u8);
                let id = board.alloc_tile_id();
                board.set_tile(
                    Pos::new(x as i32, y as i32),
                    Some(Tile::colored(id, color, x as f32, y as f32)),
                );
            }
        }
        board
    }

    struct Fixture {
        board: GameBoard,
        objectives: Objectives,
        events: EventCollector,
        bombs: ActivationQueue,
        score: i32,
    }

    impl Fixture {
        fn new(board: GameBoard) -> Self {
            Fixture {
                board,
                objectives: Objectives::default(),
                events: EventCollector::new(),
                bombs: ActivationQueue::new(),
                score: 0,
            }
        }

        fn ctx(&mut self) -> DestructionCtx<'_> {
            DestructionCtx {
                board: &mut self.board,
                objectives: &mut self.objectives,
                events: &mut self.events,
                bombs: &mut self.bombs,
                score: &mut self.score,
            }
        }
    }

    fn single_component(board: &GameBoard) -> Component {
        let mut pools = ScratchPools::new();
        let mut components = find_components(board, &mut pools);
        assert_eq!(components.len(), 1);
        components.remove(0)
    }

    #[test]
    fn test_three_run_scores_thirty() {
        let board = board_from_rows(&["000", "121", "212"]);
        let component = single_component(&board);
        let partition = partition_component(&component, &[]);

        let mut fx = Fixture::new(board);
        process_partition(&mut fx.ctx(), &partition, 0);

        assert_eq!(fx.score, 30);
        assert!(fx.board.tile(Pos::new(0, 0)).is_none());
        assert!(fx.board.tile(Pos::new(1, 0)).is_none());
        assert!(fx.board.tile(Pos::new(2, 0)).is_none());

        let destroyed = fx
            .events
            .peek()
            .iter()
            .filter(|e| matches!(e, GameEvent::TileDestroyed { .. }))
            .count();
        assert_eq!(destroyed, 3);
    }

    #[test]
    fn test_cascade_depth_scales_score() {
        let board = board_from_rows(&["000", "121", "212"]);
        let component = single_component(&board);
        let partition = partition_component(&component, &[]);

        let mut fx = Fixture::new(board);
        process_partition(&mut fx.ctx(), &partition, 2);
        // 30 * (1 + 2*0.5) = 60
        assert_eq!(fx.score, 60);
    }

    #[test]
    fn test_four_run_spawns_rocket_at_focus() {
        let board = board_from_rows(&["0000", "1212", "2121"]);
        let component = single_component(&board);
        let focus = Pos::new(3, 0);
        let partition = partition_component(&component, &[focus]);

        let mut fx = Fixture::new(board);
        process_partition(&mut fx.ctx(), &partition, 0);

        let spawned = fx.board.tile(focus).expect("bomb should spawn at focus");
        assert_eq!(spawned.bomb, BombKind::VerticalRocket);
        assert_eq!(spawned.color, Some(TileColor(0)));
        assert!(fx
            .events
            .peek()
            .iter()
            .any(|e| matches!(e, GameEvent::BombCreated { bomb: BombKind::VerticalRocket, .. })));
    }

    #[test]
    fn test_cover_absorbs_match_damage() {
        let mut board = board_from_rows(&["000", "121", "212"]);
        let covered = Pos::new(1, 0);
        board.set_cover(covered, Some(Cover::with_hp(CoverKind::Bubble, 2)));
        let component = single_component(&board);
        let partition = partition_component(&component, &[]);

        let mut fx = Fixture::new(board);
        process_partition(&mut fx.ctx(), &partition, 0);

        // The covered tile survives, its bubble lost one HP.
        assert!(fx.board.tile(covered).is_some());
        assert_eq!(fx.board.cover(covered).unwrap().hp, 1);
        // The two uncovered tiles died.
        assert!(fx.board.tile(Pos::new(0, 0)).is_none());
        assert!(fx.board.tile(Pos::new(2, 0)).is_none());
    }

    #[test]
    fn test_cover_destroyed_at_zero_hp() {
        let mut board = board_from_rows(&["000"]);
        let covered = Pos::new(2, 0);
        board.set_cover(covered, Some(Cover::new(CoverKind::Bubble)));
        let component = single_component(&board);
        let partition = partition_component(&component, &[]);

        let mut fx = Fixture::new(board);
        process_partition(&mut fx.ctx(), &partition, 0);

        assert!(fx.board.cover(covered).is_none());
        assert!(fx
            .events
            .peek()
            .iter()
            .any(|e| matches!(e, GameEvent::CoverDestroyed { cover: CoverKind::Bubble, .. })));
    }

    #[test]
    fn test_ground_takes_damage_under_destroyed_tile() {
        let mut board = board_from_rows(&["000"]);
        board.set_ground(Pos::new(0, 0), Some(Ground::new(GroundKind::Jelly)));
        board.set_ground(Pos::new(1, 0), Some(Ground::new(GroundKind::Ice)));
        let component = single_component(&board);
        let partition = partition_component(&component, &[]);

        let mut fx = Fixture::new(board);
        process_partition(&mut fx.ctx(), &partition, 0);

        // Jelly has 2 HP: damaged but alive. Ice has 1 HP: gone.
        assert_eq!(fx.board.ground(Pos::new(0, 0)).unwrap().hp, 1);
        assert!(fx.board.ground(Pos::new(1, 0)).is_none());
        assert!(fx
            .events
            .peek()
            .iter()
            .any(|e| matches!(e, GameEvent::GroundDestroyed { ground: GroundKind::Ice, .. })));
    }

    #[test]
    fn test_matched_bomb_enqueues_instead_of_dying() {
        let mut board = board_from_rows(&["000"]);
        let bomb_pos = Pos::new(0, 0);
        let bomb_id = TileId(99);
        board.set_tile(
            bomb_pos,
            Some(Tile::with_bomb(bomb_id, Some(TileColor(0)), BombKind::Area, 0.0, 0.0)),
        );
        let component = single_component(&board);
        let partition = partition_component(&component, &[]);

        let mut fx = Fixture::new(board);
        process_partition(&mut fx.ctx(), &partition, 0);

        assert!(fx.board.tile(bomb_pos).is_some(), "bomb waits for activation");
        assert!(!fx.bombs.is_empty());
    }

    #[test]
    fn test_destroy_or_damage_on_empty_cell_is_noop() {
        let board = board_from_rows(&["..."]);
        let mut fx = Fixture::new(board);
        assert!(!destroy_or_damage(&mut fx.ctx(), Pos::new(1, 0), DestroyReason::Bomb));
        assert!(fx.events.is_empty());
    }
}
