//! The simulation driver.
//!
//! `SimEngine` owns the game state, the event collector, the monotonic tick
//! counter and the RNG streams, and runs the fixed pipeline once per
//! `tick(dt)` call:
//!
//! 1. advance the pending-swap FSM (revert fires here),
//! 2. resolve chains to stability: match → destroy/spawn bombs → drain bomb
//!    activations in FIFO order → gravity + refill,
//! 3. re-evaluate objectives and the level status,
//! 4. advance the clock.
//!
//! Commands never mutate mid-tick state; they are validated synchronously
//! and either commit a pending swap or enqueue a bomb activation that the
//! next tick resolves. Invalid commands return false and leave no trace.

use super::board::GameBoard;
use super::bomb_activator::{
    compute_combo_victims, compute_victims, ActivationQueue, VictimSet,
};
use super::bomb_generator::partition_component;
use super::events::{DestroyReason, EventCollector, GameEvent, SwapPhase};
use super::grid::Pos;
use super::match_finder::{find_components, has_any_match};
use super::match_processor::{
    add_score, cascade_multiplier, destroy_or_damage, force_destroy, process_partition,
    DestructionCtx, TILE_BASE_SCORE,
};
use super::objectives::LevelStatus;
use super::pools::ScratchPools;
use super::rng::{RngDomain, SeedManager};
use super::snapshot::{GameStateSnapshot, SnapshotError, SNAPSHOT_VERSION};
use super::spawn_model::{DifficultyBiasedSpawn, SpawnModel, TileGenerator, UniformFill};
use super::state::GameState;
use super::swap::{is_combo_swap, validate_swap, PendingMove};
use super::tile::BombKind;
use super::timestep::SWAP_DURATION;
use super::{gravity, timestep};
use crate::error::Result;
use crate::level::LevelConfig;

/// Hard ceiling on resolution cycles within one tick. A board can only
/// cascade a bounded number of times; hitting this means an internal
/// invariant broke.
const MAX_RESOLUTION_CYCLES: u32 = 10_000;

pub struct SimEngine {
    state: GameState,
    events: EventCollector,
    seeds: SeedManager,
    pools: ScratchPools,
    bombs: ActivationQueue,
    pending: Option<PendingMove>,
    /// Cells implicated by the current user input; biases bomb anchors for
    /// the first resolution cycle only.
    foci: Vec<Pos>,
    tick: u64,
    sim_time: f32,
    spawn_model: Box<dyn SpawnModel>,
}

impl SimEngine {
    /// Builds a fresh engine from a level config. Initial fill draws from
    /// the `Main` stream through the default non-matching generator.
    pub fn new(config: &LevelConfig, master_seed: u64) -> Result<Self> {
        let mut generator = UniformFill;
        Self::with_generator(config, master_seed, &mut generator)
    }

    /// Same as `new` but with a host-provided initial fill generator.
    pub fn with_generator(
        config: &LevelConfig,
        master_seed: u64,
        generator: &mut dyn TileGenerator,
    ) -> Result<Self> {
        let mut seeds = SeedManager::new(master_seed);
        let state = GameState::from_level(config, generator, seeds.stream(RngDomain::Main))?;
        Ok(Self::from_parts(state, seeds, 0, 0.0))
    }

    /// Reconstructs an engine from a snapshot plus the master seed. The RNG
    /// streams are re-derived from the seed, matching the convention that
    /// snapshots for replay are taken before any gameplay stream is used.
    pub fn restore(
        snapshot: GameStateSnapshot,
        master_seed: u64,
    ) -> std::result::Result<Self, SnapshotError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::VersionMismatch {
                expected: SNAPSHOT_VERSION,
                found: snapshot.version,
            });
        }
        let seeds = SeedManager::new(master_seed);
        Ok(Self::from_parts(snapshot.state, seeds, snapshot.tick, snapshot.sim_time))
    }

    fn from_parts(state: GameState, seeds: SeedManager, tick: u64, sim_time: f32) -> Self {
        SimEngine {
            state,
            events: EventCollector::new(),
            seeds,
            pools: ScratchPools::new(),
            bombs: ActivationQueue::new(),
            pending: None,
            foci: Vec::new(),
            tick,
            sim_time,
            spawn_model: Box::new(DifficultyBiasedSpawn),
        }
    }

    /// Swaps in a host-provided refill model.
    pub fn with_spawn_model(mut self, model: Box<dyn SpawnModel>) -> Self {
        self.spawn_model = model;
        self
    }

    // ------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn board(&self) -> &GameBoard {
        &self.state.board
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub fn sim_time(&self) -> f32 {
        self.sim_time
    }

    /// Stable ⇔ no pending swap, no queued bomb activations, no falling
    /// tile, and no match on the board.
    pub fn is_stable(&self) -> bool {
        if self.pending.is_some() || !self.bombs.is_empty() || self.state.board.any_falling() {
            return false;
        }
        let mut pools = ScratchPools::new();
        !has_any_match(&self.state.board, &mut pools)
    }

    pub fn snapshot(&self) -> GameStateSnapshot {
        GameStateSnapshot::new(self.tick, self.sim_time, self.state.clone())
    }

    /// Returns the buffered events in emission order and clears the buffer.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.events.drain()
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    /// Requests a swap. Returns false (mutating nothing, emitting nothing)
    /// if any precondition fails.
    pub fn apply_move(&mut self, from: Pos, to: Pos) -> bool {
        if !validate_swap(&self.state.board, self.state.status, self.pending.is_some(), from, to)
        {
            return false;
        }
        self.events.set_clock(self.tick, self.sim_time);

        let kind_from = self.state.board.bomb_at(from);
        let kind_to = self.state.board.bomb_at(to);
        let combo = is_combo_swap(kind_from, kind_to);

        let base = self.events.stamp();
        self.events.push(GameEvent::TilesSwapped { base, from, to, phase: SwapPhase::Committed });
        self.state.board.swap_tiles(from, to);
        self.state.selected = None;

        let had_match = combo || {
            let components = find_components(&self.state.board, &mut self.pools);
            components
                .iter()
                .any(|c| c.positions.contains(&from) || c.positions.contains(&to))
        };

        log::trace!(
            "swap {:?}<->{:?} committed (combo={}, had_match={})",
            from,
            to,
            combo,
            had_match
        );
        self.pending = Some(PendingMove::new(from, to, had_match, combo));
        true
    }

    /// Taps a cell. Tapping a bomb activates it and consumes a move;
    /// tapping a plain tile only moves the selection. Returns false when
    /// the tap cannot do anything.
    pub fn handle_tap(&mut self, pos: Pos) -> bool {
        if self.state.status != LevelStatus::InProgress || self.pending.is_some() {
            return false;
        }
        if !self.state.board.is_playable(pos) || self.state.board.tile(pos).is_none() {
            return false;
        }
        if self.state.board.cover(pos).is_some() {
            return false;
        }
        self.events.set_clock(self.tick, self.sim_time);

        let Some(&tile) = self.state.board.tile(pos) else { return false };
        if tile.bomb.is_some() {
            self.bombs.enqueue(pos, tile.id);
            self.foci = vec![pos];
            self.state.selected = None;
            self.complete_move();
            true
        } else {
            self.state.selected = if self.state.selected == Some(pos) { None } else { Some(pos) };
            true
        }
    }

    // ------------------------------------------------------------------
    // Tick pipeline
    // ------------------------------------------------------------------

    pub fn tick(&mut self, dt: f32) {
        self.events.set_clock(self.tick, self.sim_time);

        // 1. Pending-swap FSM.
        let swap_finished = match self.pending.as_mut() {
            Some(pending) => pending.advance(dt, SWAP_DURATION),
            None => false,
        };
        if swap_finished {
            if let Some(done) = self.pending.take() {
                self.finish_pending(done);
            }
        }

        // 2. Chain resolution. Gated on the swap animation: a committed
        // swap only drops into resolution once its window closes.
        if self.pending.is_none() {
            self.resolve_chains();
            // 3. Objectives and terminal status, now that the board settled.
            self.update_status();
        }

        // 4. Clock.
        self.tick += 1;
        self.sim_time += dt;
    }

    fn finish_pending(&mut self, pending: PendingMove) {
        if pending.is_combo {
            self.complete_move();
            self.foci = vec![pending.from, pending.to];
            self.begin_combo(pending.from, pending.to);
        } else if pending.had_match {
            self.complete_move();
            self.foci = vec![pending.from, pending.to];
        } else {
            // Undo the committed exchange; the board must end byte-identical.
            self.state.board.swap_tiles(pending.from, pending.to);
            let base = self.events.stamp();
            self.events.push(GameEvent::TilesSwapped {
                base,
                from: pending.from,
                to: pending.to,
                phase: SwapPhase::Reverted,
            });
        }
    }

    fn complete_move(&mut self) {
        self.state.move_count += 1;
        let base = self.events.stamp();
        self.events.push(GameEvent::MoveCompleted { base, move_count: self.state.move_count });
    }

    /// Fires a two-cell bomb combination. `to` is the cell the initiating
    /// tile landed on and anchors the combined effect.
    fn begin_combo(&mut self, from: Pos, to: Pos) {
        let kind_to = self.state.board.bomb_at(to);
        let kind_from = self.state.board.bomb_at(from);
        let tile_to = self.state.board.tile(to).copied();
        let tile_from = self.state.board.tile(from).copied();

        let base = self.events.stamp();
        self.events.push(GameEvent::BombCombo {
            base,
            a: to,
            b: from,
            kind_a: kind_to,
            kind_b: kind_from,
        });

        // Exactly one wildcard paired with a colored tile (or colored bomb):
        // the wildcard sweeps that color and the partner dies with it.
        let color_pairing = (kind_to == BombKind::Color) != (kind_from == BombKind::Color);
        let partner_color = if kind_to == BombKind::Color {
            tile_from.and_then(|t| t.color)
        } else if kind_from == BombKind::Color {
            tile_to.and_then(|t| t.color)
        } else {
            None
        };

        // Victims are computed against the intact board, before the combo's
        // own bombs leave it.
        let victims = compute_combo_victims(
            kind_to,
            kind_from,
            partner_color,
            &self.state.board,
            to,
            from,
            self.seeds.stream(RngDomain::Bomb),
        );

        let mut destroyed = 0usize;
        for (pos, tile, kind) in [(to, tile_to, kind_to), (from, tile_from, kind_from)] {
            let Some(tile) = tile else { continue };
            if kind == BombKind::None {
                continue;
            }
            if color_pairing && kind != BombKind::Color {
                // The colored bomb partner dies in the sweep and chains there.
                continue;
            }
            if !self.bombs.mark_activated(tile.id) {
                continue;
            }
            let base = self.events.stamp();
            self.events.push(GameEvent::BombActivated { base, id: tile.id, pos, bomb: kind });
            let mut ctx = DestructionCtx {
                board: &mut self.state.board,
                objectives: &mut self.state.objectives,
                events: &mut self.events,
                bombs: &mut self.bombs,
                score: &mut self.state.score,
            };
            if force_destroy(&mut ctx, pos, DestroyReason::Bomb) {
                destroyed += 1;
            }
        }

        destroyed += self.resolve_victims(to, &victims);
        let amount =
            (TILE_BASE_SCORE as f32 * destroyed as f32 * cascade_multiplier(0)).round() as i32;
        let mut ctx = DestructionCtx {
            board: &mut self.state.board,
            objectives: &mut self.state.objectives,
            events: &mut self.events,
            bombs: &mut self.bombs,
            score: &mut self.state.score,
        };
        add_score(&mut ctx, amount);
    }

    /// Applies a victim set, routing each cell through the shared
    /// destruction path. Returns the number of tiles actually destroyed.
    fn resolve_victims(&mut self, origin: Pos, victims: &VictimSet) -> usize {
        let mut destroyed = 0usize;
        {
            let mut ctx = DestructionCtx {
                board: &mut self.state.board,
                objectives: &mut self.state.objectives,
                events: &mut self.events,
                bombs: &mut self.bombs,
                score: &mut self.state.score,
            };
            for &pos in &victims.cells {
                if destroy_or_damage(&mut ctx, pos, DestroyReason::Bomb) {
                    destroyed += 1;
                }
            }
        }

        if let Some(target) = victims.ufo_target {
            let base = self.events.stamp();
            self.events.push(GameEvent::ProjectileLaunched { base, from: origin, target });
            self.events.push(GameEvent::ProjectileLanded { base, target });
            let mut ctx = DestructionCtx {
                board: &mut self.state.board,
                objectives: &mut self.state.objectives,
                events: &mut self.events,
                bombs: &mut self.bombs,
                score: &mut self.state.score,
            };
            if destroy_or_damage(&mut ctx, target, DestroyReason::Bomb) {
                destroyed += 1;
            }
        }
        destroyed
    }

    /// The while-not-stable loop of one tick: each cycle is
    /// match → destroy → activate → gravity/refill.
    fn resolve_chains(&mut self) {
        let mut cascade_depth = 0u32;
        loop {
            debug_assert!(cascade_depth < MAX_RESOLUTION_CYCLES, "resolution runaway");
            if cascade_depth >= MAX_RESOLUTION_CYCLES {
                log::error!("resolution cycle cap hit at tick {}; aborting chain", self.tick);
                break;
            }

            // a. Scan.
            let components = find_components(&self.state.board, &mut self.pools);
            let has_work = !components.is_empty() || !self.bombs.is_empty();

            if cascade_depth > 0 && !components.is_empty() {
                let base = self.events.stamp();
                self.events.push(GameEvent::ComboChanged { base, depth: cascade_depth });
            }

            if has_work {
                // c. Consume groups. Foci only apply to the cycle triggered
                // directly by the input.
                let foci = std::mem::take(&mut self.foci);
                for component in &components {
                    let partition = partition_component(component, &foci);
                    let mut ctx = DestructionCtx {
                        board: &mut self.state.board,
                        objectives: &mut self.state.objectives,
                        events: &mut self.events,
                        bombs: &mut self.bombs,
                        score: &mut self.state.score,
                    };
                    process_partition(&mut ctx, &partition, cascade_depth);
                }

                // d. Drain bomb activations, FIFO, chains included.
                self.drain_activations(cascade_depth);
            }

            // e. Gravity and refill until the columns settle, then close
            // the cycle: falling flags clear in headless operation. This
            // also repairs holes left by a combo that matched nothing (the
            // fast path destroys tiles without any match scan).
            let settled_change = gravity::settle(
                &mut self.state.board,
                &mut self.events,
                self.spawn_model.as_mut(),
                self.seeds.stream(RngDomain::Refill),
                self.state.target_difficulty,
            );
            self.state.board.settle_falling();

            // b. Nothing matched, nothing queued, nothing fell: stable.
            if !has_work && !settled_change {
                break;
            }
            cascade_depth += 1;
        }
    }

    fn drain_activations(&mut self, cascade_depth: u32) {
        while let Some(activation) = self.bombs.pop() {
            let Some(&tile) = self.state.board.tile(activation.pos) else { continue };
            if tile.id != activation.id || tile.bomb == BombKind::None {
                continue;
            }
            let kind = tile.bomb;

            let base = self.events.stamp();
            self.events.push(GameEvent::BombActivated {
                base,
                id: tile.id,
                pos: activation.pos,
                bomb: kind,
            });

            let mut destroyed = 0usize;
            {
                let mut ctx = DestructionCtx {
                    board: &mut self.state.board,
                    objectives: &mut self.state.objectives,
                    events: &mut self.events,
                    bombs: &mut self.bombs,
                    score: &mut self.state.score,
                };
                if force_destroy(&mut ctx, activation.pos, DestroyReason::Bomb) {
                    destroyed += 1;
                }
            }

            let victims = compute_victims(
                kind,
                &self.state.board,
                activation.pos,
                self.seeds.stream(RngDomain::Bomb),
            );
            destroyed += self.resolve_victims(activation.pos, &victims);

            let amount = (TILE_BASE_SCORE as f32
                * destroyed as f32
                * cascade_multiplier(cascade_depth))
            .round() as i32;
            let mut ctx = DestructionCtx {
                board: &mut self.state.board,
                objectives: &mut self.state.objectives,
                events: &mut self.events,
                bombs: &mut self.bombs,
                score: &mut self.state.score,
            };
            add_score(&mut ctx, amount);
        }
    }

    fn update_status(&mut self) {
        if self.state.status != LevelStatus::InProgress {
            return;
        }
        if !self.bombs.is_empty() || self.state.board.any_falling() {
            return;
        }
        let status = self.state.objectives.evaluate(self.state.move_count, self.state.move_limit);
        if status != LevelStatus::InProgress {
            self.state.status = status;
            let base = self.events.stamp();
            self.events.push(GameEvent::LevelCompleted { base, status });
            log::debug!("level finished: {:?} after {} moves", status, self.state.move_count);
        }
    }

    /// Runs whole ticks at the default timestep until the engine reports
    /// stable (bounded by `max_ticks`).
    pub fn run_until_stable(&mut self, max_ticks: u32) {
        for _ in 0..max_ticks {
            self.tick(timestep::TICK_DT);
            if self.pending.is_none() && self.is_stable() {
                break;
            }
        }
    }
}
