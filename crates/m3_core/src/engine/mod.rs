//! The simulation core.
//!
//! Dependency order (leaves first): rng → pools/grid → tile/layers/board →
//! match_finder → bomb_generator → match_processor → bomb_activator →
//! gravity → objectives → swap → sim.
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | `board` | Three co-located layer arrays over one grid |
//! | `bomb_activator` | Victim sets, combo table, FIFO chain queue |
//! | `bomb_generator` | Component partitioning, power-up assignment |
//! | `events` | Tagged event union + append-only collector |
//! | `gravity` | Column compaction and top-source refill |
//! | `grid` | Positions, row-major indexing |
//! | `layers` | Ground/cover kinds and the cover rule table |
//! | `match_finder` | BFS connected components |
//! | `match_processor` | Destruction routing, scoring, bomb spawning |
//! | `objectives` | Four objective slots, victory/defeat |
//! | `pools` | Per-engine scratch containers |
//! | `rng` | xorshift64 streams per domain |
//! | `sim` | **The tick-driven driver** |
//! | `snapshot` | Serialized state for replay/checkpoint |
//! | `spawn_model` | Collaborator interfaces for tile creation |
//! | `state` | Aggregate game state, level instantiation |
//! | `swap` | Swap validation and the pending-move FSM |
//! | `tile` | Tile, color, bomb kind |
//! | `timestep` | Tick constants |

pub mod board;
pub mod bomb_activator;
#[cfg(test)]
mod prop_tests;
pub mod bomb_generator;
pub mod events;
pub mod gravity;
pub mod grid;
pub mod layers;
pub mod match_finder;
pub mod match_processor;
pub mod objectives;
pub mod pools;
pub mod rng;
pub mod sim;
pub mod snapshot;
pub mod spawn_model;
pub mod state;
pub mod swap;
pub mod tile;
pub mod timestep;

pub use board::GameBoard;
pub use events::{DestroyReason, EventBase, GameEvent, MatchShape, SwapPhase};
pub use grid::{GridDims, Pos};
pub use layers::{Cover, CoverKind, Ground, GroundKind};
pub use objectives::{LevelStatus, ObjectiveSlot, ObjectiveTarget};
pub use rng::{RngDomain, SeedManager, XorShift64};
pub use sim::SimEngine;
pub use snapshot::{GameStateSnapshot, SnapshotError};
pub use spawn_model::{DifficultyBiasedSpawn, SpawnContext, SpawnModel, TileGenerator, UniformFill};
pub use state::GameState;
pub use tile::{BombKind, Tile, TileColor, TileId};
pub use timestep::{SWAP_DURATION, TICK_DT};
