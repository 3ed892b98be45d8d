/// timestep.rs
/// Simulation Timing Constants
///
/// The core advances in fixed ticks; hosts choose the tick duration but the
/// defaults below keep swap choreography and replay timestamps aligned with
/// the reference cadence. Both constants are exactly representable in binary
/// so the compile-time check below holds bit-for-bit.

/// Default simulation timestep (64 Hz host loop)
pub const TICK_DT: f32 = 1.0 / 64.0;

/// Duration of the swap animation window (seconds). A pending move resolves
/// or reverts once its accumulated animation time reaches this value.
pub const SWAP_DURATION: f32 = 0.25;

/// Number of default ticks a swap animation spans
pub const TICKS_PER_SWAP: u32 = 16;

// Compile-time validation
const _: () = assert!(SWAP_DURATION / TICK_DT == TICKS_PER_SWAP as f32);
