//! Collaborator interfaces for tile creation, plus the default models.
//!
//! Hosts may plug their own implementations (scenario tooling, AI
//! experiments); both defaults consume only the RNG stream they are handed,
//! so swapping them never shifts another domain's draw order.

use super::grid::Pos;
use super::rng::XorShift64;
use super::tile::TileColor;

/// Picks colors for the initial board fill. The engine computes which colors
/// would complete a run of 3 and passes them as `forbidden`.
pub trait TileGenerator {
    fn pick(
        &mut self,
        pos: Pos,
        forbidden: &[TileColor],
        color_count: u8,
        rng: &mut XorShift64,
    ) -> TileColor;
}

/// Uniform draw over the allowed colors.
#[derive(Debug, Default)]
pub struct UniformFill;

impl TileGenerator for UniformFill {
    fn pick(
        &mut self,
        _pos: Pos,
        forbidden: &[TileColor],
        color_count: u8,
        rng: &mut XorShift64,
    ) -> TileColor {
        let allowed: Vec<u8> =
            (0..color_count).filter(|c| !forbidden.contains(&TileColor(*c))).collect();
        if allowed.is_empty() {
            // Degenerate palette (e.g. 1 color); matching is unavoidable.
            return TileColor(rng.next_max(color_count.max(1) as u32) as u8);
        }
        let i = rng.next_max(allowed.len() as u32) as usize;
        TileColor(allowed[i])
    }
}

/// What the refill model gets to look at when choosing a spawn color.
#[derive(Debug, Clone, Copy)]
pub struct SpawnContext<'a> {
    /// Column being refilled.
    pub column: i32,
    /// Live color counts across the whole board.
    pub histogram: &'a [u32],
    pub color_count: u8,
    /// 0.0 = easiest (strong balancing), 1.0 = hardest (raw randomness).
    pub target_difficulty: f32,
}

/// Chooses colors for refill spawns.
pub trait SpawnModel {
    fn spawn_color(&mut self, ctx: SpawnContext<'_>, rng: &mut XorShift64) -> TileColor;
}

/// Default refill model: weights each color by the inverse of its current
/// board frequency, attenuated by `target_difficulty`, so easy levels avoid
/// runaway monochromatic fill while hard levels stay close to uniform.
/// The cumulative walk visits colors in ascending index order, which makes
/// lexicographic order the tie-break.
#[derive(Debug, Default)]
pub struct DifficultyBiasedSpawn;

impl SpawnModel for DifficultyBiasedSpawn {
    fn spawn_color(&mut self, ctx: SpawnContext<'_>, rng: &mut XorShift64) -> TileColor {
        let count = ctx.color_count.max(1) as usize;
        let balance = (1.0 - ctx.target_difficulty).clamp(0.0, 1.0);

        let mut weights = vec![1.0f32; count];
        let mut total = 0.0f32;
        for (c, w) in weights.iter_mut().enumerate() {
            let seen = ctx.histogram.get(c).copied().unwrap_or(0) as f32;
            *w = 1.0 / (1.0 + seen * balance);
            total += *w;
        }

        let roll = rng.next_f32() * total;
        let mut cumulative = 0.0f32;
        for (c, w) in weights.iter().enumerate() {
            cumulative += w;
            if roll < cumulative {
                return TileColor(c as u8);
            }
        }
        // Float accumulation landed on the boundary; lexicographic order
        // makes the last color the deterministic fallback.
        TileColor((count - 1) as u8)
    }
}
