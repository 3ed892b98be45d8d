//! Power-up assignment.
//!
//! Partitions one valid component into scored match groups. Shape → bomb:
//!
//! | Shape            | Spawns            |
//! |------------------|-------------------|
//! | straight 3       | none              |
//! | straight 4 (H)   | vertical rocket   |
//! | straight 4 (V)   | horizontal rocket |
//! | L/T of 5         | area bomb         |
//! | straight 5       | color bomb        |
//! | 2×2 square       | UFO               |
//!
//! The partition maximizes the sum of fixed shape scores; ties prefer the
//! partition containing a focus. Components of up to 12 cells get an exact
//! search; larger ones fall back to greedy highest-score-first carving.

use fxhash::FxHashMap;

use super::events::MatchShape;
use super::grid::Pos;
use super::match_finder::Component;
use super::tile::{BombKind, TileColor};

/// Components above this size use the greedy fallback.
const EXACT_SEARCH_LIMIT: usize = 12;

/// A partitioned subset of a component with an assigned shape, anchor and
/// (optionally) a bomb to spawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchGroup {
    pub positions: Vec<Pos>,
    pub color: TileColor,
    pub shape: MatchShape,
    pub anchor: Pos,
    pub spawn_bomb: BombKind,
}

/// Result of partitioning one component. Scrap cells are destroyed and
/// scored but spawn nothing.
#[derive(Debug, Clone, Default)]
pub struct Partition {
    pub groups: Vec<MatchGroup>,
    pub scrap: Vec<Pos>,
}

fn shape_bomb(shape: MatchShape) -> BombKind {
    match shape {
        MatchShape::Straight3 => BombKind::None,
        MatchShape::Straight4Horizontal => BombKind::VerticalRocket,
        MatchShape::Straight4Vertical => BombKind::HorizontalRocket,
        MatchShape::Bent5 => BombKind::Area,
        MatchShape::Straight5 => BombKind::Color,
        MatchShape::Square => BombKind::Ufo,
    }
}

fn shape_score(shape: MatchShape) -> u32 {
    match shape {
        MatchShape::Straight5 => 16,
        MatchShape::Bent5 => 8,
        MatchShape::Straight4Horizontal | MatchShape::Straight4Vertical => 4,
        MatchShape::Square => 2,
        MatchShape::Straight3 => 1,
    }
}

#[derive(Debug, Clone)]
struct Candidate {
    /// Cells in scanline order.
    cells: Vec<Pos>,
    /// Component-local cell indices of `cells`.
    indices: Vec<usize>,
    shape: MatchShape,
    score: u32,
    has_focus: bool,
}

/// Partition `component` into match groups, biased toward `foci` (the swap
/// endpoints, or the tap cell; empty for cascade matches).
pub fn partition_component(component: &Component, foci: &[Pos]) -> Partition {
    let index: FxHashMap<Pos, usize> =
        component.positions.iter().copied().enumerate().map(|(i, p)| (p, i)).collect();

    let mut candidates = enumerate_candidates(component, &index, foci);
    if candidates.is_empty() {
        return Partition { groups: Vec::new(), scrap: component.positions.clone() };
    }

    // Deterministic candidate order: best first, focus-bearing first among
    // equals, then scanline position.
    candidates.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then(b.has_focus.cmp(&a.has_focus))
            .then(a.cells[0].cmp(&b.cells[0]))
            .then(a.cells.cmp(&b.cells))
    });

    let n = component.positions.len();
    let chosen = if n <= EXACT_SEARCH_LIMIT {
        exact_partition(&candidates)
    } else {
        greedy_partition(&candidates, n)
    };

    let mut used = vec![false; n];
    let mut groups: Vec<MatchGroup> = chosen
        .iter()
        .map(|c| {
            for &i in &c.indices {
                used[i] = true;
            }
            MatchGroup {
                positions: c.cells.clone(),
                color: component.color,
                shape: c.shape,
                anchor: select_anchor(&c.cells, foci),
                spawn_bomb: shape_bomb(c.shape),
            }
        })
        .collect();
    groups.sort_by(|a, b| a.positions[0].cmp(&b.positions[0]));

    let scrap = component
        .positions
        .iter()
        .enumerate()
        .filter(|(i, _)| !used[*i])
        .map(|(_, p)| *p)
        .collect();

    Partition { groups, scrap }
}

/// Anchor selection: a focus inside the shape wins; otherwise the
/// lexicographic centermost interior cell.
fn select_anchor(cells: &[Pos], foci: &[Pos]) -> Pos {
    for focus in foci {
        if cells.contains(focus) {
            return *focus;
        }
    }
    // Integer centroid distance: minimize |n·p - Σp|² so no floats enter
    // the deterministic path. Ties fall to scanline order.
    let n = cells.len() as i64;
    let sum_x: i64 = cells.iter().map(|p| p.x as i64).sum();
    let sum_y: i64 = cells.iter().map(|p| p.y as i64).sum();
    let mut best = cells[0];
    let mut best_d = i64::MAX;
    for &p in cells {
        let dx = n * p.x as i64 - sum_x;
        let dy = n * p.y as i64 - sum_y;
        let d = dx * dx + dy * dy;
        if d < best_d || (d == best_d && p < best) {
            best_d = d;
            best = p;
        }
    }
    best
}

fn enumerate_candidates(
    component: &Component,
    index: &FxHashMap<Pos, usize>,
    foci: &[Pos],
) -> Vec<Candidate> {
    let contains = |p: Pos| index.contains_key(&p);
    let mut h3: Vec<[Pos; 3]> = Vec::new();
    let mut v3: Vec<[Pos; 3]> = Vec::new();
    let mut out: Vec<Candidate> = Vec::new();
    let mut seen: Vec<(Vec<Pos>, MatchShape)> = Vec::new();

    let mut push = |cells: Vec<Pos>, shape: MatchShape, out: &mut Vec<Candidate>| {
        if seen.iter().any(|(c, s)| *s == shape && *c == cells) {
            return;
        }
        seen.push((cells.clone(), shape));
        let indices = cells.iter().map(|p| index[p]).collect();
        let has_focus = foci.iter().any(|f| cells.contains(f));
        out.push(Candidate { score: shape_score(shape), cells, indices, shape, has_focus });
    };

    for &p in &component.positions {
        // Horizontal windows anchored at p.
        if contains(Pos::new(p.x + 1, p.y)) && contains(Pos::new(p.x + 2, p.y)) {
            let w3 = [p, Pos::new(p.x + 1, p.y), Pos::new(p.x + 2, p.y)];
            h3.push(w3);
            push(w3.to_vec(), MatchShape::Straight3, &mut out);
            if contains(Pos::new(p.x + 3, p.y)) {
                let w4: Vec<Pos> = (0..4).map(|i| Pos::new(p.x + i, p.y)).collect();
                push(w4, MatchShape::Straight4Horizontal, &mut out);
                if contains(Pos::new(p.x + 4, p.y)) {
                    let w5: Vec<Pos> = (0..5).map(|i| Pos::new(p.x + i, p.y)).collect();
                    push(w5, MatchShape::Straight5, &mut out);
                }
            }
        }
        // Vertical windows anchored at p.
        if contains(Pos::new(p.x, p.y + 1)) && contains(Pos::new(p.x, p.y + 2)) {
            let w3 = [p, Pos::new(p.x, p.y + 1), Pos::new(p.x, p.y + 2)];
            v3.push(w3);
            push(w3.to_vec(), MatchShape::Straight3, &mut out);
            if contains(Pos::new(p.x, p.y + 3)) {
                let w4: Vec<Pos> = (0..4).map(|i| Pos::new(p.x, p.y + i)).collect();
                push(w4, MatchShape::Straight4Vertical, &mut out);
                if contains(Pos::new(p.x, p.y + 4)) {
                    let w5: Vec<Pos> = (0..5).map(|i| Pos::new(p.x, p.y + i)).collect();
                    push(w5, MatchShape::Straight5, &mut out);
                }
            }
        }
        // 2×2 squares anchored at p.
        if contains(Pos::new(p.x + 1, p.y))
            && contains(Pos::new(p.x, p.y + 1))
            && contains(Pos::new(p.x + 1, p.y + 1))
        {
            let square =
                vec![p, Pos::new(p.x + 1, p.y), Pos::new(p.x, p.y + 1), Pos::new(p.x + 1, p.y + 1)];
            push(square, MatchShape::Square, &mut out);
        }
    }

    // L/T of 5: a horizontal 3 and a vertical 3 sharing exactly one cell.
    for hw in &h3 {
        for vw in &v3 {
            let shared = hw.iter().filter(|&p| vw.contains(p)).count();
            if shared != 1 {
                continue;
            }
            let mut cells: Vec<Pos> = hw.to_vec();
            for &p in vw {
                if !cells.contains(&p) {
                    cells.push(p);
                }
            }
            cells.sort();
            push(cells, MatchShape::Bent5, &mut out);
        }
    }

    out
}

/// Exhaustive search over non-overlapping candidate sets, maximizing
/// (total score, contains-a-focus). Only used for components of ≤ 12 cells,
/// so a u64 occupancy mask over component-local indices always fits.
fn exact_partition(candidates: &[Candidate]) -> Vec<Candidate> {
    struct Best {
        score: u32,
        has_focus: bool,
        chosen: Vec<usize>,
    }

    fn mask_of(cand: &Candidate) -> u64 {
        cand.indices.iter().fold(0u64, |m, &i| m | 1u64 << i)
    }

    fn dfs(
        candidates: &[Candidate],
        masks: &[u64],
        start: usize,
        used: u64,
        score: u32,
        has_focus: bool,
        chosen: &mut Vec<usize>,
        best: &mut Best,
    ) {
        if score > best.score || (score == best.score && has_focus && !best.has_focus) {
            best.score = score;
            best.has_focus = has_focus;
            best.chosen = chosen.clone();
        }
        for i in start..candidates.len() {
            if used & masks[i] != 0 {
                continue;
            }
            chosen.push(i);
            dfs(
                candidates,
                masks,
                i + 1,
                used | masks[i],
                score + candidates[i].score,
                has_focus || candidates[i].has_focus,
                chosen,
                best,
            );
            chosen.pop();
        }
    }

    let masks: Vec<u64> = candidates.iter().map(mask_of).collect();
    let mut best = Best { score: 0, has_focus: false, chosen: Vec::new() };
    let mut chosen = Vec::new();
    dfs(candidates, &masks, 0, 0, 0, false, &mut chosen, &mut best);
    best.chosen.iter().map(|&i| candidates[i].clone()).collect()
}

/// Greedy fallback for oversized components: highest score first, skipping
/// overlaps. Reproduces the source's bounded "global optimal" behavior.
fn greedy_partition(candidates: &[Candidate], cell_count: usize) -> Vec<Candidate> {
    let mut used = vec![false; cell_count];
    let mut chosen = Vec::new();
    for cand in candidates {
        if cand.indices.iter().any(|&i| used[i]) {
            continue;
        }
        for &i in &cand.indices {
            used[i] = true;
        }
        chosen.push(cand.clone());
    }
    chosen
}
