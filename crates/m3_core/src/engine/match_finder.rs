//! Match detection.
//!
//! Connected components of same-colored matchable tiles (4-connectivity,
//! iterative BFS). A component is valid iff it contains at least one
//! straight run of 3 along a row or column; only valid components reach the
//! bomb generator.

use fxhash::FxHashSet;

use super::board::GameBoard;
use super::grid::Pos;
use super::pools::ScratchPools;
use super::tile::TileColor;

/// One connected component of matchable same-colored tiles.
/// `positions` is sorted in scanline order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub color: TileColor,
    pub positions: Vec<Pos>,
}

impl Component {
    /// True if the component contains a horizontal or vertical run of 3.
    pub fn has_straight_run(&self) -> bool {
        let set: FxHashSet<Pos> = self.positions.iter().copied().collect();
        for &p in &self.positions {
            if set.contains(&Pos::new(p.x + 1, p.y)) && set.contains(&Pos::new(p.x + 2, p.y)) {
                return true;
            }
            if set.contains(&Pos::new(p.x, p.y + 1)) && set.contains(&Pos::new(p.x, p.y + 2)) {
                return true;
            }
        }
        false
    }
}

/// Scans the whole board and returns every valid component, ordered by the
/// scanline position of each component's first cell.
pub fn find_components(board: &GameBoard, pools: &mut ScratchPools) -> Vec<Component> {
    let dims = board.dims();
    let mut visited = pools.take_flags(dims.len());
    let mut queue = pools.take_queue();
    let mut components = Vec::new();

    for start in dims.iter() {
        let idx = dims.idx(start);
        if visited[idx] || !board.is_matchable(start) {
            continue;
        }
        // Matchable tiles always carry a color.
        let color = match board.tile(start).and_then(|t| t.color) {
            Some(c) => c,
            None => continue,
        };

        let mut positions = pools.take_positions();
        queue.clear();
        queue.push_back(start);
        visited[idx] = true;

        while let Some(pos) = queue.pop_front() {
            positions.push(pos);
            for next in pos.neighbors4() {
                if !dims.contains(next) {
                    continue;
                }
                let next_idx = dims.idx(next);
                if visited[next_idx] || !board.is_matchable(next) {
                    continue;
                }
                if board.tile(next).and_then(|t| t.color) != Some(color) {
                    continue;
                }
                visited[next_idx] = true;
                queue.push_back(next);
            }
        }

        if positions.len() >= 3 {
            positions.sort();
            let component = Component { color, positions: positions.clone() };
            if component.has_straight_run() {
                components.push(component);
            }
        }
        pools.put_positions(positions);
    }

    pools.put_queue(queue);
    pools.put_flags(visited);
    components
}

/// Cheap probe used by the stability check.
pub fn has_any_match(board: &GameBoard, pools: &mut ScratchPools) -> bool {
    !find_components(board, pools).is_empty()
}
