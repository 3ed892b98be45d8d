//! Grid coordinates and indexing.
//!
//! The board is W×H, row-major (`idx = y * width + x`), with Y growing
//! downward. Every subsystem that walks "scanline order" iterates y outer,
//! x inner, which is what keeps tied events byte-stable across runs.

use serde::{Deserialize, Serialize};

/// A cell position. Both coordinates are 0-based; negative values never
/// address a live cell and only appear transiently in neighbour math.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pos {
    pub y: i32,
    pub x: i32,
}

impl Pos {
    pub fn new(x: i32, y: i32) -> Self {
        Pos { x, y }
    }

    /// Row-major flat index. Caller guarantees the position is in bounds.
    #[inline]
    pub fn idx(self, width: i32) -> usize {
        (self.y * width + self.x) as usize
    }

    /// The four orthogonal neighbours (up, left, right, down — scanline order).
    pub fn neighbors4(self) -> [Pos; 4] {
        [
            Pos::new(self.x, self.y - 1),
            Pos::new(self.x - 1, self.y),
            Pos::new(self.x + 1, self.y),
            Pos::new(self.x, self.y + 1),
        ]
    }

    /// True if `other` shares an edge with `self`.
    pub fn is_adjacent(self, other: Pos) -> bool {
        (self.x - other.x).abs() + (self.y - other.y).abs() == 1
    }
}

/// Board dimensions plus bounds/index helpers shared by all layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridDims {
    pub width: i32,
    pub height: i32,
}

impl GridDims {
    pub fn new(width: i32, height: i32) -> Self {
        GridDims { width, height }
    }

    #[inline]
    pub fn len(self) -> usize {
        (self.width * self.height) as usize
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline]
    pub fn contains(self, pos: Pos) -> bool {
        pos.x >= 0 && pos.x < self.width && pos.y >= 0 && pos.y < self.height
    }

    #[inline]
    pub fn idx(self, pos: Pos) -> usize {
        pos.idx(self.width)
    }

    /// Inverse of `idx`.
    #[inline]
    pub fn pos(self, idx: usize) -> Pos {
        let idx = idx as i32;
        Pos::new(idx % self.width, idx / self.width)
    }

    /// All positions in scanline (row-major) order.
    pub fn iter(self) -> impl Iterator<Item = Pos> {
        let width = self.width;
        let height = self.height;
        (0..height).flat_map(move |y| (0..width).map(move |x| Pos::new(x, y)))
    }
}
