//! Tile layer types.

use serde::{Deserialize, Serialize};

/// Stable tile identity, monotonically assigned and never reused within a
/// session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TileId(pub u64);

/// Index into the level's color palette (0-based, `< color_count`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct TileColor(pub u8);

/// Power-up carried by a tile. A plain tile has `BombKind::None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BombKind {
    None,
    HorizontalRocket,
    VerticalRocket,
    Area,
    /// Rainbow wildcard. The only bomb kind without a color.
    Color,
    Ufo,
}

impl BombKind {
    pub fn is_some(self) -> bool {
        self != BombKind::None
    }
}

/// The interactive colored cell occupying one grid index.
///
/// `visual` is the float position used by animation interpolation; the core
/// only writes it at spawn (one cell above the grid cell) and at
/// resolution-cycle end, everything in between is the renderer's business.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub id: TileId,
    pub color: Option<TileColor>,
    pub bomb: BombKind,
    pub visual: (f32, f32),
    pub is_falling: bool,
}

impl Tile {
    pub fn colored(id: TileId, color: TileColor, x: f32, y: f32) -> Self {
        Tile { id, color: Some(color), bomb: BombKind::None, visual: (x, y), is_falling: false }
    }

    pub fn with_bomb(id: TileId, color: Option<TileColor>, bomb: BombKind, x: f32, y: f32) -> Self {
        debug_assert_eq!(bomb == BombKind::Color, color.is_none());
        Tile { id, color, bomb, visual: (x, y), is_falling: false }
    }

    /// A tile participates in color matching iff it has a color. Color bombs
    /// never match; they only activate.
    pub fn is_matchable(&self) -> bool {
        self.color.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_bomb_has_no_color() {
        let t = Tile::with_bomb(TileId(1), None, BombKind::Color, 0.0, 0.0);
        assert!(!t.is_matchable());
        assert!(t.bomb.is_some());
    }

    #[test]
    fn test_plain_tile_matchable() {
        let t = Tile::colored(TileId(2), TileColor(3), 1.0, 2.0);
        assert!(t.is_matchable());
        assert_eq!(t.bomb, BombKind::None);
        assert!(!t.is_falling);
    }
}
