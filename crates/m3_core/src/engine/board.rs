//! The board: three co-located layer arrays over one W×H grid.
//!
//! Ground sits below the tile, cover above it. All layer storage is flat
//! row-major `Vec`s; holes from the level layout are permanently
//! unplayable and never hold any layer.

use serde::{Deserialize, Serialize};

use super::grid::{GridDims, Pos};
use super::layers::{Cover, Ground};
use super::tile::{BombKind, Tile, TileColor, TileId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameBoard {
    dims: GridDims,
    color_count: u8,
    tiles: Vec<Option<Tile>>,
    grounds: Vec<Option<Ground>>,
    covers: Vec<Option<Cover>>,
    playable: Vec<bool>,
    next_tile_id: u64,
}

impl GameBoard {
    pub fn new(width: i32, height: i32, color_count: u8) -> Self {
        let dims = GridDims::new(width, height);
        GameBoard {
            dims,
            color_count,
            tiles: vec![None; dims.len()],
            grounds: vec![None; dims.len()],
            covers: vec![None; dims.len()],
            playable: vec![true; dims.len()],
            next_tile_id: 1,
        }
    }

    pub fn dims(&self) -> GridDims {
        self.dims
    }

    pub fn width(&self) -> i32 {
        self.dims.width
    }

    pub fn height(&self) -> i32 {
        self.dims.height
    }

    pub fn color_count(&self) -> u8 {
        self.color_count
    }

    pub fn next_tile_id(&self) -> u64 {
        self.next_tile_id
    }

    /// Allocates the next stable tile id. Ids are monotone and never reused.
    pub fn alloc_tile_id(&mut self) -> TileId {
        let id = TileId(self.next_tile_id);
        self.next_tile_id += 1;
        id
    }

    // ------------------------------------------------------------------
    // Layer access
    // ------------------------------------------------------------------

    pub fn tile(&self, pos: Pos) -> Option<&Tile> {
        if !self.dims.contains(pos) {
            return None;
        }
        self.tiles[self.dims.idx(pos)].as_ref()
    }

    pub fn tile_mut(&mut self, pos: Pos) -> Option<&mut Tile> {
        if !self.dims.contains(pos) {
            return None;
        }
        let idx = self.dims.idx(pos);
        self.tiles[idx].as_mut()
    }

    pub fn set_tile(&mut self, pos: Pos, tile: Option<Tile>) {
        let idx = self.dims.idx(pos);
        self.tiles[idx] = tile;
    }

    pub fn take_tile(&mut self, pos: Pos) -> Option<Tile> {
        let idx = self.dims.idx(pos);
        self.tiles[idx].take()
    }

    pub fn ground(&self, pos: Pos) -> Option<&Ground> {
        if !self.dims.contains(pos) {
            return None;
        }
        self.grounds[self.dims.idx(pos)].as_ref()
    }

    pub fn ground_mut(&mut self, pos: Pos) -> Option<&mut Ground> {
        if !self.dims.contains(pos) {
            return None;
        }
        let idx = self.dims.idx(pos);
        self.grounds[idx].as_mut()
    }

    pub fn set_ground(&mut self, pos: Pos, ground: Option<Ground>) {
        let idx = self.dims.idx(pos);
        self.grounds[idx] = ground;
    }

    pub fn remove_ground(&mut self, pos: Pos) {
        let idx = self.dims.idx(pos);
        self.grounds[idx] = None;
    }

    pub fn cover(&self, pos: Pos) -> Option<&Cover> {
        if !self.dims.contains(pos) {
            return None;
        }
        self.covers[self.dims.idx(pos)].as_ref()
    }

    pub fn cover_mut(&mut self, pos: Pos) -> Option<&mut Cover> {
        if !self.dims.contains(pos) {
            return None;
        }
        let idx = self.dims.idx(pos);
        self.covers[idx].as_mut()
    }

    pub fn set_cover(&mut self, pos: Pos, cover: Option<Cover>) {
        let idx = self.dims.idx(pos);
        self.covers[idx] = cover;
    }

    pub fn remove_cover(&mut self, pos: Pos) {
        let idx = self.dims.idx(pos);
        self.covers[idx] = None;
    }

    /// Moves the cover at `from` to `to` (dynamic covers travelling with
    /// their tile under gravity).
    pub fn transplant_cover(&mut self, from: Pos, to: Pos) {
        let from_idx = self.dims.idx(from);
        let cover = self.covers[from_idx].take();
        let to_idx = self.dims.idx(to);
        self.covers[to_idx] = cover;
    }

    pub fn is_playable(&self, pos: Pos) -> bool {
        self.dims.contains(pos) && self.playable[self.dims.idx(pos)]
    }

    pub fn set_playable(&mut self, pos: Pos, playable: bool) {
        let idx = self.dims.idx(pos);
        self.playable[idx] = playable;
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// A playable cell currently holding no tile.
    pub fn is_empty_playable(&self, pos: Pos) -> bool {
        self.is_playable(pos) && self.tile(pos).is_none()
    }

    /// True if the tile at `pos` can take part in color matching: it has a
    /// color and no cover that blocks matching.
    pub fn is_matchable(&self, pos: Pos) -> bool {
        if !self.is_playable(pos) {
            return false;
        }
        let Some(tile) = self.tile(pos) else { return false };
        if !tile.is_matchable() {
            return false;
        }
        match self.cover(pos) {
            Some(cover) => !cover.kind.blocks_match(),
            None => true,
        }
    }

    /// True if the tile at `pos` may move under gravity.
    pub fn is_movable(&self, pos: Pos) -> bool {
        if self.tile(pos).is_none() {
            return false;
        }
        match self.cover(pos) {
            Some(cover) => !cover.kind.blocks_gravity(),
            None => true,
        }
    }

    /// True if a swap may touch the cell.
    pub fn is_swappable(&self, pos: Pos) -> bool {
        if !self.is_playable(pos) || self.tile(pos).is_none() {
            return false;
        }
        match self.cover(pos) {
            Some(cover) => !cover.kind.blocks_swap(),
            None => true,
        }
    }

    pub fn bomb_at(&self, pos: Pos) -> BombKind {
        self.tile(pos).map_or(BombKind::None, |t| t.bomb)
    }

    /// Exchange the tiles at two cells. Visual positions follow the grid
    /// cells so a completed (or reverted) swap leaves no animation residue.
    pub fn swap_tiles(&mut self, a: Pos, b: Pos) {
        let ia = self.dims.idx(a);
        let ib = self.dims.idx(b);
        self.tiles.swap(ia, ib);
        if let Some(tile) = self.tiles[ia].as_mut() {
            tile.visual = (a.x as f32, a.y as f32);
        }
        if let Some(tile) = self.tiles[ib].as_mut() {
            tile.visual = (b.x as f32, b.y as f32);
        }
    }

    /// Occurrences of each color among live tiles (feeds the refill bias).
    pub fn color_histogram(&self) -> Vec<u32> {
        let mut counts = vec![0u32; self.color_count as usize];
        for tile in self.tiles.iter().flatten() {
            if let Some(TileColor(c)) = tile.color {
                if (c as usize) < counts.len() {
                    counts[c as usize] += 1;
                }
            }
        }
        counts
    }

    /// All positions currently holding a tile, scanline order.
    pub fn occupied_positions(&self) -> Vec<Pos> {
        self.dims.iter().filter(|&p| self.tile(p).is_some()).collect()
    }

    /// True when some tile still has `is_falling` set.
    pub fn any_falling(&self) -> bool {
        self.tiles.iter().flatten().any(|t| t.is_falling)
    }

    /// Clears `is_falling` and parks visual positions on the grid. Called at
    /// the end of a resolution cycle in headless operation.
    pub fn settle_falling(&mut self) {
        for idx in 0..self.tiles.len() {
            let pos = self.dims.pos(idx);
            if let Some(tile) = self.tiles[idx].as_mut() {
                if tile.is_falling {
                    tile.is_falling = false;
                    tile.visual = (pos.x as f32, pos.y as f32);
                }
            }
        }
    }
}
