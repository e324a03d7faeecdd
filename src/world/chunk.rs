//! Chunked tile storage
//!
//! The world is a dense grid of fixed-size chunks; global ↔ (chunk, local)
//! translation is pure arithmetic. Worlds smaller than one chunk round the
//! chunk grid up and let `in_bounds` gate the logical rectangle.

use crate::world::tile::{Terrain, Tile};

/// Side length of one square chunk, in cells.
pub const CHUNK_SIZE: i32 = 64;

/// A CHUNK_SIZE × CHUNK_SIZE block of tiles, row-major
#[derive(Debug, Clone)]
pub struct Chunk {
    tiles: Vec<Tile>,
}

impl Chunk {
    pub fn new(fill: Terrain) -> Self {
        let count = (CHUNK_SIZE * CHUNK_SIZE) as usize;
        Self {
            tiles: (0..count).map(|_| Tile::new(fill)).collect(),
        }
    }

    pub fn tile(&self, local_x: i32, local_y: i32) -> &Tile {
        &self.tiles[(local_y * CHUNK_SIZE + local_x) as usize]
    }

    pub fn tile_mut(&mut self, local_x: i32, local_y: i32) -> &mut Tile {
        &mut self.tiles[(local_y * CHUNK_SIZE + local_x) as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_holds_full_grid() {
        let chunk = Chunk::new(Terrain::Ground);
        assert!(chunk.tile(0, 0).is_passable());
        assert!(chunk.tile(CHUNK_SIZE - 1, CHUNK_SIZE - 1).is_passable());
    }

    #[test]
    fn test_chunk_cells_are_independent() {
        let mut chunk = Chunk::new(Terrain::Ground);
        chunk.tile_mut(3, 4).set_terrain(Terrain::Wall);
        assert!(!chunk.tile(3, 4).is_passable());
        assert!(chunk.tile(4, 3).is_passable());
    }
}
