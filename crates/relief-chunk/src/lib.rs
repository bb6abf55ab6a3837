//! Per-chunk cell storage built from a padded height field.
#![forbid(unsafe_code)]

use relief_world::HeightField;

/// One terrain grid unit. Immutable after creation; owned by its chunk.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cell {
    pub terrain_pos: (i32, i32),
    pub height: f32,
}

/// `(chunk_size + 1)²` grid of cells; the extra column/row is the edge
/// shared with the neighbouring chunks' first cells.
#[derive(Clone, Debug)]
pub struct CellGrid {
    chunk_size: usize,
    cells: Vec<Cell>,
}

impl CellGrid {
    /// Builds the grid from a chunk's height field. `offset` is the terrain
    /// position of cell `(0, 0)`. With `round` set, heights snap to the
    /// nearest integer step (the blocky terrain variant).
    pub fn from_height_field(offset: (i32, i32), field: &HeightField, round: bool) -> Self {
        let chunk_size = field.chunk_size();
        let dim = chunk_size + 1;
        let mut cells = Vec::with_capacity(dim * dim);
        for x in 0..dim {
            for z in 0..dim {
                let mut height = field.cell_height(x, z);
                if round {
                    height = height.round();
                }
                cells.push(Cell {
                    terrain_pos: (offset.0 + x as i32, offset.1 + z as i32),
                    height,
                });
            }
        }
        Self { chunk_size, cells }
    }

    #[inline]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Side length of the grid (`chunk_size + 1`).
    #[inline]
    pub fn dim(&self) -> usize {
        self.chunk_size + 1
    }

    #[inline]
    fn idx(&self, x: usize, z: usize) -> usize {
        x * self.dim() + z
    }

    #[inline]
    pub fn get(&self, x: usize, z: usize) -> Cell {
        self.cells[self.idx(x, z)]
    }

    /// Cell at an absolute terrain position, if it falls inside this grid.
    pub fn get_terrain(&self, pos: (i32, i32)) -> Option<Cell> {
        let first = self.cells[0].terrain_pos;
        let lx = pos.0 - first.0;
        let lz = pos.1 - first.1;
        if lx < 0 || lz < 0 || lx as usize >= self.dim() || lz as usize >= self.dim() {
            return None;
        }
        Some(self.get(lx as usize, lz as usize))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relief_world::{ChunkCoord, HeightFieldGen, NoiseParams};

    fn make_gen() -> HeightFieldGen {
        HeightFieldGen::new(NoiseParams {
            seed: 7,
            ..NoiseParams::default()
        })
    }

    #[test]
    fn cells_carry_offset_terrain_positions() {
        let field = make_gen().generate(ChunkCoord::new(-1, 2), 8);
        let grid = CellGrid::from_height_field((-8, 16), &field, false);
        assert_eq!(grid.get(0, 0).terrain_pos, (-8, 16));
        assert_eq!(grid.get(8, 8).terrain_pos, (0, 24));
        assert_eq!(grid.get_terrain((-5, 20)).unwrap().terrain_pos, (-5, 20));
        assert!(grid.get_terrain((1, 20)).is_none());
        assert!(grid.get_terrain((-9, 20)).is_none());
    }

    #[test]
    fn rounded_grid_snaps_heights() {
        let field = make_gen().generate(ChunkCoord::new(0, 0), 8);
        let raw = CellGrid::from_height_field((0, 0), &field, false);
        let rounded = CellGrid::from_height_field((0, 0), &field, true);
        for x in 0..=8 {
            for z in 0..=8 {
                assert_eq!(rounded.get(x, z).height, raw.get(x, z).height.round());
            }
        }
    }

    #[test]
    fn adjacent_chunks_share_edge_heights() {
        let g = make_gen();
        let a = CellGrid::from_height_field((0, 0), &g.generate(ChunkCoord::new(0, 0), 8), false);
        let b = CellGrid::from_height_field((8, 0), &g.generate(ChunkCoord::new(1, 0), 8), false);
        for z in 0..=8 {
            assert_eq!(a.get(8, z).height, b.get(0, z).height);
        }
    }
}
