use relief_geom::Vec3;
use serde::{Deserialize, Serialize};

/// Key of a terrain chunk on the XZ chunk grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub cx: i32,
    pub cz: i32,
}

impl ChunkCoord {
    #[inline]
    pub const fn new(cx: i32, cz: i32) -> Self {
        Self { cx, cz }
    }

    #[inline]
    pub fn offset(self, dx: i32, dz: i32) -> Self {
        Self {
            cx: self.cx + dx,
            cz: self.cz + dz,
        }
    }
}

impl From<(i32, i32)> for ChunkCoord {
    fn from(value: (i32, i32)) -> Self {
        Self::new(value.0, value.1)
    }
}

impl From<ChunkCoord> for (i32, i32) {
    fn from(value: ChunkCoord) -> Self {
        (value.cx, value.cz)
    }
}

/// Placement of the terrain grid in world space: origin, per-axis cell size
/// and the side length of a chunk in cells.
///
/// Every conversion that divides by the cell or chunk size floors toward
/// negative infinity, so terrain cell −1 belongs to chunk −1, never chunk 0.
/// All cache keys are derived through these conversions.
#[derive(Clone, Copy, Debug)]
pub struct TerrainFrame {
    pub origin: Vec3,
    pub cell_size: Vec3,
    pub chunk_size: i32,
}

impl TerrainFrame {
    pub fn new(origin: Vec3, cell_size: Vec3, chunk_size: i32) -> Self {
        Self {
            origin,
            cell_size,
            chunk_size,
        }
    }

    /// World position of a terrain grid point at the given height sample.
    #[inline]
    pub fn terrain_to_real(&self, pos: (i32, i32), height: f32) -> Vec3 {
        self.origin
            + Vec3::new(
                pos.0 as f32 * self.cell_size.x,
                height * self.cell_size.y,
                pos.1 as f32 * self.cell_size.z,
            )
    }

    /// Terrain grid coordinates (x, height index, z) containing a world position.
    #[inline]
    pub fn real_to_terrain(&self, p: Vec3) -> (i32, i32, i32) {
        let rel = p - self.origin;
        (
            (rel.x / self.cell_size.x).floor() as i32,
            (rel.y / self.cell_size.y).floor() as i32,
            (rel.z / self.cell_size.z).floor() as i32,
        )
    }

    #[inline]
    pub fn terrain_to_chunk(&self, pos: (i32, i32)) -> ChunkCoord {
        ChunkCoord::new(
            pos.0.div_euclid(self.chunk_size),
            pos.1.div_euclid(self.chunk_size),
        )
    }

    #[inline]
    pub fn real_to_chunk(&self, p: Vec3) -> ChunkCoord {
        let (tx, _, tz) = self.real_to_terrain(p);
        self.terrain_to_chunk((tx, tz))
    }

    /// World position of a chunk's minimum (south-west) grid corner.
    #[inline]
    pub fn chunk_to_real(&self, chunk: ChunkCoord) -> Vec3 {
        self.terrain_to_real(self.cells_offset(chunk), 0.0)
    }

    /// Terrain coordinates of the chunk's first cell.
    #[inline]
    pub fn cells_offset(&self, chunk: ChunkCoord) -> (i32, i32) {
        (chunk.cx * self.chunk_size, chunk.cz * self.chunk_size)
    }

    /// Planar distance from a world position to the chunk's XZ footprint.
    /// Zero whenever the position lies over the chunk.
    pub fn chunk_planar_distance(&self, chunk: ChunkCoord, p: Vec3) -> f32 {
        let min = self.chunk_to_real(chunk);
        let max_x = min.x + self.chunk_size as f32 * self.cell_size.x;
        let max_z = min.z + self.chunk_size as f32 * self.cell_size.z;
        let nearest = Vec3::new(p.x.clamp(min.x, max_x), 0.0, p.z.clamp(min.z, max_z));
        p.planar_distance(nearest)
    }
}
