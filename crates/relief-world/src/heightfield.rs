use fastnoise_lite::{FastNoiseLite, NoiseType};

use crate::coords::ChunkCoord;
use crate::params::NoiseParams;

/// Padded per-chunk grid of height samples, `(chunk_size + 3)²` wide: one
/// extra column/row for the cell grid's own top-right edge and a one-sample
/// halo ring beyond that, reserved for boundary normal computation.
///
/// Sample `(x, z)` of the cell grid lives at padded index `(x + 1, z + 1)`.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightField {
    chunk_size: usize,
    dim: usize,
    data: Vec<f32>,
}

impl HeightField {
    pub fn from_samples(chunk_size: usize, data: Vec<f32>) -> Self {
        let dim = chunk_size + 3;
        debug_assert_eq!(data.len(), dim * dim);
        Self {
            chunk_size,
            dim,
            data,
        }
    }

    #[inline]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Side length of the padded grid (`chunk_size + 3`).
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Raw padded-grid sample; `(0, 0)` is the halo corner.
    #[inline]
    pub fn sample(&self, px: usize, pz: usize) -> f32 {
        self.data[px * self.dim + pz]
    }

    /// Height of cell-grid point `(x, z)` for `x, z` in `0..=chunk_size + 1`.
    #[inline]
    pub fn cell_height(&self, x: usize, z: usize) -> f32 {
        self.sample(x + 1, z + 1)
    }
}

/// Wraps the noise source behind the pure `height_at` contract: identical
/// inputs always produce identical samples, so chunks can be generated in
/// any order without visible seams.
#[derive(Clone, Debug)]
pub struct HeightFieldGen {
    params: NoiseParams,
}

impl HeightFieldGen {
    pub fn new(params: NoiseParams) -> Self {
        Self { params }
    }

    #[inline]
    pub fn params(&self) -> &NoiseParams {
        &self.params
    }

    fn sampler(&self) -> FastNoiseLite {
        let mut noise = FastNoiseLite::with_seed(self.params.seed);
        noise.set_noise_type(Some(NoiseType::Perlin));
        noise.set_frequency(Some(1.0 / self.params.divisor));
        noise
    }

    /// Deterministic height at a global terrain grid point.
    pub fn height_at(&self, gx: i32, gz: i32) -> f32 {
        let noise = self.sampler();
        self.fbm(&noise, gx, gz)
    }

    fn fbm(&self, noise: &FastNoiseLite, gx: i32, gz: i32) -> f32 {
        let p = &self.params;
        let mut amp = 1.0f32;
        let mut freq = 1.0f32;
        let mut sum = 0.0f32;
        let mut total_amp = 0.0f32;
        for _ in 0..p.octaves {
            sum += noise.get_noise_2d(gx as f32 * freq, gz as f32 * freq) * amp;
            total_amp += amp;
            amp *= p.persistence;
            freq *= p.lacunarity;
        }
        let n = if total_amp > 0.0 { sum / total_amp } else { 0.0 };
        p.min_height + (n * 0.5 + 0.5) * (p.max_height - p.min_height)
    }

    /// Builds the padded height field of a chunk. Global sample coordinates
    /// start at `(chunk − 1) × chunk_size` so the halo ring carries the
    /// neighbouring chunks' edge heights.
    pub fn generate(&self, chunk: ChunkCoord, chunk_size: usize) -> HeightField {
        let dim = chunk_size + 3;
        let base_x = (chunk.cx - 1) * chunk_size as i32;
        let base_z = (chunk.cz - 1) * chunk_size as i32;
        let noise = self.sampler();
        let mut data = Vec::with_capacity(dim * dim);
        for x in 0..dim {
            for z in 0..dim {
                data.push(self.fbm(&noise, base_x + x as i32, base_z + z as i32));
            }
        }
        HeightField::from_samples(chunk_size, data)
    }
}
