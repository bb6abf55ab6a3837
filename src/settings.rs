use std::fs;
use std::path::Path;
use std::time::Duration;

use relief_geom::Vec3;
use relief_mesh_cpu::{MAX_VERTICES_PER_MESH, MeshStyle};
use relief_world::NoiseParams;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("chunk size level {0} outside 1..=8")]
    ChunkSizeLevel(u32),
    #[error("smooth grid needs {vertices} vertices, over the {budget} per-chunk budget")]
    VertexBudget { vertices: usize, budget: usize },
    #[error("height range is empty (min {min}, max {max})")]
    EmptyHeightRange { min: f32, max: f32 },
    #[error("heights divisor must be non-zero")]
    ZeroDivisor,
    #[error("noise octaves must be at least 1")]
    NoOctaves,
    #[error("cell size must be positive on every axis")]
    NonPositiveCellSize,
    #[error("frame budget must be positive")]
    NonPositiveBudget,
    #[error("read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse settings: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Mesh builder strategy selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerrainStyle {
    Smooth,
    Blocky,
}

/// Static terrain configuration, supplied once at construction. Every field
/// has a serde default so a partial TOML file deserializes into a working
/// setup; `validate` runs fail-fast checks before any chunk is touched.
#[derive(Clone, Debug, Deserialize)]
pub struct TerrainSettings {
    /// World position of terrain grid point (0, 0).
    #[serde(default)]
    pub origin: [f32; 3],
    #[serde(default = "default_cell_size")]
    pub cell_size: [f32; 3],
    /// Chunk side length in cells is `2^chunk_size_level`.
    #[serde(default = "default_chunk_size_level")]
    pub chunk_size_level: u32,
    /// Needed-set radius in chunks around the reference point.
    #[serde(default = "default_render_distance")]
    pub render_distance: u32,
    /// When false the driver never reconciles on reference movement.
    #[serde(default = "default_true")]
    pub dynamic_loading: bool,
    /// When false generation runs on the caller thread and chunks move
    /// straight to active.
    #[serde(default = "default_true")]
    pub parallel_loading: bool,
    /// Background worker threads; 0 picks from available parallelism.
    #[serde(default)]
    pub worker_threads: usize,
    /// Per-frame integration/reconcile budget. Advisory pacing: overruns
    /// defer work to the next frame, nothing is dropped.
    #[serde(default = "default_frame_budget_ms")]
    pub frame_budget_ms: f32,
    #[serde(default = "default_style")]
    pub style: TerrainStyle,
    /// Blocky only: merge uniform-height regions through the quadtree.
    #[serde(default)]
    pub use_split_and_merge: bool,
    #[serde(default)]
    pub noise: NoiseParams,
}

fn default_cell_size() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}
fn default_chunk_size_level() -> u32 {
    4
}
fn default_render_distance() -> u32 {
    4
}
fn default_true() -> bool {
    true
}
fn default_frame_budget_ms() -> f32 {
    8.0
}
fn default_style() -> TerrainStyle {
    TerrainStyle::Smooth
}

impl Default for TerrainSettings {
    fn default() -> Self {
        Self {
            origin: [0.0; 3],
            cell_size: default_cell_size(),
            chunk_size_level: default_chunk_size_level(),
            render_distance: default_render_distance(),
            dynamic_loading: true,
            parallel_loading: true,
            worker_threads: 0,
            frame_budget_ms: default_frame_budget_ms(),
            style: default_style(),
            use_split_and_merge: false,
            noise: NoiseParams::default(),
        }
    }
}

impl TerrainSettings {
    pub fn from_path(path: &Path) -> Result<Self, SettingsError> {
        let text = fs::read_to_string(path)?;
        let settings: Self = toml::from_str(&text)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(1..=8).contains(&self.chunk_size_level) {
            return Err(SettingsError::ChunkSizeLevel(self.chunk_size_level));
        }
        let dim = (1usize << self.chunk_size_level) + 1;
        let vertices = dim * dim;
        if vertices > MAX_VERTICES_PER_MESH {
            return Err(SettingsError::VertexBudget {
                vertices,
                budget: MAX_VERTICES_PER_MESH,
            });
        }
        if self.noise.max_height == self.noise.min_height {
            return Err(SettingsError::EmptyHeightRange {
                min: self.noise.min_height,
                max: self.noise.max_height,
            });
        }
        if self.noise.divisor == 0.0 {
            return Err(SettingsError::ZeroDivisor);
        }
        if self.noise.octaves == 0 {
            return Err(SettingsError::NoOctaves);
        }
        if self.cell_size.iter().any(|c| *c <= 0.0) {
            return Err(SettingsError::NonPositiveCellSize);
        }
        if self.frame_budget_ms <= 0.0 {
            return Err(SettingsError::NonPositiveBudget);
        }
        Ok(())
    }

    #[inline]
    pub fn chunk_size(&self) -> i32 {
        1 << self.chunk_size_level
    }

    #[inline]
    pub fn origin_vec(&self) -> Vec3 {
        Vec3::new(self.origin[0], self.origin[1], self.origin[2])
    }

    #[inline]
    pub fn cell_size_vec(&self) -> Vec3 {
        Vec3::new(self.cell_size[0], self.cell_size[1], self.cell_size[2])
    }

    #[inline]
    pub fn frame_budget(&self) -> Duration {
        Duration::from_secs_f32(self.frame_budget_ms / 1000.0)
    }

    pub fn mesh_style(&self) -> MeshStyle {
        match self.style {
            TerrainStyle::Smooth => MeshStyle::Smooth,
            TerrainStyle::Blocky => MeshStyle::Blocky {
                split_and_merge: self.use_split_and_merge,
            },
        }
    }

    /// World-space needed-set radius:
    /// `render_distance × chunk_size × max(cell_size.x, cell_size.z)`.
    pub fn render_real_distance(&self) -> f32 {
        self.render_distance as f32
            * self.chunk_size() as f32
            * self.cell_size[0].max(self.cell_size[2])
    }
}
