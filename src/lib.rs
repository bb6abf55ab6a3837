//! Streaming procedural height-field terrain around a moving reference
//! point: chunk lifecycle, background generation, time-boxed integration,
//! quadtree simplification and seam-consistent normals.
#![forbid(unsafe_code)]

mod chunk;
mod registry;
mod settings;
mod sink;
mod terrain;

pub use chunk::TerrainChunk;
pub use registry::ChunkStage;
pub use settings::{SettingsError, TerrainSettings, TerrainStyle};
pub use sink::{ChunkSink, NullSink};
pub use terrain::{FrameBudget, Terrain};

pub use relief_chunk::{Cell, CellGrid};
pub use relief_geom::{Vec2, Vec3};
pub use relief_mesh_cpu::{
    ChunkMeshCPU, MAX_VERTICES_PER_MESH, MeshStyle, QuadSector, UniformUv, UvMapper, UvRect,
    quadtree_sectors, single_cell_sectors,
};
pub use relief_world::{ChunkCoord, HeightField, HeightFieldGen, NoiseParams, TerrainFrame};
