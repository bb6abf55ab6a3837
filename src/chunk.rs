use relief_chunk::CellGrid;
use relief_mesh_cpu::ChunkMeshCPU;
use relief_runtime::JobOut;
use relief_world::ChunkCoord;

/// The unit of loading and unloading: one square tile of cells plus its
/// finished geometry. Immutable once it reaches a registry bucket; ownership
/// moves between buckets, never duplicates.
#[derive(Debug)]
pub struct TerrainChunk {
    pub coord: ChunkCoord,
    /// Terrain position of cell (0, 0).
    pub cells_offset: (i32, i32),
    pub cells: CellGrid,
    /// `None` for geometry-less region (map) chunks.
    pub mesh: Option<ChunkMeshCPU>,
    pub t_gen_ms: u32,
    pub t_mesh_ms: u32,
}

impl TerrainChunk {
    pub(crate) fn from_job(out: JobOut) -> Self {
        let cells_offset = out.cells.get(0, 0).terrain_pos;
        Self {
            coord: out.coord,
            cells_offset,
            cells: out.cells,
            mesh: Some(out.mesh),
            t_gen_ms: out.t_gen_ms,
            t_mesh_ms: out.t_mesh_ms,
        }
    }

    pub(crate) fn for_map(coord: ChunkCoord, cells: CellGrid, t_gen_ms: u32) -> Self {
        let cells_offset = cells.get(0, 0).terrain_pos;
        Self {
            coord,
            cells_offset,
            cells,
            mesh: None,
            t_gen_ms,
            t_mesh_ms: 0,
        }
    }
}
