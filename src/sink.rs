use relief_mesh_cpu::ChunkMeshCPU;
use relief_world::ChunkCoord;

/// Rendering-surface seam. The terrain hands every activated chunk's frozen
/// buffers to the sink and announces evictions; what the sink does with
/// them (GPU upload, collider cooking) is outside this core.
pub trait ChunkSink: Send {
    fn upload(&mut self, coord: ChunkCoord, mesh: &ChunkMeshCPU);
    fn discard(&mut self, coord: ChunkCoord);
}

/// Ignores everything. Headless runs and tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl ChunkSink for NullSink {
    fn upload(&mut self, _coord: ChunkCoord, _mesh: &ChunkMeshCPU) {}
    fn discard(&mut self, _coord: ChunkCoord) {}
}
