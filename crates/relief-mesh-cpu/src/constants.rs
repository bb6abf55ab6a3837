/// Upper bound on vertices per chunk mesh. Chunks are pre-sized at settings
/// validation so a smooth grid of `(chunk_size + 1)²` vertices stays under
/// this; the blocky builder warns if skirts push a mesh past it.
pub const MAX_VERTICES_PER_MESH: usize = 65536;
