use std::collections::VecDeque;
use std::sync::Arc;

use hashbrown::{HashMap, HashSet};
use relief_world::ChunkCoord;

use crate::chunk::TerrainChunk;

/// Which bucket currently owns a coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChunkStage {
    /// A generation task is in flight for the coordinate.
    Loading,
    /// Generated but not yet integrated into the active set.
    Built,
    /// Integrated, queryable, rendered.
    Active,
    /// Geometry-less chunk serving the overview renderer only.
    ForMap,
}

/// The four mutually exclusive chunk buckets. A coordinate lives in at most
/// one bucket at a time and the transition methods below are the only
/// mutation path; the owning terrain serializes access behind one lock.
#[derive(Default)]
pub(crate) struct ChunkRegistry {
    loading: HashSet<ChunkCoord>,
    /// Kept in completion order; drained front-first under the frame budget.
    built: VecDeque<TerrainChunk>,
    active: HashMap<ChunkCoord, Arc<TerrainChunk>>,
    for_map: HashMap<ChunkCoord, Arc<TerrainChunk>>,
}

impl ChunkRegistry {
    pub fn stage_of(&self, coord: ChunkCoord) -> Option<ChunkStage> {
        if self.loading.contains(&coord) {
            Some(ChunkStage::Loading)
        } else if self.built.iter().any(|c| c.coord == coord) {
            Some(ChunkStage::Built)
        } else if self.active.contains_key(&coord) {
            Some(ChunkStage::Active)
        } else if self.for_map.contains_key(&coord) {
            Some(ChunkStage::ForMap)
        } else {
            None
        }
    }

    #[inline]
    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.stage_of(coord).is_some()
    }

    /// Unrequested → Loading. Guards the at-most-one-task invariant.
    pub fn begin_loading(&mut self, coord: ChunkCoord) {
        debug_assert!(!self.contains(coord), "coordinate already owned");
        self.loading.insert(coord);
    }

    /// Drops a coordinate's Loading marker, e.g. when its result arrives or
    /// is discarded. Returns whether the coordinate was loading.
    pub fn take_loading(&mut self, coord: ChunkCoord) -> bool {
        self.loading.remove(&coord)
    }

    /// Loading → Built (the coordinate's marker must already be taken).
    pub fn push_built(&mut self, chunk: TerrainChunk) {
        debug_assert!(!self.contains(chunk.coord), "coordinate already owned");
        self.built.push_back(chunk);
    }

    /// Oldest built chunk, if any.
    pub fn pop_built(&mut self) -> Option<TerrainChunk> {
        self.built.pop_front()
    }

    /// Pulls a specific coordinate out of Built (reference-chunk priority).
    pub fn take_built(&mut self, coord: ChunkCoord) -> Option<TerrainChunk> {
        let i = self.built.iter().position(|c| c.coord == coord)?;
        self.built.remove(i)
    }

    /// Built (or synchronous build) → Active.
    pub fn insert_active(&mut self, chunk: TerrainChunk) {
        debug_assert!(!self.contains(chunk.coord), "coordinate already owned");
        self.active.insert(chunk.coord, Arc::new(chunk));
    }

    pub fn get_active(&self, coord: ChunkCoord) -> Option<&Arc<TerrainChunk>> {
        self.active.get(&coord)
    }

    pub fn remove_active(&mut self, coord: ChunkCoord) -> Option<Arc<TerrainChunk>> {
        self.active.remove(&coord)
    }

    pub fn active_coords(&self) -> Vec<ChunkCoord> {
        self.active.keys().copied().collect()
    }

    pub fn insert_for_map(&mut self, chunk: TerrainChunk) {
        debug_assert!(!self.contains(chunk.coord), "coordinate already owned");
        self.for_map.insert(chunk.coord, Arc::new(chunk));
    }

    pub fn get_for_map(&self, coord: ChunkCoord) -> Option<&Arc<TerrainChunk>> {
        self.for_map.get(&coord)
    }

    pub fn remove_for_map(&mut self, coord: ChunkCoord) -> Option<Arc<TerrainChunk>> {
        self.for_map.remove(&coord)
    }

    pub fn for_map_coords(&self) -> Vec<ChunkCoord> {
        self.for_map.keys().copied().collect()
    }

    #[inline]
    pub fn loading_is_empty(&self) -> bool {
        self.loading.is_empty()
    }

    pub fn loading_count(&self) -> usize {
        self.loading.len()
    }

    pub fn built_count(&self) -> usize {
        self.built.len()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn for_map_count(&self) -> usize {
        self.for_map.len()
    }

    /// Empties every bucket. Active chunks must already be discarded from
    /// the sink by the caller.
    pub fn clear(&mut self) {
        self.loading.clear();
        self.built.clear();
        self.active.clear();
        self.for_map.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relief_chunk::CellGrid;
    use relief_world::{HeightFieldGen, NoiseParams};

    fn chunk_at(coord: ChunkCoord) -> TerrainChunk {
        let generator = HeightFieldGen::new(NoiseParams::default());
        let field = generator.generate(coord, 4);
        let cells = CellGrid::from_height_field((coord.cx * 4, coord.cz * 4), &field, false);
        TerrainChunk::for_map(coord, cells, 0)
    }

    #[test]
    fn transitions_keep_one_bucket_per_coord() {
        let mut reg = ChunkRegistry::default();
        let coord = ChunkCoord::new(2, -3);

        reg.begin_loading(coord);
        assert_eq!(reg.stage_of(coord), Some(ChunkStage::Loading));

        assert!(reg.take_loading(coord));
        reg.push_built(chunk_at(coord));
        assert_eq!(reg.stage_of(coord), Some(ChunkStage::Built));

        let chunk = reg.take_built(coord).unwrap();
        reg.insert_active(chunk);
        assert_eq!(reg.stage_of(coord), Some(ChunkStage::Active));

        assert!(reg.remove_active(coord).is_some());
        assert_eq!(reg.stage_of(coord), None);
    }

    #[test]
    fn built_drains_in_completion_order() {
        let mut reg = ChunkRegistry::default();
        for cx in 0..3 {
            reg.push_built(chunk_at(ChunkCoord::new(cx, 0)));
        }
        assert_eq!(reg.pop_built().unwrap().coord, ChunkCoord::new(0, 0));
        assert_eq!(reg.pop_built().unwrap().coord, ChunkCoord::new(1, 0));
        assert_eq!(reg.pop_built().unwrap().coord, ChunkCoord::new(2, 0));
        assert!(reg.pop_built().is_none());
    }
}
