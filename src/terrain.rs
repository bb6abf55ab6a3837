use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use relief_chunk::{Cell, CellGrid};
use relief_geom::Vec3;
use relief_mesh_cpu::{MeshStyle, UniformUv, UvMapper};
use relief_runtime::{GenJob, JobOut, Runtime, build_chunk};
use relief_world::{ChunkCoord, HeightFieldGen, TerrainFrame};

use crate::chunk::TerrainChunk;
use crate::registry::{ChunkRegistry, ChunkStage};
use crate::settings::{SettingsError, TerrainSettings};
use crate::sink::ChunkSink;

/// How long one blocking wait on the reference chunk's in-flight task lasts
/// before the driver re-checks whether the task still exists.
const REFERENCE_WAIT: Duration = Duration::from_millis(50);

/// Wall-clock budget for one driver pass. Advisory pacing: once expired,
/// remaining work is deferred to the next frame, never dropped.
pub struct FrameBudget {
    start: Instant,
    max: Duration,
}

impl FrameBudget {
    pub fn start(max: Duration) -> Self {
        Self {
            start: Instant::now(),
            max,
        }
    }

    #[inline]
    pub fn expired(&self) -> bool {
        self.start.elapsed() > self.max
    }
}

struct TerrainState {
    registry: ChunkRegistry,
    sink: Box<dyn ChunkSink>,
    reference_pos: Vec3,
    reference_chunk: ChunkCoord,
}

/// Owns the chunk lifecycle: computes the needed set around the reference
/// point, drives background generation, integrates finished chunks under
/// the per-frame budget and serves cell/chunk queries.
///
/// All bucket state lives behind a single lock; background workers never
/// touch it. They hand results back over the runtime channel and this
/// driver is the only reader/mutator of shared structure.
pub struct Terrain {
    settings: TerrainSettings,
    frame: TerrainFrame,
    generator: Arc<HeightFieldGen>,
    style: MeshStyle,
    uv: Arc<dyn UvMapper>,
    runtime: Option<Runtime>,
    state: Mutex<TerrainState>,
}

impl Terrain {
    /// Builds a terrain with the trivial UV mapping and loads the initial
    /// needed set around `reference`. Fails fast on invalid settings.
    pub fn new(
        settings: TerrainSettings,
        reference: Vec3,
        sink: Box<dyn ChunkSink>,
    ) -> Result<Self, SettingsError> {
        Self::with_uv(settings, reference, Arc::new(UniformUv), sink)
    }

    pub fn with_uv(
        settings: TerrainSettings,
        reference: Vec3,
        uv: Arc<dyn UvMapper>,
        sink: Box<dyn ChunkSink>,
    ) -> Result<Self, SettingsError> {
        settings.validate()?;
        let frame = TerrainFrame::new(
            settings.origin_vec(),
            settings.cell_size_vec(),
            settings.chunk_size(),
        );
        let generator = Arc::new(HeightFieldGen::new(settings.noise));
        let style = settings.mesh_style();
        let runtime = settings.parallel_loading.then(|| {
            Runtime::new(
                frame,
                generator.clone(),
                style,
                uv.clone(),
                settings.worker_threads,
            )
        });

        let terrain = Self {
            frame,
            generator,
            style,
            uv,
            runtime,
            state: Mutex::new(TerrainState {
                registry: ChunkRegistry::default(),
                sink,
                reference_pos: reference,
                reference_chunk: frame.real_to_chunk(reference),
            }),
            settings,
        };
        {
            let mut st = terrain.state();
            terrain.load_initial_area(&mut st);
        }
        info!(
            "terrain up: chunk_size={} render_distance={} workers={}",
            terrain.settings.chunk_size(),
            terrain.settings.render_distance,
            terrain.runtime.as_ref().map_or(0, |rt| rt.workers),
        );
        Ok(terrain)
    }

    #[inline]
    pub fn settings(&self) -> &TerrainSettings {
        &self.settings
    }

    #[inline]
    pub fn terrain_frame(&self) -> &TerrainFrame {
        &self.frame
    }

    fn state(&self) -> MutexGuard<'_, TerrainState> {
        self.state.lock().unwrap()
    }

    /// One driver pass: ensure the reference chunk is resident, file worker
    /// results, integrate built chunks and reconcile the needed set, all
    /// bounded by the frame budget.
    pub fn update(&self, reference: Vec3) {
        let budget = FrameBudget::start(self.settings.frame_budget());
        let mut st = self.state();
        st.reference_pos = reference;
        st.reference_chunk = self.frame.real_to_chunk(reference);

        self.ensure_reference(&mut st);
        self.collect_results(&mut st);
        self.integrate_built(&mut st, &budget);
        if self.settings.dynamic_loading {
            self.reconcile(&mut st, &budget);
        }
    }

    /// Chunk coordinates that should currently be resident: the reference
    /// chunk itself, plus every chunk whose footprint lies within the render
    /// distance of the reference point (height ignored).
    pub fn needed_chunks(&self, reference: Vec3) -> Vec<ChunkCoord> {
        let center = self.frame.real_to_chunk(reference);
        let threshold = self.settings.render_real_distance();
        let min_cell = self.settings.cell_size[0].min(self.settings.cell_size[2]);
        let scan = (threshold / (self.frame.chunk_size as f32 * min_cell)).ceil() as i32 + 1;

        let mut needed = Vec::new();
        for dx in -scan..=scan {
            for dz in -scan..=scan {
                let coord = center.offset(dx, dz);
                if self.is_needed(coord, reference) {
                    needed.push(coord);
                }
            }
        }
        needed
    }

    fn is_needed(&self, coord: ChunkCoord, reference: Vec3) -> bool {
        coord == self.frame.real_to_chunk(reference)
            || self.frame.chunk_planar_distance(coord, reference)
                <= self.settings.render_real_distance()
    }

    // ---- queries ----------------------------------------------------------

    /// Cell at a terrain position, if its chunk is loaded. Active chunks win
    /// over geometry-less map chunks; the fallback only applies when asked.
    pub fn get_cell(&self, pos: (i32, i32), allow_region_fallback: bool) -> Option<Cell> {
        let st = self.state();
        let coord = self.frame.terrain_to_chunk(pos);
        if let Some(chunk) = st.registry.get_active(coord) {
            return chunk.cells.get_terrain(pos);
        }
        if allow_region_fallback {
            if let Some(chunk) = st.registry.get_for_map(coord) {
                return chunk.cells.get_terrain(pos);
            }
        }
        None
    }

    /// Cell under a world-space position.
    pub fn get_cell_at(&self, world: Vec3, allow_region_fallback: bool) -> Option<Cell> {
        let (tx, _, tz) = self.frame.real_to_terrain(world);
        self.get_cell((tx, tz), allow_region_fallback)
    }

    /// Active chunk at a chunk coordinate.
    pub fn get_chunk(&self, coord: ChunkCoord) -> Option<Arc<TerrainChunk>> {
        self.state().registry.get_active(coord).cloned()
    }

    pub fn stage_of(&self, coord: ChunkCoord) -> Option<ChunkStage> {
        self.state().registry.stage_of(coord)
    }

    /// Terrain grid position of the reference point.
    pub fn reference_terrain_pos(&self) -> (i32, i32, i32) {
        self.frame.real_to_terrain(self.state().reference_pos)
    }

    pub fn active_coords(&self) -> Vec<ChunkCoord> {
        self.state().registry.active_coords()
    }

    pub fn active_count(&self) -> usize {
        self.state().registry.active_count()
    }

    pub fn loading_count(&self) -> usize {
        self.state().registry.loading_count()
    }

    pub fn built_count(&self) -> usize {
        self.state().registry.built_count()
    }

    pub fn for_map_count(&self) -> usize {
        self.state().registry.for_map_count()
    }

    // ---- region (minimap) cache ------------------------------------------

    /// Keeps the geometry-less map bucket covering the terrain-coordinate
    /// rectangle: drops map chunks outside it and generates cells-only
    /// chunks for coordinates no bucket owns. Loads run on the caller
    /// thread, paced by the optional budget.
    pub fn update_chunks_for_map(
        &self,
        bottom_left: (i32, i32),
        top_right: (i32, i32),
        budget: Option<&FrameBudget>,
    ) {
        let mut st = self.state();
        let lo = self.frame.terrain_to_chunk(bottom_left);
        let hi = self.frame.terrain_to_chunk(top_right);

        for coord in st.registry.for_map_coords() {
            if coord.cx < lo.cx || coord.cx > hi.cx || coord.cz < lo.cz || coord.cz > hi.cz {
                st.registry.remove_for_map(coord);
                debug!("map chunk {coord:?} discarded");
            }
        }

        let round = matches!(self.style, MeshStyle::Blocky { .. });
        for cx in lo.cx..=hi.cx {
            for cz in lo.cz..=hi.cz {
                if budget.is_some_and(|b| b.expired()) {
                    return;
                }
                let coord = ChunkCoord::new(cx, cz);
                if st.registry.contains(coord) {
                    continue;
                }
                let t0 = Instant::now();
                let field = self
                    .generator
                    .generate(coord, self.frame.chunk_size as usize);
                let cells =
                    CellGrid::from_height_field(self.frame.cells_offset(coord), &field, round);
                let t_gen_ms = t0.elapsed().as_millis().min(u128::from(u32::MAX)) as u32;
                st.registry
                    .insert_for_map(TerrainChunk::for_map(coord, cells, t_gen_ms));
            }
        }
    }

    // ---- lifecycle --------------------------------------------------------

    /// Drops every chunk. Outstanding generation tasks are awaited first so
    /// no result outlives its terrain; their chunks are discarded unapplied.
    pub fn teardown(&self) {
        let mut st = self.state();
        self.await_inflight(&mut st);
        for coord in st.registry.active_coords() {
            st.registry.remove_active(coord);
            st.sink.discard(coord);
        }
        st.registry.clear();
        info!("terrain torn down");
    }

    /// Tears the terrain down and reloads it around `reference`.
    pub fn rebuild(&self, reference: Vec3) {
        self.teardown();
        let mut st = self.state();
        st.reference_pos = reference;
        st.reference_chunk = self.frame.real_to_chunk(reference);
        self.load_initial_area(&mut st);
        info!("terrain rebuilt around {:?}", st.reference_chunk);
    }

    // ---- driver internals -------------------------------------------------

    fn load_initial_area(&self, st: &mut TerrainState) {
        self.ensure_reference(st);
        let reference = st.reference_pos;
        let reference_chunk = st.reference_chunk;
        for coord in self.needed_chunks(reference) {
            if coord != reference_chunk {
                self.request_load(st, coord);
            }
        }
    }

    /// The reference chunk is loaded synchronously and with priority. If a
    /// task for it is already in flight the driver blocks on that task
    /// instead of starting a duplicate.
    fn ensure_reference(&self, st: &mut TerrainState) {
        let coord = st.reference_chunk;
        loop {
            match st.registry.stage_of(coord) {
                Some(ChunkStage::Active) => return,
                Some(ChunkStage::Built) => {
                    if let Some(chunk) = st.registry.take_built(coord) {
                        self.activate(st, chunk);
                    }
                    return;
                }
                Some(ChunkStage::Loading) => match &self.runtime {
                    Some(rt) => match rt.recv_result(REFERENCE_WAIT) {
                        Some(out) => self.file_result(st, out),
                        None => {
                            if rt.pending() == 0 && st.registry.take_loading(coord) {
                                warn!("reference chunk {coord:?} task vanished; regenerating");
                            }
                        }
                    },
                    None => {
                        st.registry.take_loading(coord);
                    }
                },
                Some(ChunkStage::ForMap) => {
                    st.registry.remove_for_map(coord);
                }
                None => {
                    let chunk = self.build_sync(coord);
                    self.activate(st, chunk);
                    return;
                }
            }
        }
    }

    /// Moves finished worker results into the Built bucket, discarding any
    /// whose coordinate is no longer needed (or no longer loading).
    fn collect_results(&self, st: &mut TerrainState) {
        let Some(rt) = &self.runtime else { return };
        for out in rt.try_drain() {
            self.file_result(st, out);
        }
    }

    fn file_result(&self, st: &mut TerrainState, out: JobOut) {
        let coord = out.coord;
        if !st.registry.take_loading(coord) {
            debug!("chunk {coord:?} result dropped: not loading");
            return;
        }
        if self.is_needed(coord, st.reference_pos) {
            st.registry.push_built(TerrainChunk::from_job(out));
        } else {
            debug!("chunk {coord:?} discarded while building");
        }
    }

    /// Drains Built into Active in completion order while budget remains.
    fn integrate_built(&self, st: &mut TerrainState, budget: &FrameBudget) {
        while !budget.expired() {
            let Some(chunk) = st.registry.pop_built() else {
                return;
            };
            if self.is_needed(chunk.coord, st.reference_pos) {
                self.activate(st, chunk);
            } else {
                debug!("chunk {:?} discarded before activation", chunk.coord);
            }
        }
    }

    /// Evicts unneeded active chunks and requests loads for needed
    /// coordinates no bucket owns, while budget remains. Leftovers are
    /// picked up next frame.
    fn reconcile(&self, st: &mut TerrainState, budget: &FrameBudget) {
        let reference = st.reference_pos;
        for coord in st.registry.active_coords() {
            if budget.expired() {
                return;
            }
            if !self.is_needed(coord, reference) {
                st.registry.remove_active(coord);
                st.sink.discard(coord);
                debug!("chunk {coord:?} evicted");
            }
        }
        for coord in self.needed_chunks(reference) {
            if budget.expired() {
                return;
            }
            match st.registry.stage_of(coord) {
                None => self.request_load(st, coord),
                // A map-only chunk entering the render set reloads fully.
                Some(ChunkStage::ForMap) => {
                    st.registry.remove_for_map(coord);
                    self.request_load(st, coord);
                }
                _ => {}
            }
        }
    }

    fn request_load(&self, st: &mut TerrainState, coord: ChunkCoord) {
        debug_assert!(!st.registry.contains(coord));
        match &self.runtime {
            Some(rt) => {
                st.registry.begin_loading(coord);
                rt.submit(GenJob { coord });
                debug!("chunk {coord:?} loading");
            }
            None => {
                // Concurrency disabled: straight to active.
                let chunk = self.build_sync(coord);
                self.activate(st, chunk);
            }
        }
    }

    fn build_sync(&self, coord: ChunkCoord) -> TerrainChunk {
        TerrainChunk::from_job(build_chunk(
            &self.frame,
            &self.generator,
            self.style,
            self.uv.as_ref(),
            coord,
        ))
    }

    fn activate(&self, st: &mut TerrainState, chunk: TerrainChunk) {
        if let Some(mesh) = &chunk.mesh {
            st.sink.upload(chunk.coord, mesh);
        }
        debug!(
            "chunk {:?} active (gen {}ms, mesh {}ms)",
            chunk.coord, chunk.t_gen_ms, chunk.t_mesh_ms
        );
        st.registry.insert_active(chunk);
    }

    /// Blocks until every in-flight task has delivered; results are dropped
    /// unapplied. Tasks are never aborted.
    fn await_inflight(&self, st: &mut TerrainState) {
        let Some(rt) = &self.runtime else {
            return;
        };
        while !st.registry.loading_is_empty() {
            match rt.recv_result(REFERENCE_WAIT) {
                Some(out) => {
                    st.registry.take_loading(out.coord);
                }
                None => {
                    if rt.pending() == 0 {
                        // No task can deliver anymore; drop stale markers.
                        break;
                    }
                }
            }
        }
    }
}

impl Drop for Terrain {
    fn drop(&mut self) {
        // Await outstanding tasks so none is still running when the terrain
        // is released. Skipped if a panic already poisoned the state.
        if let Ok(mut st) = self.state.lock() {
            self.await_inflight(&mut st);
        }
    }
}
