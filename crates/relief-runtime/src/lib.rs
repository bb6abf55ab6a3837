//! Background chunk generation: job queue and worker pool orchestration.
#![forbid(unsafe_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, unbounded};
use rayon::{ThreadPool, ThreadPoolBuilder};
use relief_chunk::CellGrid;
use relief_mesh_cpu::{ChunkMeshCPU, MeshStyle, UvMapper, build_chunk_mesh};
use relief_world::{ChunkCoord, HeightFieldGen, TerrainFrame};

#[derive(Clone, Copy, Debug)]
pub struct GenJob {
    pub coord: ChunkCoord,
}

/// Finished build for one chunk. Produced entirely from a worker's private
/// buffers; the channel send is the only interaction with shared state.
pub struct JobOut {
    pub coord: ChunkCoord,
    pub cells: CellGrid,
    pub mesh: ChunkMeshCPU,
    pub t_gen_ms: u32,
    pub t_mesh_ms: u32,
}

fn elapsed_ms(t0: Instant) -> u32 {
    t0.elapsed().as_millis().min(u128::from(u32::MAX)) as u32
}

/// Builds one chunk from scratch: padded height field, cells, mesh. Used by
/// the workers and by the synchronous loading path. The height field is
/// dropped once normals are stitched.
pub fn build_chunk(
    frame: &TerrainFrame,
    generator: &HeightFieldGen,
    style: MeshStyle,
    uv: &dyn UvMapper,
    coord: ChunkCoord,
) -> JobOut {
    let t0 = Instant::now();
    let field = generator.generate(coord, frame.chunk_size as usize);
    let round = matches!(style, MeshStyle::Blocky { .. });
    let cells = CellGrid::from_height_field(frame.cells_offset(coord), &field, round);
    let t_gen_ms = elapsed_ms(t0);

    let t0 = Instant::now();
    let mesh = build_chunk_mesh(frame, &cells, &field, style, uv);
    let t_mesh_ms = elapsed_ms(t0);

    JobOut {
        coord,
        cells,
        mesh,
        t_gen_ms,
        t_mesh_ms,
    }
}

/// Worker pool driving chunk generation off the frame loop. One lightweight
/// job per requested chunk; results come back over an unbounded channel and
/// are drained (or, for the reference chunk, awaited) by the driver.
pub struct Runtime {
    job_tx: Sender<GenJob>,
    res_rx: Receiver<JobOut>,
    _pool: Arc<ThreadPool>,
    queued: Arc<AtomicUsize>,
    inflight: Arc<AtomicUsize>,
    pub workers: usize,
}

impl Runtime {
    pub fn new(
        frame: TerrainFrame,
        generator: Arc<HeightFieldGen>,
        style: MeshStyle,
        uv: Arc<dyn UvMapper>,
        workers: usize,
    ) -> Self {
        let workers = if workers > 0 {
            workers
        } else {
            thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
                .saturating_sub(1)
                .max(1)
        };
        let (job_tx, job_rx) = unbounded::<GenJob>();
        let (res_tx, res_rx) = unbounded::<JobOut>();
        let queued = Arc::new(AtomicUsize::new(0));
        let inflight = Arc::new(AtomicUsize::new(0));

        let pool = Arc::new(
            ThreadPoolBuilder::new()
                .num_threads(workers)
                .thread_name(|i| format!("relief-gen-{i}"))
                .build()
                .expect("gen pool"),
        );
        for _ in 0..workers {
            let rx = job_rx.clone();
            let tx = res_tx.clone();
            let generator = generator.clone();
            let uv = uv.clone();
            let queued = queued.clone();
            let inflight = inflight.clone();
            pool.spawn(move || {
                while let Ok(job) = rx.recv() {
                    inflight.fetch_add(1, Ordering::Relaxed);
                    queued.fetch_sub(1, Ordering::Relaxed);
                    let out = build_chunk(&frame, &generator, style, uv.as_ref(), job.coord);
                    let _ = tx.send(out);
                    inflight.fetch_sub(1, Ordering::Relaxed);
                }
            });
        }

        Self {
            job_tx,
            res_rx,
            _pool: pool,
            queued,
            inflight,
            workers,
        }
    }

    pub fn submit(&self, job: GenJob) {
        self.queued.fetch_add(1, Ordering::Relaxed);
        if self.job_tx.send(job).is_err() {
            self.queued.fetch_sub(1, Ordering::Relaxed);
        }
    }

    /// Non-blocking drain of every finished result.
    pub fn try_drain(&self) -> Vec<JobOut> {
        self.res_rx.try_iter().collect()
    }

    /// Blocks for the next finished result; the driver uses this only for
    /// the reference-chunk wait and for teardown.
    pub fn recv_result(&self, timeout: Duration) -> Option<JobOut> {
        self.res_rx.recv_timeout(timeout).ok()
    }

    /// Jobs queued or currently running.
    pub fn pending(&self) -> usize {
        self.queued.load(Ordering::Relaxed) + self.inflight.load(Ordering::Relaxed)
    }
}
