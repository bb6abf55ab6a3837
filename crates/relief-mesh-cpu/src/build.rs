use log::warn;
use relief_chunk::{Cell, CellGrid};
use relief_geom::{Vec2, Vec3};
use relief_world::{HeightField, TerrainFrame};

use crate::constants::MAX_VERTICES_PER_MESH;
use crate::mesh_build::{ChunkMeshCPU, MeshBuild};
use crate::normals::stitch_grid_normals;
use crate::quadtree::{QuadSector, quadtree_sectors, single_cell_sectors};
use crate::uv::{UvMapper, UvRect};

/// Builder strategy, selected by terrain configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MeshStyle {
    /// Continuous height-field surface: one shared vertex per grid corner,
    /// two triangles per cell, stitched per-vertex normals.
    Smooth,
    /// Flat quad per sector with vertical skirts at height steps. With
    /// `split_and_merge` the quadtree merges uniform regions; otherwise
    /// every cell is its own sector.
    Blocky { split_and_merge: bool },
}

/// Turns a chunk's cells into finished geometry.
pub fn build_chunk_mesh(
    frame: &TerrainFrame,
    cells: &CellGrid,
    field: &HeightField,
    style: MeshStyle,
    uv: &dyn UvMapper,
) -> ChunkMeshCPU {
    let mut mesh = MeshBuild::default();
    match style {
        MeshStyle::Smooth => {
            build_grid(frame, cells, uv, &mut mesh);
            stitch_grid_normals(frame, cells.get(0, 0).terrain_pos, field, &mut mesh);
        }
        MeshStyle::Blocky { split_and_merge } => {
            let size = cells.chunk_size();
            let sectors = if split_and_merge {
                quadtree_sectors(&|x, z| cells.get(x, z).height, size)
            } else {
                single_cell_sectors(size)
            };
            mesh.reserve_quads(sectors.len());
            for sector in &sectors {
                emit_sector(frame, cells, *sector, uv, &mut mesh);
            }
        }
    }
    if mesh.vertex_count() > MAX_VERTICES_PER_MESH {
        warn!(
            "chunk mesh at {:?} exceeds vertex budget: {} > {}",
            cells.get(0, 0).terrain_pos,
            mesh.vertex_count(),
            MAX_VERTICES_PER_MESH
        );
    }
    mesh.freeze()
}

/// Smooth builder: one vertex per grid corner in x-major order, so vertex
/// `(x, z)` sits at index `x * (size + 1) + z`; the normal stitcher relies
/// on this layout.
fn build_grid(frame: &TerrainFrame, cells: &CellGrid, uv: &dyn UvMapper, mesh: &mut MeshBuild) {
    let size = cells.chunk_size();
    let dim = size + 1;
    for x in 0..dim {
        for z in 0..dim {
            let cell = cells.get(x, z);
            let p = frame.terrain_to_real(cell.terrain_pos, cell.height);
            mesh.push_vertex(p, Vec3::ZERO, uv.uv_for(&cell).min);

            if x < size && z < size {
                let i = (x * dim + z) as u32;
                let dim = dim as u32;
                mesh.push_triangle(i, i + 1, i + dim + 1);
                mesh.push_triangle(i, i + dim + 1, i + dim);
            }
        }
    }
}

/// Blocky builder: one flat quad spanning the sector, then skirts along its
/// positive-x and positive-z edges wherever the neighbouring cell's height
/// differs. Negative edges are covered by the neighbouring sector's (or
/// chunk's) own positive-edge pass, so boundary cells never reach outside
/// the chunk's own cell grid.
fn emit_sector(
    frame: &TerrainFrame,
    cells: &CellGrid,
    sector: QuadSector,
    uv: &dyn UvMapper,
    mesh: &mut MeshBuild,
) {
    let ini = cells.get(sector.initial.0, sector.initial.1);
    let end = cells.get(sector.last.0, sector.last.1);
    let center = (frame.terrain_to_real(ini.terrain_pos, ini.height)
        + frame.terrain_to_real(end.terrain_pos, end.height))
        * 0.5;

    let hx = frame.cell_size.x * sector.width() as f32 * 0.5;
    let hz = frame.cell_size.z * sector.depth() as f32 * 0.5;
    let rect = uv.uv_for(&ini);

    mesh.add_quad(
        [
            center + Vec3::new(-hx, 0.0, -hz),
            center + Vec3::new(hx, 0.0, -hz),
            center + Vec3::new(hx, 0.0, hz),
            center + Vec3::new(-hx, 0.0, hz),
        ],
        quad_uvs(rect),
        false,
    );

    // Positive x edge.
    if sector.last.0 + 1 < cells.dim() {
        for step in 0..sector.depth() {
            let base = cells.get(sector.last.0, sector.last.1 - step);
            let edge = cells.get(sector.last.0 + 1, sector.last.1 - step);
            emit_skirt(frame, base, edge, true, rect, uv, mesh);
        }
    }

    // Positive z edge.
    if sector.last.1 + 1 < cells.dim() {
        for step in 0..sector.width() {
            let base = cells.get(sector.last.0 - step, sector.last.1);
            let edge = cells.get(sector.last.0 - step, sector.last.1 + 1);
            emit_skirt(frame, base, edge, false, rect, uv, mesh);
        }
    }
}

/// Vertical quad closing the gap between a sector cell and a neighbouring
/// cell at a different height. `to_right` selects the positive-x edge; the
/// positive-z edge reuses the same vertex recipe mirrored, with inverted
/// winding so the face still points outward.
fn emit_skirt(
    frame: &TerrainFrame,
    base: Cell,
    edge: Cell,
    to_right: bool,
    sector_rect: UvRect,
    uv: &dyn UvMapper,
    mesh: &mut MeshBuild,
) {
    let base_real = frame.terrain_to_real(base.terrain_pos, base.height);
    let diff = frame.terrain_to_real(edge.terrain_pos, edge.height).y - base_real.y;
    if diff == 0.0 {
        return;
    }

    let (xm, zm) = if to_right { (1.0, -1.0) } else { (-1.0, 1.0) };
    let half_x = frame.cell_size.x * 0.5;
    let half_z = frame.cell_size.z * 0.5;

    let rect = if diff < 0.0 {
        sector_rect
    } else {
        uv.uv_for(&edge)
    };
    mesh.add_quad(
        [
            base_real + Vec3::new(half_x * xm, diff, half_z * zm),
            base_real + Vec3::new(half_x, diff, half_z),
            base_real + Vec3::new(half_x, 0.0, half_z),
            base_real + Vec3::new(half_x * xm, 0.0, half_z * zm),
        ],
        quad_uvs(rect),
        !to_right,
    );
}

fn quad_uvs(rect: UvRect) -> [Vec2; 4] {
    [
        Vec2::new(rect.min.x, rect.max.y),
        Vec2::new(rect.max.x, rect.max.y),
        Vec2::new(rect.max.x, rect.min.y),
        Vec2::new(rect.min.x, rect.min.y),
    ]
}
