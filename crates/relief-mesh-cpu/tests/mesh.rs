use relief_chunk::CellGrid;
use relief_geom::Vec3;
use relief_mesh_cpu::{ChunkMeshCPU, MeshStyle, UniformUv, build_chunk_mesh};
use relief_world::{ChunkCoord, HeightField, HeightFieldGen, NoiseParams, TerrainFrame};

fn frame(chunk_size: i32) -> TerrainFrame {
    TerrainFrame::new(Vec3::ZERO, Vec3::ONE, chunk_size)
}

fn field_from_fn(size: usize, f: impl Fn(usize, usize) -> f32) -> HeightField {
    let dim = size + 3;
    let mut data = Vec::with_capacity(dim * dim);
    for px in 0..dim {
        for pz in 0..dim {
            data.push(f(px, pz));
        }
    }
    HeightField::from_samples(size, data)
}

fn normal_at(mesh: &ChunkMeshCPU, vertex: usize) -> Vec3 {
    Vec3::new(
        mesh.norm[vertex * 3],
        mesh.norm[vertex * 3 + 1],
        mesh.norm[vertex * 3 + 2],
    )
}

fn approx(a: Vec3, b: Vec3, eps: f32) -> bool {
    (a.x - b.x).abs() <= eps && (a.y - b.y).abs() <= eps && (a.z - b.z).abs() <= eps
}

#[test]
fn smooth_grid_has_shared_vertices_and_flat_normals() {
    let size = 8usize;
    let field = field_from_fn(size, |_, _| 2.0);
    let cells = CellGrid::from_height_field((0, 0), &field, false);
    let mesh = build_chunk_mesh(&frame(8), &cells, &field, MeshStyle::Smooth, &UniformUv);

    assert_eq!(mesh.vertex_count(), 81);
    assert_eq!(mesh.triangle_count(), 128);
    assert_eq!(mesh.uv.len(), 81 * 2);
    assert_eq!(mesh.norm.len(), 81 * 3);
    for v in 0..mesh.vertex_count() {
        assert!(approx(normal_at(&mesh, v), Vec3::UP, 1e-6));
    }
}

#[test]
fn uniform_blocky_chunk_is_one_quad_without_skirts() {
    let size = 8usize;
    let field = field_from_fn(size, |_, _| 3.2);
    let cells = CellGrid::from_height_field((0, 0), &field, true);
    let mesh = build_chunk_mesh(
        &frame(8),
        &cells,
        &field,
        MeshStyle::Blocky {
            split_and_merge: true,
        },
        &UniformUv,
    );

    assert_eq!(mesh.vertex_count(), 4);
    assert_eq!(mesh.triangle_count(), 2);
    for v in 0..4 {
        assert!(approx(normal_at(&mesh, v), Vec3::UP, 1e-6));
    }
    // Rounded height, full chunk extent.
    assert_eq!(mesh.pos[1], 3.0);
}

#[test]
fn blocky_step_emits_sideways_skirts() {
    let size = 8usize;
    // Cells x < 4 at height 0, x >= 4 at height 1 (cell x = padded x - 1).
    let field = field_from_fn(size, |px, _| if (px as i32 - 1) < 4 { 0.0 } else { 1.0 });
    let cells = CellGrid::from_height_field((0, 0), &field, true);
    let mesh = build_chunk_mesh(
        &frame(8),
        &cells,
        &field,
        MeshStyle::Blocky {
            split_and_merge: true,
        },
        &UniformUv,
    );

    // Four uniform 4x4 sectors plus eight one-cell skirts along the step.
    assert_eq!(mesh.vertex_count(), 48);
    assert_eq!(mesh.triangle_count(), 24);

    // Every skirt quad lies in a constant-x plane and faces the lower side.
    let mut skirts = 0;
    for q in 0..mesh.vertex_count() / 4 {
        let n = normal_at(&mesh, q * 4);
        if n.y.abs() < 1e-6 {
            skirts += 1;
            assert!(approx(n, Vec3::new(-1.0, 0.0, 0.0), 1e-6));
        }
    }
    assert_eq!(skirts, 8);
}

#[test]
fn split_and_merge_disabled_meshes_every_cell() {
    let size = 4usize;
    let field = field_from_fn(size, |_, _| 1.0);
    let cells = CellGrid::from_height_field((0, 0), &field, true);
    let mesh = build_chunk_mesh(
        &frame(4),
        &cells,
        &field,
        MeshStyle::Blocky {
            split_and_merge: false,
        },
        &UniformUv,
    );
    // 16 per-cell quads, no skirts on a uniform chunk.
    assert_eq!(mesh.vertex_count(), 64);
    assert_eq!(mesh.triangle_count(), 32);
}

// Two chunks generated independently agree on boundary normals: chunk A's
// halo-synthesized triangles are chunk B's real ones and vice versa.
#[test]
fn seam_normals_match_across_chunks() {
    let size = 8usize;
    let f = frame(8);
    let generator = HeightFieldGen::new(NoiseParams {
        seed: 4242,
        ..NoiseParams::default()
    });

    let field_a = generator.generate(ChunkCoord::new(0, 0), size);
    let cells_a = CellGrid::from_height_field((0, 0), &field_a, false);
    let mesh_a = build_chunk_mesh(&f, &cells_a, &field_a, MeshStyle::Smooth, &UniformUv);

    let field_b = generator.generate(ChunkCoord::new(1, 0), size);
    let cells_b = CellGrid::from_height_field((8, 0), &field_b, false);
    let mesh_b = build_chunk_mesh(&f, &cells_b, &field_b, MeshStyle::Smooth, &UniformUv);

    let dim = size + 1;
    for z in 0..dim {
        let a = normal_at(&mesh_a, size * dim + z);
        let b = normal_at(&mesh_b, z);
        assert!(approx(a, b, 1e-4), "seam normal mismatch at z={z}: {a:?} vs {b:?}");
    }
}
