use relief_geom::Vec3;
use relief_world::{HeightField, TerrainFrame};

use crate::mesh_build::MeshBuild;

/// Computes seam-consistent per-vertex normals for a grid mesh built by the
/// smooth builder, overwriting `mesh.norm`.
///
/// Interior vertices sum the face normals of their incident triangles. For
/// vertices on the chunk's outer ring the two triangles that would exist in
/// the neighbouring chunk are synthesized from the padded height field's
/// halo samples, so the result matches a fully connected global mesh while
/// never reading another chunk's live data.
pub fn stitch_grid_normals(
    frame: &TerrainFrame,
    offset: (i32, i32),
    field: &HeightField,
    mesh: &mut MeshBuild,
) {
    let size = field.chunk_size();
    let dim = size + 1;
    debug_assert_eq!(mesh.vertex_count(), dim * dim);

    let vert = |i: usize| -> Vec3 {
        Vec3::new(mesh.pos[i * 3], mesh.pos[i * 3 + 1], mesh.pos[i * 3 + 2])
    };
    let mut normals = vec![Vec3::ZERO; dim * dim];

    let add_triangle = |normals: &mut [Vec3], first_idx: usize| {
        let ia = mesh.idx[first_idx] as usize;
        let ib = mesh.idx[first_idx + 1] as usize;
        let ic = mesh.idx[first_idx + 2] as usize;
        let n = (vert(ib) - vert(ia)).cross(vert(ic) - vert(ia));
        normals[ia] += n;
        normals[ib] += n;
        normals[ic] += n;
    };

    for i in 0..dim * dim {
        let x = i / dim;
        let z = i % dim;

        if x < size && z < size {
            let tri_idx = (x * size + z) * 6;
            add_triangle(&mut normals, tri_idx);
            add_triangle(&mut normals, tri_idx + 3);
        }
        if x == 0 || z == 0 || x >= size || z >= size {
            let t = (offset.0 + x as i32, offset.1 + z as i32);
            let a = vert(i);

            if x == 0 || z == 0 {
                let b = frame.terrain_to_real((t.0 - 1, t.1), field.sample(x, z + 1));
                let c = frame.terrain_to_real((t.0 - 1, t.1 - 1), field.sample(x, z));
                let n = -((b - a).cross(c - a));
                normals[i] += n;
                if x != 0 {
                    normals[i - dim] += n;
                }

                let b = c;
                let c = frame.terrain_to_real((t.0, t.1 - 1), field.sample(x + 1, z));
                let n = -((b - a).cross(c - a));
                normals[i] += n;
                if z != 0 {
                    normals[i - 1] += n;
                }
            }
            if x == size || z == size {
                let b = frame.terrain_to_real((t.0 + 1, t.1), field.sample(x + 2, z + 1));
                let c = frame.terrain_to_real((t.0 + 1, t.1 + 1), field.sample(x + 2, z + 2));
                let n = -((b - a).cross(c - a));
                normals[i] += n;
                if x < size {
                    normals[i + dim] += n;
                }

                let b = c;
                let c = frame.terrain_to_real((t.0, t.1 + 1), field.sample(x + 1, z + 2));
                let n = -((b - a).cross(c - a));
                normals[i] += n;
                if z < size {
                    normals[i + 1] += n;
                }
            }
        }
    }

    mesh.norm.clear();
    for n in &normals {
        let n = n.normalized();
        mesh.norm.extend_from_slice(&[n.x, n.y, n.z]);
    }
}
