use relief_world::{ChunkCoord, HeightFieldGen, NoiseParams};

fn generator(seed: i32) -> HeightFieldGen {
    HeightFieldGen::new(NoiseParams {
        seed,
        ..NoiseParams::default()
    })
}

#[test]
fn generation_is_bit_identical() {
    let g = generator(1234);
    let a = g.generate(ChunkCoord::new(3, -7), 16);
    let b = g.generate(ChunkCoord::new(3, -7), 16);
    assert_eq!(a, b);
}

#[test]
fn different_seeds_differ() {
    let a = generator(1).generate(ChunkCoord::new(0, 0), 16);
    let b = generator(2).generate(ChunkCoord::new(0, 0), 16);
    assert_ne!(a, b);
}

#[test]
fn padded_grid_has_expected_dim() {
    let field = generator(0).generate(ChunkCoord::new(0, 0), 8);
    assert_eq!(field.dim(), 11);
    assert_eq!(field.chunk_size(), 8);
}

#[test]
fn samples_match_pure_height_function() {
    let g = generator(77);
    let chunk = ChunkCoord::new(-2, 5);
    let size = 8usize;
    let field = g.generate(chunk, size);
    let base_x = (chunk.cx - 1) * size as i32;
    let base_z = (chunk.cz - 1) * size as i32;
    for px in 0..field.dim() {
        for pz in 0..field.dim() {
            assert_eq!(
                field.sample(px, pz),
                g.height_at(base_x + px as i32, base_z + pz as i32)
            );
        }
    }
}

// The halo columns overlap the neighbouring chunk's own samples, which is
// what makes boundary normals agree without reading the neighbour.
#[test]
fn halo_overlaps_neighbor_chunk() {
    let g = generator(9);
    let size = 8usize;
    let a = g.generate(ChunkCoord::new(0, 0), size);
    let b = g.generate(ChunkCoord::new(1, 0), size);
    for k in 0..3 {
        for pz in 0..a.dim() {
            assert_eq!(a.sample(size + k, pz), b.sample(k, pz));
        }
    }
}

#[test]
fn heights_stay_in_configured_range() {
    let params = NoiseParams {
        seed: 5,
        min_height: -4.0,
        max_height: 12.0,
        ..NoiseParams::default()
    };
    let field = HeightFieldGen::new(params).generate(ChunkCoord::new(2, 2), 16);
    for px in 0..field.dim() {
        for pz in 0..field.dim() {
            let h = field.sample(px, pz);
            assert!((-4.0 - 1e-3..=12.0 + 1e-3).contains(&h), "height {h} out of range");
        }
    }
}
