use proptest::prelude::*;
use relief_geom::Vec3;
use relief_world::{ChunkCoord, TerrainFrame};

fn frame(cell: Vec3, chunk_size: i32) -> TerrainFrame {
    TerrainFrame::new(Vec3::ZERO, cell, chunk_size)
}

#[test]
fn negative_cells_floor_into_negative_chunks() {
    let f = frame(Vec3::ONE, 16);
    assert_eq!(f.terrain_to_chunk((-1, -1)), ChunkCoord::new(-1, -1));
    assert_eq!(f.terrain_to_chunk((0, 0)), ChunkCoord::new(0, 0));
    assert_eq!(f.terrain_to_chunk((15, 16)), ChunkCoord::new(0, 1));
    assert_eq!(f.terrain_to_chunk((-16, -17)), ChunkCoord::new(-1, -2));
}

#[test]
fn negative_world_positions_floor() {
    let f = frame(Vec3::ONE, 16);
    assert_eq!(f.real_to_terrain(Vec3::new(-0.5, 0.0, -1.5)), (-1, 0, -2));
    assert_eq!(f.real_to_terrain(Vec3::new(0.5, 2.5, 1.0)), (0, 2, 1));
    assert_eq!(f.real_to_chunk(Vec3::new(-0.1, 0.0, 0.1)), ChunkCoord::new(-1, 0));
}

#[test]
fn chunk_to_real_is_cells_offset() {
    let f = frame(Vec3::new(2.0, 1.0, 0.5), 8);
    let c = ChunkCoord::new(-2, 3);
    assert_eq!(f.cells_offset(c), (-16, 24));
    let p = f.chunk_to_real(c);
    assert_eq!((p.x, p.z), (-32.0, 12.0));
}

#[test]
fn planar_distance_zero_over_footprint() {
    let f = frame(Vec3::ONE, 16);
    let c = ChunkCoord::new(0, 0);
    assert_eq!(f.chunk_planar_distance(c, Vec3::new(8.0, 50.0, 8.0)), 0.0);
    assert_eq!(f.chunk_planar_distance(c, Vec3::new(24.0, 0.0, 8.0)), 8.0);
    let corner = f.chunk_planar_distance(ChunkCoord::new(1, 1), Vec3::new(8.0, 0.0, 8.0));
    assert!((corner - 128.0f32.sqrt()).abs() < 1e-4);
}

fn arb_cell() -> impl Strategy<Value = f32> {
    0.25f32..=4.0
}

proptest! {
    // Round trip lands within one cell of the input on each axis.
    #[test]
    fn round_trip_within_one_cell(
        px in -1e4f32..=1e4, py in -1e2f32..=1e2, pz in -1e4f32..=1e4,
        cx in arb_cell(), cy in arb_cell(), cz in arb_cell(),
    ) {
        let f = frame(Vec3::new(cx, cy, cz), 16);
        let p = Vec3::new(px, py, pz);
        let (tx, _, tz) = f.real_to_terrain(p);
        let back = f.terrain_to_real((tx, tz), 0.0);
        prop_assert!((back.x - p.x).abs() <= cx + 1e-2);
        prop_assert!((back.z - p.z).abs() <= cz + 1e-2);
    }

    // terrain_to_chunk agrees with flooring the scaled coordinate.
    #[test]
    fn chunk_mapping_floors(tx in -100_000i32..=100_000, tz in -100_000i32..=100_000) {
        let f = frame(Vec3::ONE, 16);
        let c = f.terrain_to_chunk((tx, tz));
        prop_assert_eq!(c.cx, (tx as f64 / 16.0).floor() as i32);
        prop_assert_eq!(c.cz, (tz as f64 / 16.0).floor() as i32);
    }
}
