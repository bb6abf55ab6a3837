//! Terrain coordinate frame and height-field generation.
#![forbid(unsafe_code)]

mod coords;
mod heightfield;
mod params;

pub use coords::{ChunkCoord, TerrainFrame};
pub use heightfield::{HeightField, HeightFieldGen};
pub use params::NoiseParams;
