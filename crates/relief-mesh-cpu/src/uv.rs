use relief_chunk::Cell;
use relief_geom::Vec2;

/// Bottom-left / top-right corners of a cell's texture rectangle.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct UvRect {
    pub min: Vec2,
    pub max: Vec2,
}

impl UvRect {
    pub const FULL: UvRect = UvRect {
        min: Vec2 { x: 0.0, y: 0.0 },
        max: Vec2 { x: 1.0, y: 1.0 },
    };
}

/// Per-cell texture lookup. Opaque to the mesh builders; atlas layout is the
/// caller's concern.
pub trait UvMapper: Send + Sync {
    fn uv_for(&self, cell: &Cell) -> UvRect;
}

/// Maps every cell to the whole texture.
#[derive(Clone, Copy, Debug, Default)]
pub struct UniformUv;

impl UvMapper for UniformUv {
    fn uv_for(&self, _cell: &Cell) -> UvRect {
        UvRect::FULL
    }
}
