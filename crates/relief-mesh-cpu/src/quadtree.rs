/// Axis-aligned rectangular run of equal-height cells, inclusive on both
/// corners. Transient: produced and consumed within one chunk's mesh build.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuadSector {
    pub initial: (usize, usize),
    pub last: (usize, usize),
}

impl QuadSector {
    #[inline]
    pub fn width(&self) -> usize {
        self.last.0 - self.initial.0 + 1
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.last.1 - self.initial.1 + 1
    }
}

/// Recursive split-and-merge over a `size × size` cell block with the
/// default predicate: exact equality of the (already rounded) heights.
pub fn quadtree_sectors<H>(height: &H, size: usize) -> Vec<QuadSector>
where
    H: Fn(usize, usize) -> f32,
{
    quadtree_sectors_by(height, &|a, b| a == b, size)
}

/// Recursive split-and-merge with a caller-supplied equality predicate.
///
/// A region becomes one sector when every cell in it compares equal to its
/// lower-left cell; otherwise it splits into four quadrants (floor for the
/// lower half, remainder for the upper) and recurses in the fixed order
/// bottom-left, bottom-right, top-left, top-right, so identical input
/// always yields an identical sector list. Recursion bottoms out at 1×1.
pub fn quadtree_sectors_by<H, E>(height: &H, equal: &E, size: usize) -> Vec<QuadSector>
where
    H: Fn(usize, usize) -> f32,
    E: Fn(f32, f32) -> bool,
{
    let mut sectors = Vec::new();
    if size > 0 {
        subdivide(height, equal, (0, 0), (size, size), &mut sectors);
    }
    sectors
}

/// The degenerate sectorization used when split-and-merge is disabled:
/// every cell is its own sector.
pub fn single_cell_sectors(size: usize) -> Vec<QuadSector> {
    let mut sectors = Vec::with_capacity(size * size);
    for x in 0..size {
        for z in 0..size {
            sectors.push(QuadSector {
                initial: (x, z),
                last: (x, z),
            });
        }
    }
    sectors
}

fn subdivide<H, E>(
    height: &H,
    equal: &E,
    origin: (usize, usize),
    extent: (usize, usize),
    out: &mut Vec<QuadSector>,
) where
    H: Fn(usize, usize) -> f32,
    E: Fn(f32, f32) -> bool,
{
    let (x0, z0) = origin;
    let (sx, sz) = extent;
    if sx == 0 || sz == 0 {
        return;
    }

    let first = height(x0, z0);
    let uniform = (x0..x0 + sx).all(|x| (z0..z0 + sz).all(|z| equal(first, height(x, z))));
    if uniform {
        out.push(QuadSector {
            initial: (x0, z0),
            last: (x0 + sx - 1, z0 + sz - 1),
        });
        return;
    }

    let hx = sx / 2;
    let hz = sz / 2;
    subdivide(height, equal, (x0, z0), (hx, hz), out);
    subdivide(height, equal, (x0 + hx, z0), (sx - hx, hz), out);
    subdivide(height, equal, (x0, z0 + hz), (hx, sz - hz), out);
    subdivide(height, equal, (x0 + hx, z0 + hz), (sx - hx, sz - hz), out);
}
