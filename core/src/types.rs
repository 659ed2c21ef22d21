use smallvec::SmallVec;

/// Single coordinate axis used for board width, height, and positions.
pub type Coord = u8;

/// Count type used for mine counts and total-cell counts.
pub type CellCount = u16;

/// Two-dimensional coordinates `(x, y)`.
pub type Coord2 = (Coord, Coord);

/// In-bounds Moore neighborhood of a cell, at most 8 entries.
pub type NeighborBuf = SmallVec<[Coord2; 8]>;

pub trait ToNdIndex {
    type Output;
    fn to_nd_index(self) -> Self::Output;
}

impl ToNdIndex for Coord2 {
    type Output = [usize; 2];

    fn to_nd_index(self) -> Self::Output {
        [self.0.into(), self.1.into()]
    }
}

pub const fn mult(a: Coord, b: Coord) -> CellCount {
    let a = a as CellCount;
    let b = b as CellCount;
    a.saturating_mul(b)
}

const DISPLACEMENTS: [(i8, i8); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Collects the in-bounds Moore neighbors of `center`. Grid edges simply have
/// fewer neighbors, there is no wraparound.
pub fn moore_neighbors(center: Coord2, bounds: Coord2) -> NeighborBuf {
    let mut neighbors = NeighborBuf::new();

    for &(dx, dy) in &DISPLACEMENTS {
        let Some(x) = center.0.checked_add_signed(dx) else {
            continue;
        };
        let Some(y) = center.1.checked_add_signed(dy) else {
            continue;
        };
        if x < bounds.0 && y < bounds.1 {
            neighbors.push((x, y));
        }
    }

    neighbors
}
