use smallvec::SmallVec;

/// Single coordinate axis used for board width, height, and positions.
pub type Coord = u8;

/// Count type used for filled-cell counts and total-cell counts.
pub type CellCount = u16;

/// Two-dimensional coordinates `(x, y)`.
pub type Coord2 = (Coord, Coord);

/// Run lengths for a single row or column, in reading order.
pub type LineClues = SmallVec<[Coord; 8]>;

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

/// Row-major cell index for `coords` on a board `width` cells wide.
pub const fn to_flat((x, y): Coord2, width: Coord) -> usize {
    y as usize * width as usize + x as usize
}

/// Inverse of [`to_flat`].
pub const fn from_flat(index: usize, width: Coord) -> Coord2 {
    ((index % width as usize) as Coord, (index / width as usize) as Coord)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_index_round_trips_row_major() {
        let width = 7;
        assert_eq!(to_flat((0, 0), width), 0);
        assert_eq!(to_flat((6, 0), width), 6);
        assert_eq!(to_flat((0, 1), width), 7);
        assert_eq!(to_flat((3, 2), width), 17);
        for index in 0..7 * 5 {
            assert_eq!(to_flat(from_flat(index, width), width), index);
        }
    }

    #[test]
    fn mult_saturates_instead_of_overflowing() {
        assert_eq!(mult(2, 3), 6);
        assert_eq!(mult(Coord::MAX, Coord::MAX), 65025);
    }
}
