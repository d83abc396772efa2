use serde::{Deserialize, Serialize};

/// Square-grid cell position. `col` grows east, `row` grows south.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub col: i32,
    pub row: i32,
}

impl Coord {
    /// The eight neighbor offsets in a fixed order: N, NE, E, SE, S, SW, W, NW.
    pub const DIRECTIONS: [Coord; 8] = [
        Coord { col: 0, row: -1 },
        Coord { col: 1, row: -1 },
        Coord { col: 1, row: 0 },
        Coord { col: 1, row: 1 },
        Coord { col: 0, row: 1 },
        Coord { col: -1, row: 1 },
        Coord { col: -1, row: 0 },
        Coord { col: -1, row: -1 },
    ];

    #[inline]
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// Chebyshev distance: diagonal steps count the same as orthogonal ones.
    #[inline]
    pub fn chebyshev(self, other: Coord) -> u32 {
        let dc = (self.col - other.col).unsigned_abs();
        let dr = (self.row - other.row).unsigned_abs();
        dc.max(dr)
    }

    #[inline]
    pub fn manhattan(self, other: Coord) -> u32 {
        (self.col - other.col).unsigned_abs() + (self.row - other.row).unsigned_abs()
    }
}

impl std::ops::Add for Coord {
    type Output = Coord;

    fn add(self, other: Coord) -> Coord {
        Coord {
            col: self.col + other.col,
            row: self.row + other.row,
        }
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chebyshev_treats_diagonals_as_single_steps() {
        let a = Coord::new(0, 0);
        assert_eq!(a.chebyshev(Coord::new(3, 3)), 3);
        assert_eq!(a.chebyshev(Coord::new(-2, 5)), 5);
        assert_eq!(a.manhattan(Coord::new(-2, 5)), 7);
    }
}
