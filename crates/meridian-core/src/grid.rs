//! Square-grid geometry. All range logic in the engine goes through the
//! Chebyshev metric defined here.

use meridian_protocol::Coord;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Grid {
    width: u32,
    height: u32,
}

impl Grid {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub const fn width(&self) -> u32 {
        self.width
    }

    pub const fn height(&self) -> u32 {
        self.height
    }

    pub const fn len(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn distance(a: Coord, b: Coord) -> u32 {
        a.chebyshev(b)
    }

    #[inline]
    pub fn is_valid(&self, c: Coord) -> bool {
        c.col >= 0 && c.row >= 0 && (c.col as u32) < self.width && (c.row as u32) < self.height
    }

    pub fn index_of(&self, c: Coord) -> Option<usize> {
        if !self.is_valid(c) {
            return None;
        }
        Some((c.row as usize) * (self.width as usize) + (c.col as usize))
    }

    pub fn coord_at(&self, index: usize) -> Option<Coord> {
        if index >= self.len() {
            return None;
        }
        let w = self.width as usize;
        Some(Coord::new((index % w) as i32, (index / w) as i32))
    }

    /// In-bounds neighbors in N, NE, E, SE, S, SW, W, NW order.
    pub fn neighbors(&self, c: Coord) -> impl Iterator<Item = Coord> + '_ {
        Coord::DIRECTIONS
            .into_iter()
            .map(move |d| c + d)
            .filter(move |n| self.is_valid(*n))
    }

    /// In-bounds cells at exactly Chebyshev `radius` from `center`, row-major.
    pub fn ring(&self, center: Coord, radius: u32) -> Vec<Coord> {
        if radius == 0 {
            return if self.is_valid(center) {
                vec![center]
            } else {
                Vec::new()
            };
        }
        let r = radius as i32;
        let mut out = Vec::with_capacity(8 * radius as usize);
        for row in (center.row - r)..=(center.row + r) {
            let on_edge_row = row == center.row - r || row == center.row + r;
            if on_edge_row {
                for col in (center.col - r)..=(center.col + r) {
                    out.push(Coord::new(col, row));
                }
            } else {
                out.push(Coord::new(center.col - r, row));
                out.push(Coord::new(center.col + r, row));
            }
        }
        out.retain(|c| self.is_valid(*c));
        out
    }

    /// In-bounds cells within Chebyshev `radius` of `center` (inclusive), row-major.
    pub fn tiles_in_range(&self, center: Coord, radius: u32) -> Vec<Coord> {
        let r = radius as i32;
        let mut out = Vec::new();
        for row in (center.row - r)..=(center.row + r) {
            for col in (center.col - r)..=(center.col + r) {
                let c = Coord::new(col, row);
                if self.is_valid(c) {
                    out.push(c);
                }
            }
        }
        out
    }

    pub fn coords(&self) -> impl Iterator<Item = Coord> + '_ {
        (0..self.len()).filter_map(move |i| self.coord_at(i))
    }
}
