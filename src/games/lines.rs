//! Precomputed rays from every cell of a square board.
//!
//! Both games scan outwards from a freshly placed stone along the four axes.
//! Rather than redoing the bounds arithmetic on every move, each board builds
//! a `LineTable` once and shares it with its clones.

/// Axis steps as `(row, col)` deltas: horizontal, vertical, diagonal, anti-diagonal.
pub const AXES: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// Number of ray directions from a cell (both ways along each axis).
pub const DIRECTIONS: usize = AXES.len() * 2;

/// For every cell, the cell indices met when walking away from it in each
/// direction, nearest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineTable {
    size: usize,
    reach: usize,
    rays: Vec<Vec<usize>>,
}

impl LineTable {
    /// Build the rays for a `size`×`size` board, at most `reach` steps long.
    pub fn new(size: usize, reach: usize) -> Self {
        let mut rays = Vec::with_capacity(size * size * DIRECTIONS);
        for row in 0..size {
            for col in 0..size {
                for direction in 0..DIRECTIONS {
                    let (dr, dc) = Self::step(direction);
                    let mut ray = Vec::new();
                    let (mut r, mut c) = (row as isize, col as isize);
                    for _ in 0..reach {
                        r += dr;
                        c += dc;
                        if r < 0 || c < 0 || r >= size as isize || c >= size as isize {
                            break;
                        }
                        ray.push(r as usize * size + c as usize);
                    }
                    rays.push(ray);
                }
            }
        }
        Self { size, reach, rays }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn reach(&self) -> usize {
        self.reach
    }

    /// Cells along `direction` from `cell`. Direction `2a` walks axis `a`
    /// backwards, `2a + 1` forwards.
    #[inline]
    pub fn ray(&self, cell: usize, direction: usize) -> &[usize] {
        &self.rays[cell * DIRECTIONS + direction]
    }

    /// Both halves of axis `axis` through `cell`.
    #[inline]
    pub fn axis(&self, cell: usize, axis: usize) -> (&[usize], &[usize]) {
        (self.ray(cell, 2 * axis), self.ray(cell, 2 * axis + 1))
    }

    /// All eight rays from `cell`.
    pub fn rays(&self, cell: usize) -> impl Iterator<Item = &[usize]> + '_ {
        (0..DIRECTIONS).map(move |d| self.ray(cell, d))
    }

    #[inline]
    fn step(direction: usize) -> (isize, isize) {
        let (dr, dc) = AXES[direction / 2];
        if direction % 2 == 0 {
            (-dr, -dc)
        } else {
            (dr, dc)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corner_rays() {
        let table = LineTable::new(5, 4);
        // Top-left corner: only forward rays exist, except the anti-diagonal
        assert!(table.ray(0, 0).is_empty());
        assert_eq!(table.ray(0, 1), &[1, 2, 3, 4]);
        assert_eq!(table.ray(0, 3), &[5, 10, 15, 20]);
        assert_eq!(table.ray(0, 5), &[6, 12, 18, 24]);
        assert!(table.ray(0, 6).is_empty());
        assert!(table.ray(0, 7).is_empty());
    }

    #[test]
    fn test_reach_limits_length() {
        let table = LineTable::new(9, 2);
        assert_eq!((table.size(), table.reach()), (9, 2));
        let centre = 4 * 9 + 4;
        for ray in table.rays(centre) {
            assert_eq!(ray.len(), 2);
        }
        let (back, forward) = table.axis(centre, 0);
        assert_eq!(back, &[centre - 1, centre - 2]);
        assert_eq!(forward, &[centre + 1, centre + 2]);
    }

    #[test]
    fn test_anti_diagonal() {
        let table = LineTable::new(4, 10);
        // Cell (0, 3) runs down-left to (3, 0)
        let (back, forward) = table.axis(3, 3);
        assert!(back.is_empty());
        assert_eq!(forward, &[6, 9, 12]);
    }
}
