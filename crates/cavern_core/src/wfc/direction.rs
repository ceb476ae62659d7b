//! The four neighbour directions of the output pattern grid.
//!
//! `Up` points towards increasing `y` (the next CSV row), `Right` towards
//! increasing `x`.

/// Direction offsets, indexed by `Direction::index()`.
/// Order: Up, Down, Left, Right
pub const DX: [i32; 4] = [0, 0, -1, 1];
pub const DY: [i32; 4] = [1, -1, 0, 0];

/// Opposite direction indices.
pub const OPPOSITE: [usize; 4] = [1, 0, 3, 2];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn opposite(self) -> Direction {
        Direction::ALL[OPPOSITE[self.index()]]
    }

    /// `(dx, dy)` step to the neighbour in this direction.
    pub fn offset(self) -> (i32, i32) {
        (DX[self.index()], DY[self.index()])
    }

    /// Neighbour of (x, y) inside a `width` x `height` grid, if any.
    pub fn neighbor(self, x: usize, y: usize, width: usize, height: usize) -> Option<(usize, usize)> {
        let (dx, dy) = self.offset();
        let nx = x as i64 + dx as i64;
        let ny = y as i64 + dy as i64;
        if nx < 0 || ny < 0 || nx >= width as i64 || ny >= height as i64 {
            None
        } else {
            Some((nx as usize, ny as usize))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposite_is_involution() {
        for dir in Direction::ALL {
            assert_eq!(dir.opposite().opposite(), dir);
            assert_ne!(dir.opposite(), dir);
            let (dx, dy) = dir.offset();
            let (ox, oy) = dir.opposite().offset();
            assert_eq!((dx + ox, dy + oy), (0, 0));
        }
    }

    #[test]
    fn test_neighbor_bounds() {
        assert_eq!(Direction::Up.neighbor(0, 0, 2, 2), Some((0, 1)));
        assert_eq!(Direction::Down.neighbor(0, 0, 2, 2), None);
        assert_eq!(Direction::Left.neighbor(0, 1, 2, 2), None);
        assert_eq!(Direction::Right.neighbor(0, 1, 2, 2), Some((1, 1)));
        assert_eq!(Direction::Right.neighbor(1, 1, 2, 2), None);
        assert_eq!(Direction::Up.neighbor(1, 1, 2, 2), None);
    }
}
