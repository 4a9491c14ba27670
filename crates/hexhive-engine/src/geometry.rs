//! Hex-grid geometry: positions and adjacency arithmetic.
//!
//! The grid is unbounded and addressed with integer axial coordinates.
//! Every cell has six neighbours at the offsets in [`DIRECTIONS`]:
//!
//! ```text
//!            (-1,-1)  (0,-1)
//!       (-1, 0)   (x,y)   (1, 0)
//!             (0, 1)  (1, 1)
//! ```
//!
//! Nothing here knows about pieces, only about cells.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The six neighbour offsets, in rotational order.
///
/// Two consecutive entries (wrapping around) are themselves adjacent.
/// That ordering is what [`Position::common_neighbors`] relies on: when a
/// piece slides from `p` to `p + DIRECTIONS[i]`, the two cells it has to
/// squeeze between are `p + DIRECTIONS[i - 1]` and `p + DIRECTIONS[i + 1]`.
pub const DIRECTIONS: [(i32, i32); 6] =
    [(1, 0), (1, 1), (0, 1), (-1, 0), (-1, -1), (0, -1)];

/// A cell on the hex grid.
///
/// A plain value type: `Copy`, structurally comparable and hashable, so it
/// can be used directly as a `HashMap`/`BTreeMap` key. `Ord` gives a
/// stable iteration order for position sets.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default,
    Serialize, Deserialize,
)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// The starting cell of every game.
    pub const ORIGIN: Position = Position { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns the neighbour in direction `dir` (taken modulo 6).
    pub fn neighbor(self, dir: usize) -> Position {
        let (dx, dy) = DIRECTIONS[dir % 6];
        Position::new(self.x + dx, self.y + dy)
    }

    /// Returns all six neighbours in rotational order.
    pub fn neighbors(self) -> [Position; 6] {
        std::array::from_fn(|dir| self.neighbor(dir))
    }

    /// Returns `true` if `other` is one of the six cells around `self`.
    pub fn is_adjacent(self, other: Position) -> bool {
        direction_between(self, other).is_some()
    }

    /// Returns the two cells adjacent to both `self` and `other`.
    ///
    /// `None` if the two positions are not neighbours.
    pub fn common_neighbors(
        self,
        other: Position,
    ) -> Option<(Position, Position)> {
        let dir = direction_between(self, other)?;
        Some((self.neighbor(dir + 5), self.neighbor(dir + 1)))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Index into [`DIRECTIONS`] that leads from `from` to `to`, if adjacent.
pub fn direction_between(from: Position, to: Position) -> Option<usize> {
    let delta = (to.x - from.x, to.y - from.y);
    DIRECTIONS.iter().position(|d| *d == delta)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbors_are_all_adjacent_and_distinct() {
        let p = Position::new(3, -2);
        let nbs = p.neighbors();
        for (i, a) in nbs.iter().enumerate() {
            assert!(p.is_adjacent(*a));
            for b in &nbs[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(!p.is_adjacent(p));
    }

    #[test]
    fn test_is_adjacent_rejects_antidiagonal() {
        // (1,-1) and (-1,1) are NOT neighbours in this coordinate system.
        assert!(!Position::ORIGIN.is_adjacent(Position::new(1, -1)));
        assert!(!Position::ORIGIN.is_adjacent(Position::new(-1, 1)));
        assert!(!Position::ORIGIN.is_adjacent(Position::new(2, 0)));
    }

    #[test]
    fn test_consecutive_directions_are_adjacent() {
        for dir in 0..6 {
            let a = Position::ORIGIN.neighbor(dir);
            let b = Position::ORIGIN.neighbor(dir + 1);
            assert!(a.is_adjacent(b), "directions {dir} and {}", dir + 1);
        }
    }

    #[test]
    fn test_common_neighbors_touch_both_cells() {
        let a = Position::new(0, 0);
        for b in a.neighbors() {
            let (c1, c2) = a.common_neighbors(b).expect("adjacent");
            assert_ne!(c1, c2);
            for c in [c1, c2] {
                assert!(c.is_adjacent(a) && c.is_adjacent(b));
            }
        }
    }

    #[test]
    fn test_common_neighbors_of_distant_cells_is_none() {
        assert_eq!(
            Position::ORIGIN.common_neighbors(Position::new(3, 3)),
            None
        );
    }

    #[test]
    fn test_position_serializes_as_xy_object() {
        let json = serde_json::to_value(Position::new(2, -1)).unwrap();
        assert_eq!(json, serde_json::json!({ "x": 2, "y": -1 }));
    }
}
