//! The one-hive check: are all occupied cells a single connected cluster?

use std::collections::{HashSet, VecDeque};

use crate::{Board, PieceIndex, Position};

/// Flood-fills from an arbitrary occupied cell and reports whether every
/// other occupied cell was reached. An empty set counts as connected.
pub fn is_connected(occupied: &HashSet<Position>) -> bool {
    let Some(&start) = occupied.iter().next() else {
        return true;
    };

    let mut seen = HashSet::with_capacity(occupied.len());
    seen.insert(start);
    let mut queue = VecDeque::from([start]);

    while let Some(cell) = queue.pop_front() {
        for nb in cell.neighbors() {
            if occupied.contains(&nb) && seen.insert(nb) {
                queue.push_back(nb);
            }
        }
    }

    seen.len() == occupied.len()
}

/// Returns `true` if lifting the piece at `index` leaves the rest of the
/// hive connected.
pub fn stays_connected_without(board: &Board, index: PieceIndex) -> bool {
    is_connected(&board.occupied_without(index))
}
