//! Legal destinations for placements and for each piece type.
//!
//! Everything in this module is a pure function of the board: no hidden
//! state, no mutation, same input → same output. Results are returned as
//! `BTreeSet`s so callers (and tests) see a stable order.
//!
//! # Sliding
//!
//! Queen, beetle, spider and ant all move by *sliding* one cell at a time.
//! A single slide from `from` to a neighbouring `to` is allowed when:
//!
//! - `to` is empty (beetles excepted, they may climb),
//! - `to` touches at least one occupied cell, so the piece stays in contact
//!   with the hive,
//! - the gate between the two cells is open: the two cells adjacent to both
//!   `from` and `to` are not *both* occupied.
//!
//! Slides are evaluated on the board with the moving piece lifted off, so
//! a spider or ant never leans on its own starting cell.

use std::collections::{BTreeSet, HashSet, VecDeque};

use crate::connectivity::stays_connected_without;
use crate::{Board, Piece, PieceColor, PieceType, Position};

/// Cells where `color` may place a new piece from hand.
///
/// - empty board → only the origin;
/// - exactly one piece on the board → its six neighbours, regardless of
///   color;
/// - otherwise → empty cells next to one of `color`'s exposed pieces and
///   next to none of the opponent's exposed pieces.
pub fn available_to_place(board: &Board, color: PieceColor) -> BTreeSet<Position> {
    match board.pieces() {
        [] => BTreeSet::from([Position::ORIGIN]),
        [only] => only.position.neighbors().into_iter().collect(),
        _ => board
            .tops()
            .filter(|top| top.color == color)
            .flat_map(|top| top.position.neighbors())
            .filter(|cell| !board.is_occupied(*cell))
            .filter(|cell| {
                cell.neighbors().into_iter().all(|nb| {
                    board.top(nb).is_none_or(|p| p.color == color)
                })
            })
            .collect(),
    }
}

/// Cells the placed `piece` may move to.
///
/// Empty when the piece is not on the board, is buried under a beetle,
/// or is holding the hive together (lifting it would split the rest).
/// Never contains the piece's own cell.
pub fn available_to_move(board: &Board, piece: &Piece) -> BTreeSet<Position> {
    let Some(index) = board.find_top(piece) else {
        return BTreeSet::new();
    };
    if !stays_connected_without(board, index) {
        return BTreeSet::new();
    }

    let origin = piece.position;
    let occupied = board.occupied_without(index);

    let mut destinations = match piece.piece_type {
        PieceType::QueenBee => slides(&occupied, origin).collect(),
        PieceType::Beetle => beetle_steps(&occupied, origin),
        PieceType::Grasshopper => grasshopper_jumps(&occupied, origin),
        PieceType::Spider => slide_exactly(&occupied, origin, 3),
        PieceType::SoldierAnt => slide_anywhere(&occupied, origin),
    };
    destinations.remove(&origin);
    destinations
}

/// Returns `true` if all six neighbours of `position` are occupied.
pub fn is_surrounded(board: &Board, position: Position) -> bool {
    position
        .neighbors()
        .into_iter()
        .all(|nb| board.is_occupied(nb))
}

/// Returns `true` if `color`'s queen is on the board and surrounded.
pub fn queen_surrounded(board: &Board, color: PieceColor) -> bool {
    board
        .queen_position(color)
        .is_some_and(|pos| is_surrounded(board, pos))
}

// ---------------------------------------------------------------------------
// Step rules
// ---------------------------------------------------------------------------

/// The gate between two adjacent cells is shut when both of their common
/// neighbours are occupied.
fn gate_open(occupied: &HashSet<Position>, from: Position, to: Position) -> bool {
    match from.common_neighbors(to) {
        Some((a, b)) => !(occupied.contains(&a) && occupied.contains(&b)),
        None => false,
    }
}

fn touches_hive(occupied: &HashSet<Position>, cell: Position) -> bool {
    cell.neighbors().iter().any(|nb| occupied.contains(nb))
}

/// Single-cell slides from `from` (see the module docs).
fn slides(
    occupied: &HashSet<Position>,
    from: Position,
) -> impl Iterator<Item = Position> + '_ {
    from.neighbors().into_iter().filter(move |&to| {
        !occupied.contains(&to)
            && touches_hive(occupied, to)
            && gate_open(occupied, from, to)
    })
}

/// Like a queen step, but the beetle may also climb onto an occupied cell.
fn beetle_steps(occupied: &HashSet<Position>, from: Position) -> BTreeSet<Position> {
    from.neighbors()
        .into_iter()
        .filter(|&to| {
            (occupied.contains(&to) || touches_hive(occupied, to))
                && gate_open(occupied, from, to)
        })
        .collect()
}

/// One landing cell per direction that starts with an occupied neighbour:
/// the first empty cell after the contiguous run of pieces.
fn grasshopper_jumps(
    occupied: &HashSet<Position>,
    from: Position,
) -> BTreeSet<Position> {
    let mut landings = BTreeSet::new();
    for dir in 0..6 {
        let mut cell = from.neighbor(dir);
        if !occupied.contains(&cell) {
            continue;
        }
        while occupied.contains(&cell) {
            cell = cell.neighbor(dir);
        }
        landings.insert(cell);
    }
    landings
}

/// Breadth-first slide of exactly `steps` steps. A cell reached at an
/// earlier step is never entered again, so only cells first reached at the
/// last step are returned.
fn slide_exactly(
    occupied: &HashSet<Position>,
    from: Position,
    steps: usize,
) -> BTreeSet<Position> {
    let mut visited = HashSet::from([from]);
    let mut frontier = vec![from];

    for _ in 0..steps {
        let mut next = Vec::new();
        for cell in frontier {
            for to in slides(occupied, cell) {
                if visited.insert(to) {
                    next.push(to);
                }
            }
        }
        frontier = next;
    }

    frontier.into_iter().collect()
}

/// Every cell reachable by any number of slides.
fn slide_anywhere(occupied: &HashSet<Position>, from: Position) -> BTreeSet<Position> {
    let mut visited = HashSet::from([from]);
    let mut queue = VecDeque::from([from]);
    let mut reached = BTreeSet::new();

    while let Some(cell) = queue.pop_front() {
        for to in slides(occupied, cell) {
            if visited.insert(to) {
                reached.insert(to);
                queue.push_back(to);
            }
        }
    }

    reached
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Rule tests for placement and per-piece movement.
    //!
    //! Boards are built with the `board` helper from `(type, color, x, y)`
    //! tuples, placed in order (so later entries on the same cell stack on
    //! top of earlier ones).

    use super::*;
    use crate::connectivity::is_connected;

    use PieceColor::{Black, White};
    use PieceType::*;

    fn pos(x: i32, y: i32) -> Position {
        Position::new(x, y)
    }

    fn board(pieces: &[(PieceType, PieceColor, i32, i32)]) -> Board {
        let mut b = Board::new();
        for &(t, c, x, y) in pieces {
            b.place(t, c, pos(x, y));
        }
        b
    }

    fn top_at(b: &Board, x: i32, y: i32) -> Piece {
        *b.top(pos(x, y)).expect("occupied")
    }

    fn set(list: &[(i32, i32)]) -> BTreeSet<Position> {
        list.iter().map(|&(x, y)| pos(x, y)).collect()
    }

    /// A ring of six pieces around the origin, origin itself empty.
    fn ring() -> Vec<(PieceType, PieceColor, i32, i32)> {
        Position::ORIGIN
            .neighbors()
            .iter()
            .map(|p| (SoldierAnt, White, p.x, p.y))
            .collect()
    }

    // =====================================================================
    // available_to_place
    // =====================================================================

    #[test]
    fn test_available_to_place_empty_board_is_origin() {
        assert_eq!(available_to_place(&Board::new(), White), set(&[(0, 0)]));
    }

    #[test]
    fn test_available_to_place_single_piece_is_its_neighbors() {
        let b = board(&[(QueenBee, White, 0, 0)]);
        let expected: BTreeSet<_> =
            Position::ORIGIN.neighbors().into_iter().collect();
        assert_eq!(available_to_place(&b, Black), expected);
    }

    #[test]
    fn test_available_to_place_touches_only_friendly_pieces() {
        let b = board(&[
            (QueenBee, White, 0, 0),
            (QueenBee, Black, 1, 0),
            (Spider, White, -1, 0),
            (Spider, Black, 2, 0),
        ]);

        for color in [White, Black] {
            let spots = available_to_place(&b, color);
            assert!(!spots.is_empty());
            for spot in spots {
                assert!(!b.is_occupied(spot), "{spot} is occupied");
                let around: Vec<_> = spot
                    .neighbors()
                    .into_iter()
                    .filter_map(|nb| b.top(nb))
                    .collect();
                assert!(around.iter().any(|p| p.color == color));
                assert!(around.iter().all(|p| p.color == color));
            }
        }
    }

    #[test]
    fn test_available_to_place_uses_top_of_stack_color() {
        // A black beetle on top of the white queen turns that cell black
        // for placement purposes.
        let b = board(&[
            (QueenBee, White, 0, 0),
            (QueenBee, Black, 1, 0),
            (Beetle, Black, 0, 0),
        ]);
        assert!(available_to_place(&b, White).is_empty());
        assert!(!available_to_place(&b, Black).is_empty());
    }

    // =====================================================================
    // available_to_move: one-hive rule
    // =====================================================================

    #[test]
    fn test_available_to_move_bridge_piece_cannot_move() {
        let b = board(&[
            (QueenBee, White, 0, 0),
            (SoldierAnt, Black, 1, 0),
            (QueenBee, Black, 2, 0),
        ]);
        assert!(available_to_move(&b, &top_at(&b, 1, 0)).is_empty());
    }

    #[test]
    fn test_available_to_move_empty_iff_removal_disconnects() {
        // Brute force: for every piece in a small irregular hive, compare the
        // engine's verdict with an independent connectivity check.
        let b = board(&[
            (QueenBee, White, 0, 0),
            (QueenBee, Black, 1, 0),
            (SoldierAnt, White, -1, -1),
            (SoldierAnt, Black, 2, 1),
            (Grasshopper, White, -1, 0),
            (Spider, Black, 3, 1),
            (Beetle, White, -2, -1),
        ]);
        for piece in b.pieces() {
            let rest: HashSet<Position> = b
                .pieces()
                .iter()
                .filter(|p| p.position != piece.position)
                .map(|p| p.position)
                .collect();
            if !is_connected(&rest) {
                assert!(
                    available_to_move(&b, piece).is_empty(),
                    "{piece} splits the hive but has moves"
                );
            }
        }
    }

    #[test]
    fn test_available_to_move_buried_piece_cannot_move() {
        let b = board(&[
            (QueenBee, White, 0, 0),
            (QueenBee, Black, 1, 0),
            (Beetle, Black, 0, 0),
        ]);
        let queen = b.pieces()[0];
        assert!(available_to_move(&b, &queen).is_empty());
    }

    #[test]
    fn test_available_to_move_unknown_piece_has_no_moves() {
        let b = board(&[(QueenBee, White, 0, 0), (QueenBee, Black, 1, 0)]);
        let ghost = Piece::on_board(SoldierAnt, White, pos(5, 5));
        assert!(available_to_move(&b, &ghost).is_empty());
    }

    // =====================================================================
    // Queen bee
    // =====================================================================

    #[test]
    fn test_queen_slides_around_single_neighbor() {
        // Queen at origin, one piece at (1,0): the queen can slide to the
        // two cells that touch both.
        let b = board(&[(QueenBee, White, 0, 0), (QueenBee, Black, 1, 0)]);
        let moves = available_to_move(&b, &top_at(&b, 0, 0));
        assert_eq!(moves, set(&[(1, 1), (0, -1)]));
    }

    #[test]
    fn test_queen_blocked_by_gate() {
        // Queen at origin inside a horseshoe with (0,-1) the only free
        // neighbour. Reaching it means squeezing between (-1,-1) and (1,0).
        let b = board(&[
            (QueenBee, White, 0, 0),
            (Spider, White, 1, 0),
            (Spider, White, 1, 1),
            (Beetle, White, 0, 1),
            (Beetle, White, -1, 0),
            (SoldierAnt, White, -1, -1),
        ]);
        let moves = available_to_move(&b, &top_at(&b, 0, 0));
        assert!(!moves.contains(&pos(0, -1)));
        assert!(moves.is_empty());
    }

    // =====================================================================
    // Beetle
    // =====================================================================

    #[test]
    fn test_beetle_may_climb_onto_neighbor() {
        let b = board(&[(QueenBee, White, 0, 0), (Beetle, Black, 1, 0)]);
        let moves = available_to_move(&b, &top_at(&b, 1, 0));
        assert!(moves.contains(&pos(0, 0)));
        assert!(moves.contains(&pos(1, 1)));
        assert!(moves.contains(&pos(0, -1)));
        assert!(!moves.contains(&pos(1, 0)));
    }

    #[test]
    fn test_beetle_on_stack_may_step_down() {
        let b = board(&[
            (QueenBee, White, 0, 0),
            (QueenBee, Black, 1, 0),
            (Beetle, Black, 0, 0),
        ]);
        let beetle = top_at(&b, 0, 0);
        assert_eq!(beetle.level, 1);
        let moves = available_to_move(&b, &beetle);
        assert!(moves.contains(&pos(1, 0)));
        assert!(moves.contains(&pos(-1, 0)));
    }

    // =====================================================================
    // Grasshopper
    // =====================================================================

    #[test]
    fn test_grasshopper_jumps_over_contiguous_run() {
        let b = board(&[
            (Grasshopper, White, 0, 0),
            (QueenBee, White, 1, 0),
            (QueenBee, Black, 2, 0),
            (Spider, Black, 3, 0),
        ]);
        let moves = available_to_move(&b, &top_at(&b, 0, 0));
        assert_eq!(moves, set(&[(4, 0)]));
    }

    #[test]
    fn test_grasshopper_never_lands_on_occupied_cell() {
        let b = board(&[
            (Grasshopper, White, 0, 0),
            (QueenBee, White, 1, 0),
            (QueenBee, Black, 0, 1),
            (Spider, Black, 1, 1),
            (Spider, White, -1, -1),
        ]);
        for dest in available_to_move(&b, &top_at(&b, 0, 0)) {
            assert!(!b.is_occupied(dest), "landed on {dest}");
        }
    }

    // =====================================================================
    // Spider
    // =====================================================================

    #[test]
    fn test_spider_moves_exactly_three_steps() {
        // Spider at (-1,0) next to a straight line (0,0),(1,0),(2,0).
        let b = board(&[
            (Spider, White, -1, 0),
            (QueenBee, White, 0, 0),
            (QueenBee, Black, 1, 0),
            (SoldierAnt, Black, 2, 0),
        ]);
        let spider = top_at(&b, -1, 0);
        let moves = available_to_move(&b, &spider);

        let occupied = b.occupied_without(0);
        let one_step: BTreeSet<_> = slides(&occupied, spider.position).collect();
        let two_steps: BTreeSet<_> = one_step
            .iter()
            .flat_map(|&c| slides(&occupied, c).collect::<Vec<_>>())
            .collect();

        assert!(!moves.is_empty());
        for dest in &moves {
            assert!(!one_step.contains(dest), "{dest} is one step away");
            assert!(!two_steps.contains(dest), "{dest} is two steps away");
            assert_ne!(*dest, spider.position);
        }
        assert_eq!(moves, set(&[(2, 1), (1, -1)]));
    }

    // =====================================================================
    // Soldier ant
    // =====================================================================

    #[test]
    fn test_ant_reaches_whole_perimeter() {
        let b = board(&[
            (SoldierAnt, White, -1, 0),
            (QueenBee, White, 0, 0),
            (QueenBee, Black, 1, 0),
        ]);
        let moves = available_to_move(&b, &top_at(&b, -1, 0));
        // The two-cell hive {(0,0),(1,0)} has 8 perimeter cells, one of
        // which is the ant's own.
        assert_eq!(moves.len(), 7);
        assert!(!moves.contains(&pos(-1, 0)));
    }

    #[test]
    fn test_ant_cannot_enter_enclosed_hole() {
        // The origin is surrounded on all sides: nothing may slide in.
        let mut pieces = ring();
        pieces.push((SoldierAnt, Black, 2, 0));
        let b = board(&pieces);
        let moves = available_to_move(&b, &top_at(&b, 2, 0));
        assert!(!moves.is_empty());
        assert!(!moves.contains(&pos(0, 0)));
    }

    #[test]
    fn test_ant_first_step_covers_queen_moves() {
        // Same cell, same board: the ant's one-step slides equal the
        // queen's moves, so the ant's full set is a superset.
        let base = [
            (QueenBee, Black, 1, 0),
            (Spider, Black, 1, 1),
            (Beetle, White, 0, 1),
        ];
        let mut with_queen: Vec<_> = base.to_vec();
        with_queen.insert(0, (QueenBee, White, 0, 0));
        let mut with_ant: Vec<_> = base.to_vec();
        with_ant.insert(0, (SoldierAnt, White, 0, 0));

        let qb = board(&with_queen);
        let ab = board(&with_ant);
        let queen_moves = available_to_move(&qb, &top_at(&qb, 0, 0));
        let ant_moves = available_to_move(&ab, &top_at(&ab, 0, 0));

        assert!(!queen_moves.is_empty());
        assert!(queen_moves.is_subset(&ant_moves));
    }

    // =====================================================================
    // Surround detection
    // =====================================================================

    #[test]
    fn test_queen_surrounded_by_ring() {
        let mut pieces = ring();
        pieces.push((QueenBee, Black, 0, 0));
        let b = board(&pieces);
        assert!(queen_surrounded(&b, Black));
        assert!(!queen_surrounded(&b, White));
    }
}
