use std::sync::atomic::{AtomicI32, Ordering};

use crate::board::Board;
use crate::moves::Move;
use crate::score::Score;
#[cfg(test)]
use crate::util::PieceType;

const PLY_TABLE_SIZE: usize = 1024;
const MEMORY_CAP_MILLI: i32 = 512;
const HIGH_PRI_MILLI: i32 = 10_000_000;

// capture victim weights in milli-pawns, indexed by piece type
const CAP_TABLE: [i32; 8] = [0, 1000, 3000, 2000, 5000, 9000, 2000, 0];

/// Ply-indexed move-ordering scores (history heuristic).
///
/// `add` bumps the cut move's `from x to` cell; whenever a cell of a ply
/// reaches the cap, that ply's whole table is halved so scores never
/// saturate.  Cells are relaxed atomics: when the table is shared between
/// search workers a lost increment is harmless.
pub struct MoveHistory {
    table: Vec<AtomicI32>,
}

impl MoveHistory {
    pub fn new() -> MoveHistory {
        let mut table = Vec::with_capacity(PLY_TABLE_SIZE * 64 * 64);
        for _ in 0..PLY_TABLE_SIZE * 64 * 64 {
            table.push(AtomicI32::new(0));
        }
        return MoveHistory { table };
    }

    #[inline]
    fn ply_index(board: &Board) -> usize {
        // long games wrap around rather than run off the table
        return board.ply() as usize & (PLY_TABLE_SIZE - 1);
    }

    #[inline]
    fn cell_index(ply: usize, m: Move) -> usize {
        return (ply * 64 + m.origin.index()) * 64 + m.dest.index();
    }

    fn score(&self, ply: usize, m: Move) -> i32 {
        return self.table[MoveHistory::cell_index(ply, m)].load(Ordering::Relaxed);
    }

    pub fn clear(&self) {
        for cell in self.table.iter() {
            cell.store(0, Ordering::Relaxed);
        }
    }

    /// Credit a move that caused a cutoff at this board's ply.
    pub fn add(&self, board: &Board, m: Move) {
        let ply = MoveHistory::ply_index(board);
        let cell = &self.table[MoveHistory::cell_index(ply, m)];
        let value = cell.fetch_add(1, Ordering::Relaxed) + 1;
        if value >= MEMORY_CAP_MILLI {
            let base = ply * 64 * 64;
            for cell in &self.table[base..base + 64 * 64] {
                let v = cell.load(Ordering::Relaxed);
                cell.store(v / 2, Ordering::Relaxed);
            }
        }
    }

    /// Order `moves` best first: captured-piece value plus the scaled
    /// history score, with the transposition-table suggestion far in front.
    /// The sort is stable.
    pub fn sort_moves(&self, board: &Board, moves: &mut Vec<Move>, high_pri_move: Move) {
        let ply = MoveHistory::ply_index(board);
        moves.sort_by_cached_key(|&m| {
            let captured = board.at(m.dest).piece_type;
            let mut score =
                CAP_TABLE[captured.index()] + self.score(ply, m) * 213 / 128;
            if m == high_pri_move {
                score += HIGH_PRI_MILLI;
            }
            return std::cmp::Reverse(score);
        });
    }

    /// The ordering score a single move would get, exposed for tests.
    pub fn move_score(&self, board: &Board, m: Move) -> Score {
        let ply = MoveHistory::ply_index(board);
        let captured = board.at(m.dest).piece_type;
        return Score::of_milli_pawns(
            CAP_TABLE[captured.index()] + self.score(ply, m) * 213 / 128,
        );
    }
}

impl Default for MoveHistory {
    fn default() -> MoveHistory {
        MoveHistory::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::rules::Rules;

    fn all_moves(board: &Board) -> Vec<Move> {
        let scratch = Rules::make_scratch(board);
        let mut moves = Vec::new();
        Rules::list_moves(board, &scratch, &mut moves);
        return moves;
    }

    #[test]
    fn tt_move_sorts_first() {
        let history = MoveHistory::new();
        let board = Board::initial();
        let mut moves = all_moves(&board);
        let favorite = "b1c3".parse::<Move>().unwrap();
        history.sort_moves(&board, &mut moves, favorite);
        assert_eq!(moves[0], favorite);
    }

    #[test]
    fn captures_sort_before_quiet_moves() {
        let history = MoveHistory::new();
        let board =
            Board::from_fen("4k3/8/2p1p3/8/3N4/8/8/4K3 w - -").unwrap();
        let mut moves = all_moves(&board);
        history.sort_moves(&board, &mut moves, Move::invalid());
        // both pawn captures come before every quiet move
        let first_two: Vec<PieceType> = moves[..2]
            .iter()
            .map(|m| board.at(m.dest).piece_type)
            .collect();
        assert_eq!(first_two, vec![PieceType::Pawn, PieceType::Pawn]);
    }

    #[test]
    fn history_credit_promotes_a_quiet_move() {
        let history = MoveHistory::new();
        let board = Board::initial();
        let hero = "g2g3".parse::<Move>().unwrap();
        for _ in 0..100 {
            history.add(&board, hero);
        }
        let mut moves = all_moves(&board);
        history.sort_moves(&board, &mut moves, Move::invalid());
        assert_eq!(moves[0], hero);
        // credit applies per ply: a different ply's table is untouched
        let mut later = Board::initial();
        later.make("e2e4".parse::<Move>().unwrap());
        later.make("e7e5".parse::<Move>().unwrap());
        assert_eq!(history.move_score(&later, hero), Score::zero());
    }

    #[test]
    fn cells_are_halved_at_the_cap() {
        let history = MoveHistory::new();
        let board = Board::initial();
        let a = "g2g3".parse::<Move>().unwrap();
        let b = "b2b3".parse::<Move>().unwrap();
        for _ in 0..300 {
            history.add(&board, a);
        }
        for _ in 0..300 {
            history.add(&board, b);
        }
        // b reached 300 before a crossed the cap at 512... walk a over it
        for _ in 0..300 {
            history.add(&board, a);
        }
        // a crossed the cap and every cell of the ply was halved with it
        let score_a = history.move_score(&board, a).to_milli_pawns();
        let score_b = history.move_score(&board, b).to_milli_pawns();
        assert!(score_a < MEMORY_CAP_MILLI * 213 / 128);
        assert!(score_b < 300 * 213 / 128);
        assert!(score_a > 0);
        assert!(score_b > 0);
    }

    #[test]
    fn sort_is_stable_for_equal_scores() {
        let history = MoveHistory::new();
        let board = Board::initial();
        let mut moves = all_moves(&board);
        let reference = moves.clone();
        history.sort_moves(&board, &mut moves, Move::invalid());
        // with no history and no captures every score ties, so the
        // generated order is preserved
        assert_eq!(moves, reference);
    }
}
