use std::fmt;
use std::time::Duration;

use crate::board::Board;
use crate::moves::Move;
use crate::rules::Rules;
use crate::score::Score;
use crate::util::Color;

/// What a search reports for one root line: the chosen move, its principal
/// variation and score, and how much work finding it took.
#[derive(Clone, Debug)]
pub struct SearchResultInfo {
    pub best_move: Move,
    pub eval: Score,
    pub pv: Vec<Move>,
    pub depth: i32,
    pub think_time: Duration,
    pub nodes: u64,
}

impl SearchResultInfo {
    pub fn create(
        best_move: Move,
        pv: Vec<Move>,
        eval: Score,
        nodes: u64,
        depth: i32,
        think_time: Duration,
    ) -> SearchResultInfo {
        SearchResultInfo {
            best_move,
            eval,
            pv,
            depth,
            think_time,
            nodes,
        }
    }

    /// Re-express the score from White's point of view when `color` (the
    /// side the search ran for) is Black.
    pub fn flip(&mut self, color: Color) {
        self.eval = self.eval.flip_for_color(color);
    }

    /// The PV rendered in short algebraic notation, walking a copy of the
    /// board through the line.
    pub fn make_pretty_moves(&self, board: &Board) -> Vec<String> {
        let mut copy = board.clone();
        let mut out = Vec::with_capacity(self.pv.len());
        for &m in &self.pv {
            out.push(Rules::pretty_move(&copy, m));
            copy.make(m);
        }
        return out;
    }
}

impl fmt::Display for SearchResultInfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let pv: Vec<String> = self.pv.iter().map(|m| m.to_string()).collect();
        write!(
            f,
            "[s:{} d:{} pv:{} nodes:{}]",
            self.eval,
            self.depth,
            pv.join(" "),
            self.nodes
        )
    }
}
