use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::board::Board;
use crate::book::OpeningBook;
use crate::error::EngineError;
use crate::eval::{EvalParams, Evaluator};
use crate::move_history::MoveHistory;
use crate::moves::Move;
use crate::rules::{EvalScratch, Rules};
use crate::score::Score;
use crate::tt::{HashSlot, TranspositionTable};

pub const MAX_SEARCH_PLY: i32 = 512;

// a lower-depth table hit may still cut when its bound clears beta by this
// much per missing ply
const TT_THRESHOLD_PER_DEPTH: Score = Score::of_milli_pawns(1100);

/// The cancellation signal.  It travels up the recursion as the error arm
/// of every search result and is caught only at the top of
/// `search_one_depth`; it never crosses the engine boundary.
#[derive(Debug)]
pub struct Interrupted;

/// A score and the line that realizes it.
#[derive(Clone, Debug)]
struct NodeResult {
    score: Score,
    pv: Vec<Move>,
}

impl NodeResult {
    fn min() -> NodeResult {
        NodeResult {
            score: Score::min(),
            pv: Vec::new(),
        }
    }

    fn of_score(score: Score) -> NodeResult {
        NodeResult {
            score,
            pv: Vec::new(),
        }
    }

    fn of_single_move(m: Move, score: Score) -> NodeResult {
        NodeResult {
            score,
            pv: vec![m],
        }
    }

    fn is_min(&self) -> bool {
        return self.score == Score::min() && self.pv.is_empty();
    }

    fn update_max(&mut self, m: Move, child: NodeResult) {
        if child.score > self.score {
            self.score = child.score;
            self.pv = Vec::with_capacity(child.pv.len() + 1);
            self.pv.push(m);
            self.pv.extend_from_slice(&child.pv);
        }
    }
}

// The root move loop is shared between the single-line and the top-K
// searches; this is the one seam where the two differ.
trait RootAccum {
    fn set_score(&mut self, score: Score);
    fn update_max(&mut self, m: Move, child: NodeResult);
    /// The score a new line has to beat; raises alpha at the root.
    fn min_score(&self) -> Score;
    fn max_score(&self) -> Score;
    fn is_empty(&self) -> bool;
}

struct SingleAccum {
    result: NodeResult,
}

impl SingleAccum {
    fn new() -> SingleAccum {
        SingleAccum {
            result: NodeResult::min(),
        }
    }
}

impl RootAccum for SingleAccum {
    fn set_score(&mut self, score: Score) {
        self.result = NodeResult::of_score(score);
    }

    fn update_max(&mut self, m: Move, child: NodeResult) {
        self.result.update_max(m, child);
    }

    fn min_score(&self) -> Score {
        return self.result.score;
    }

    fn max_score(&self) -> Score {
        return self.result.score;
    }

    fn is_empty(&self) -> bool {
        return self.result.is_min();
    }
}

/// Keeps the best `max_pvs` root lines, ordered best first; lines of equal
/// score stay in insertion order.
struct MpvAccum {
    entries: Vec<NodeResult>,
    max_pvs: usize,
}

impl MpvAccum {
    fn new(max_pvs: usize) -> MpvAccum {
        MpvAccum {
            entries: Vec::new(),
            max_pvs,
        }
    }
}

impl RootAccum for MpvAccum {
    fn set_score(&mut self, score: Score) {
        self.entries = vec![NodeResult::of_score(score)];
    }

    fn update_max(&mut self, m: Move, child: NodeResult) {
        let mut pv = Vec::with_capacity(child.pv.len() + 1);
        pv.push(m);
        pv.extend_from_slice(&child.pv);
        let entry = NodeResult {
            score: child.score,
            pv,
        };
        let at = self.entries.partition_point(|e| e.score >= entry.score);
        self.entries.insert(at, entry);
        self.entries.truncate(self.max_pvs);
    }

    fn min_score(&self) -> Score {
        if self.entries.len() < self.max_pvs {
            return Score::min();
        }
        return self.entries.last().map(|e| e.score).unwrap_or(Score::min());
    }

    fn max_score(&self) -> Score {
        return self.entries.first().map(|e| e.score).unwrap_or(Score::min());
    }

    fn is_empty(&self) -> bool {
        return self.entries.is_empty();
    }
}

/// The result of searching one depth from the root.
#[derive(Clone, Debug)]
pub struct SearchResultOneDepth {
    score: Score,
    mv: Option<Move>,
    pv: Vec<Move>,
    nodes: u64,
}

impl SearchResultOneDepth {
    pub fn score(&self) -> Score {
        self.score
    }

    pub fn best_move(&self) -> Option<Move> {
        self.mv
    }

    pub fn pv(&self) -> &[Move] {
        &self.pv
    }

    pub fn into_pv(self) -> Vec<Move> {
        self.pv
    }

    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Negate the score, re-expressing it for the parent of the searched
    /// position.
    pub fn flip(&mut self) {
        self.score = -self.score;
    }

    pub fn prepend_move(&mut self, m: Move) {
        self.pv.insert(0, m);
        self.mv = Some(self.pv[0]);
    }
}

#[derive(Clone, Debug)]
pub struct SearchResultOneDepthMpv {
    pub results: Vec<SearchResultOneDepth>,
}

impl SearchResultOneDepthMpv {
    pub fn nodes(&self) -> u64 {
        return self.results.iter().map(|r| r.nodes()).sum();
    }
}

/// Single-thread principal-variation alpha-beta search over a private copy
/// of the board.  Shared state (transposition table, move history, stop
/// flag) comes in by `Arc`.
pub struct SearchContext {
    board: Board,
    node_count: u64,
    tt: Arc<TranspositionTable>,
    move_history: Arc<MoveHistory>,
    book: Option<Arc<dyn OpeningBook>>,
    should_stop: Arc<AtomicBool>,
    interruptible: bool,
    eval_params: EvalParams,
    allow_partial: bool,
}

impl SearchContext {
    pub fn new(
        board: &Board,
        tt: Arc<TranspositionTable>,
        move_history: Arc<MoveHistory>,
        book: Option<Arc<dyn OpeningBook>>,
        allow_partial: bool,
        should_stop: Arc<AtomicBool>,
        eval_params: EvalParams,
    ) -> SearchContext {
        SearchContext {
            board: board.clone(),
            node_count: 0,
            tt,
            move_history,
            book,
            should_stop,
            interruptible: false,
            eval_params,
            allow_partial,
        }
    }

    pub fn node_count(&self) -> u64 {
        self.node_count
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    fn eval_board(&self, scratch: &EvalScratch) -> Score {
        return Evaluator::eval_for_current_player(&self.board, scratch, &self.eval_params);
    }

    /// Search the child position just entered: negate the window on the way
    /// down and step the mate distance so "mate in N" stays correct across
    /// levels.
    fn search_child(
        &mut self,
        scratch: &EvalScratch,
        depth: i32,
        ply: i32,
        input_alpha: Score,
        input_beta: Score,
    ) -> Result<NodeResult, Interrupted> {
        let mut ret = self.search_rec(
            scratch,
            depth - 1,
            ply + 1,
            input_beta.dec_mate_moves(1).neg(),
            input_alpha.dec_mate_moves(1).neg(),
        )?;
        ret.score = ret.score.neg().inc_mate_moves(1);
        return Ok(ret);
    }

    /// The try-shortened / re-search ladder for one child.
    ///
    /// On a wide-window node, any move after the first is first probed with
    /// a null window, two plies shallower when a table slot exists, the
    /// depth is at least 4 and the move is not a capture.  Each probe that
    /// beats the bound is re-searched wider, and finally at full depth.
    fn search_move(
        &mut self,
        scratch: &EvalScratch,
        depth: i32,
        ply: i32,
        new_alpha: Score,
        input_beta: Score,
        is_pv: bool,
        first: bool,
        depth_shortened: i32,
    ) -> Result<NodeResult, Interrupted> {
        let mut did_probe = false;
        let mut child = NodeResult::min();

        if !first && !is_pv && depth > 1 {
            child = self.search_child(
                scratch,
                depth - depth_shortened,
                ply,
                new_alpha,
                new_alpha.next(),
            )?;
            did_probe = true;
        }

        if !did_probe || child.score > new_alpha {
            child = self.search_child(scratch, depth - depth_shortened, ply, new_alpha, input_beta)?;
        }

        if depth_shortened > 0 && child.score > new_alpha {
            child = self.search_child(scratch, depth, ply, new_alpha, input_beta)?;
        }

        return Ok(child);
    }

    fn search_rec(
        &mut self,
        pre_move_scratch: &EvalScratch,
        depth: i32,
        ply: i32,
        input_alpha: Score,
        input_beta: Score,
    ) -> Result<NodeResult, Interrupted> {
        let is_pv = input_alpha.next() == input_beta;
        let is_quiescent = depth <= 0;

        self.node_count += 1;

        if self.should_stop.load(Ordering::Relaxed) && self.interruptible {
            return Err(Interrupted);
        }

        if ply > MAX_SEARCH_PLY || Rules::is_draw_without_stalemate(&self.board) {
            return Ok(NodeResult::of_score(Score::zero()));
        }

        // known opening positions answer from the book
        if ply <= 3 {
            if let Some(book) = &self.book {
                if let Some(entry) = book.lookup(&self.board.to_fen()) {
                    return Ok(NodeResult {
                        score: entry.eval.flip_for_color(self.board.turn),
                        pv: entry.pv,
                    });
                }
            }
        }

        // mate distance pruning; skipped on zero-width nodes so a clean pv
        // can still be recovered
        if !is_pv {
            let best_possible = Score::of_moves_to_mate(1);
            if best_possible <= input_alpha {
                return Ok(NodeResult::of_score(input_alpha));
            }
            let worst_possible = Score::of_moves_to_mate(0).neg();
            if worst_possible >= input_beta {
                return Ok(NodeResult::of_score(input_beta));
            }
        }

        // the cache is not consulted in quiescence
        let mut high_pri_move = Move::invalid();
        let mut slot: Option<HashSlot> = None;
        if !is_quiescent {
            slot = self.tt.find(&self.board);
            if let Some(s) = &slot {
                if !is_pv {
                    if s.depth >= depth {
                        if s.lower_bound >= input_beta {
                            return Ok(NodeResult::of_single_move(s.mv, s.lower_bound));
                        }
                        if s.upper_bound <= input_alpha {
                            return Ok(NodeResult::of_single_move(s.mv, s.upper_bound));
                        }
                    } else {
                        let gap = depth - s.depth;
                        if s.lower_bound - TT_THRESHOLD_PER_DEPTH * gap >= input_beta {
                            return Ok(NodeResult::of_single_move(s.mv, input_beta));
                        }
                    }
                }
                if s.mv.is_valid() {
                    high_pri_move = s.mv;
                }
            }
        }

        let mut result = NodeResult::min();
        let mut list: Vec<Move> = Vec::new();
        if is_quiescent {
            // stand pat, then captures only
            result = NodeResult::of_score(self.eval_board(pre_move_scratch));
            if result.score >= input_beta {
                return Ok(result);
            }
            Rules::list_takes(&self.board, &mut list);
        } else {
            Rules::list_moves(&self.board, pre_move_scratch, &mut list);
        }

        self.move_history
            .sort_moves(&self.board, &mut list, high_pri_move);

        let mut has_valid_move = false;
        let mut first = true;

        for i in 0..list.len() {
            let m = list[i];
            let mi = self.board.make(m);
            let scratch = Rules::make_scratch(&self.board);

            if !Rules::is_king_under_attack(&self.board, &scratch, !self.board.turn) {
                has_valid_move = true;
                let new_alpha = result.score.max(input_alpha);
                let depth_shortened =
                    if first || slot.is_none() || depth < 4 || mi.captured {
                        0
                    } else {
                        2
                    };
                match self.search_move(
                    &scratch,
                    depth,
                    ply,
                    new_alpha,
                    input_beta,
                    is_pv,
                    first,
                    depth_shortened,
                ) {
                    Ok(child) => result.update_max(m, child),
                    Err(Interrupted) => {
                        self.board.undo(m, &mi);
                        return Err(Interrupted);
                    }
                }
                first = false;
            }

            self.board.undo(m, &mi);

            if result.score >= input_beta {
                break;
            }
        }

        if !is_quiescent && !has_valid_move {
            if Rules::is_king_under_attack(&self.board, pre_move_scratch, self.board.turn) {
                result = NodeResult::of_score(Score::of_moves_to_mate(0).neg());
            } else {
                // stalemate
                result = NodeResult::of_score(Score::zero());
            }
        }

        self.store_result(&result, depth, input_alpha, input_beta, is_quiescent);

        return Ok(result);
    }

    fn store_result(
        &mut self,
        result: &NodeResult,
        depth: i32,
        input_alpha: Score,
        input_beta: Score,
        is_quiescent: bool,
    ) {
        let m = match result.pv.first() {
            Some(&m) => m,
            None => return,
        };
        let score = result.score;
        if !is_quiescent {
            if score <= input_alpha {
                // upper bound
                self.tt.insert(
                    &self.board,
                    depth,
                    Score::of_moves_to_mate(1).neg(),
                    score,
                    m,
                );
            } else if score >= input_beta {
                // lower bound
                self.tt
                    .insert(&self.board, depth, score, Score::of_moves_to_mate(1), m);
            } else {
                // exact
                self.tt.insert(&self.board, depth, score, score, m);
            }
        }
        if m.is_valid() {
            self.move_history.add(&self.board, m);
        }
    }

    fn search_root<A: RootAccum>(
        &mut self,
        depth: i32,
        input_alpha: Score,
        input_beta: Score,
        acc: &mut A,
    ) -> Result<(), Interrupted> {
        let is_pv = input_alpha.next() == input_beta;
        let pre_move_scratch = Rules::make_scratch(&self.board);

        self.node_count += 1;

        if self.should_stop.load(Ordering::Relaxed) && self.interruptible {
            return Err(Interrupted);
        }

        let mut high_pri_move = Move::invalid();
        let slot = self.tt.find(&self.board);
        if let Some(s) = &slot {
            if s.mv.is_valid() {
                high_pri_move = s.mv;
            }
        }

        let mut list: Vec<Move> = Vec::new();
        Rules::list_moves(&self.board, &pre_move_scratch, &mut list);
        self.move_history
            .sort_moves(&self.board, &mut list, high_pri_move);

        let mut has_valid_move = false;
        let mut first = true;

        for i in 0..list.len() {
            let m = list[i];
            let mi = self.board.make(m);
            let scratch = Rules::make_scratch(&self.board);

            if !Rules::is_king_under_attack(&self.board, &scratch, !self.board.turn) {
                has_valid_move = true;
                let new_alpha = acc.min_score().max(input_alpha);
                let depth_shortened =
                    if first || slot.is_none() || depth < 4 || mi.captured {
                        0
                    } else {
                        2
                    };
                match self.search_move(
                    &scratch,
                    depth,
                    0,
                    new_alpha,
                    input_beta,
                    is_pv,
                    first,
                    depth_shortened,
                ) {
                    Ok(child) => acc.update_max(m, child),
                    Err(Interrupted) => {
                        self.board.undo(m, &mi);
                        // keep the partial result when there is one worth
                        // keeping
                        if !acc.is_empty()
                            && slot.is_some()
                            && acc.max_score() > input_alpha
                            && self.allow_partial
                        {
                            return Ok(());
                        }
                        return Err(Interrupted);
                    }
                }
                first = false;
            }

            self.board.undo(m, &mi);

            if acc.min_score() >= input_beta {
                break;
            }
        }

        if !has_valid_move {
            if Rules::is_king_under_attack(&self.board, &pre_move_scratch, self.board.turn) {
                acc.set_score(Score::of_moves_to_mate(0).neg());
            } else {
                acc.set_score(Score::zero());
            }
        }

        return Ok(());
    }

    /// Run one full-depth search with the given window.  `None` means the
    /// search was cancelled before it finished; searches of depth 1 are
    /// never cancelled, so depth-1 always yields a result.
    pub fn search_one_depth(
        &mut self,
        depth: i32,
        lower_bound: Score,
        upper_bound: Score,
    ) -> Result<Option<SearchResultOneDepth>, EngineError> {
        if depth <= 0 {
            return Err(EngineError::SearchDepthOutOfRange(depth));
        }

        self.node_count = 0;
        self.interruptible = depth > 1;
        let mut acc = SingleAccum::new();
        if self
            .search_root(depth, lower_bound, upper_bound, &mut acc)
            .is_err()
        {
            return Ok(None);
        }

        let pv = acc.result.pv;
        let mv = pv.first().copied();
        return Ok(Some(SearchResultOneDepth {
            score: acc.result.score,
            mv,
            pv,
            nodes: self.node_count,
        }));
    }

    /// Like `search_one_depth` but keeping the `max_pvs` best root lines.
    pub fn search_one_depth_mpv(
        &mut self,
        depth: i32,
        max_pvs: i32,
        lower_bound: Score,
        upper_bound: Score,
    ) -> Result<Option<SearchResultOneDepthMpv>, EngineError> {
        if depth <= 0 {
            return Err(EngineError::SearchDepthOutOfRange(depth));
        }
        if max_pvs < 1 {
            return Err(EngineError::PvCountOutOfRange(max_pvs));
        }

        self.node_count = 0;
        self.interruptible = depth > 1;
        let mut acc = MpvAccum::new(max_pvs as usize);
        if self
            .search_root(depth, lower_bound, upper_bound, &mut acc)
            .is_err()
        {
            return Ok(None);
        }

        let nodes = self.node_count;
        let results = acc
            .entries
            .into_iter()
            .map(|entry| SearchResultOneDepth {
                score: entry.score,
                mv: entry.pv.first().copied(),
                pv: entry.pv,
                nodes,
            })
            .collect();
        return Ok(Some(SearchResultOneDepthMpv { results }));
    }
}
