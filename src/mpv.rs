use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::board::Board;
use crate::error::EngineError;
use crate::eval::EvalParams;
use crate::move_history::MoveHistory;
use crate::moves::Move;
use crate::result_info::SearchResultInfo;
use crate::rules::Rules;
use crate::score::Score;
use crate::search::SearchContext;
use crate::tt::TranspositionTable;
use crate::util::Color;

/// Progress callback: receives the current top-K lines, serialized under
/// the driver mutex.
pub type MpvUpdateFn = Box<dyn FnMut(Vec<SearchResultInfo>) + Send>;

/// A root move's score so far: either pinned down exactly, or only known
/// to be at most the pruning bound it was searched under.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum PartialScore {
    AtMost(Score),
    Exactly(Score),
}

impl PartialScore {
    fn is_exact(self) -> bool {
        return matches!(self, PartialScore::Exactly(_));
    }

    fn exact_score(self) -> Score {
        match self {
            PartialScore::Exactly(score) => score,
            PartialScore::AtMost(_) => panic!("exact_score on an upper bound"),
        }
    }
}

/// Per-root-move progress: which depth to try next, whether a worker holds
/// it, and the latest finished result.
struct MoveSearchState {
    m: Move,
    taken: bool,
    next_depth: i32,
    last_result: Option<SearchResultInfo>,
    last_score: PartialScore,
}

impl MoveSearchState {
    fn new(m: Move) -> MoveSearchState {
        MoveSearchState {
            m,
            taken: false,
            next_depth: 1,
            last_result: None,
            last_score: PartialScore::AtMost(Score::max()),
        }
    }
}

// Everything the workers share, guarded by one mutex.  The mutex is held
// only to pick a job or to report one, never across a search.
struct MpvShared {
    moves: Vec<MoveSearchState>,
    current_depth: i32,
    node_count: u64,
    // per depth: the best scores seen, ascending, at most max_pvs of them
    best_scores: Vec<Vec<Score>>,
    // per depth: prune bound once max_pvs scores are known
    lower_bound: Vec<Score>,
    latest: Vec<SearchResultInfo>,
    on_update: MpvUpdateFn,
}

/// Multi-worker driver maintaining the top-K principal variations.
///
/// Each job is one root move searched to one depth; workers prefer the
/// moves that are furthest behind, refining the weakest-looking branches
/// first, and the driver's depth advances once every move caught up.
pub struct MpvDriver {
    board: Board,
    max_depth: i32,
    max_pvs: i32,
    num_workers: usize,
    tt: Arc<TranspositionTable>,
    move_history: Arc<MoveHistory>,
    should_stop: Arc<AtomicBool>,
    eval_params: EvalParams,
    player: Color,
    start: Instant,
    shared: Mutex<MpvShared>,
}

fn is_better_than(m1: &MoveSearchState, m2: &MoveSearchState) -> bool {
    if !m1.last_score.is_exact() {
        return false;
    }
    if !m2.last_score.is_exact() {
        return true;
    }

    let s1 = m1.last_score.exact_score();
    let s2 = m2.last_score.exact_score();
    if s1 != s2 {
        return s1 > s2;
    }
    match (&m1.last_result, &m2.last_result) {
        (None, _) => return false,
        (_, None) => return true,
        (Some(r1), Some(r2)) => {
            if r1.depth != r2.depth {
                return r1.depth > r2.depth;
            }
            return m1.m < m2.m;
        }
    }
}

fn is_higher_pri_than(s1: &MoveSearchState, s2: &MoveSearchState) -> bool {
    match (&s1.last_result, &s2.last_result) {
        (None, None) => return false,
        (None, _) => return true,
        (_, None) => return false,
        (Some(r1), Some(r2)) => {
            if r1.depth != r2.depth {
                return r1.depth < r2.depth;
            }
            if r1.eval != r2.eval {
                return r1.eval < r2.eval;
            }
            return false;
        }
    }
}

impl MpvDriver {
    pub fn search(
        board: Board,
        max_depth: i32,
        max_pvs: i32,
        num_workers: Option<usize>,
        tt: Arc<TranspositionTable>,
        move_history: Arc<MoveHistory>,
        should_stop: Arc<AtomicBool>,
        eval_params: EvalParams,
        on_update: MpvUpdateFn,
    ) -> Result<Vec<SearchResultInfo>, EngineError> {
        if !(1..=crate::search::MAX_SEARCH_PLY).contains(&max_depth) {
            return Err(EngineError::SearchDepthOutOfRange(max_depth));
        }
        if max_pvs < 1 {
            return Err(EngineError::PvCountOutOfRange(max_pvs));
        }

        let player = board.turn;
        let driver = MpvDriver {
            board,
            max_depth,
            max_pvs,
            num_workers: num_workers.unwrap_or_else(num_cpus::get).max(1),
            tt,
            move_history,
            should_stop,
            eval_params,
            player,
            start: Instant::now(),
            shared: Mutex::new(MpvShared {
                moves: Vec::new(),
                current_depth: 1,
                node_count: 0,
                best_scores: vec![Vec::new(); (max_depth + 1) as usize],
                lower_bound: vec![Score::min(); (max_depth + 1) as usize],
                latest: Vec::new(),
                on_update,
            }),
        };
        return driver.search_multi_pv();
    }

    fn search_multi_pv(&self) -> Result<Vec<SearchResultInfo>, EngineError> {
        let scratch = Rules::make_scratch(&self.board);
        let mut valid_moves = Vec::new();
        Rules::list_moves(&self.board, &scratch, &mut valid_moves);

        {
            let mut shared = self.shared.lock().unwrap();
            for &m in valid_moves.iter() {
                if Rules::is_legal_move(&self.board, &scratch, m) {
                    shared.moves.push(MoveSearchState::new(m));
                }
            }
            if shared.moves.is_empty() {
                (shared.on_update)(Vec::new());
                return Err(EngineError::EngineProducedNoMove);
            }
        }

        std::thread::scope(|scope| {
            for _ in 0..self.num_workers {
                scope.spawn(|| self.run_worker());
            }
        });

        let mut shared = self.shared.lock().unwrap();
        if shared.latest.is_empty() {
            return Err(EngineError::EngineProducedNoMove);
        }
        return Ok(std::mem::take(&mut shared.latest));
    }

    /// Pick the next (move, depth) job: among free moves whose next depth
    /// is within the driver's current depth, the one with the shallowest
    /// finished search, ties broken toward the lowest score.  When nothing
    /// qualifies the driver depth advances, once.
    fn select_work(shared: &mut MpvShared, max_depth: i32, can_bump_depth: bool) -> Option<usize> {
        let mut selected: Option<usize> = None;
        let mut has_not_taken = false;

        for i in 0..shared.moves.len() {
            if shared.moves[i].taken {
                continue;
            }
            has_not_taken = true;
            if shared.moves[i].next_depth > shared.current_depth {
                continue;
            }
            match selected {
                None => selected = Some(i),
                Some(j) => {
                    if is_higher_pri_than(&shared.moves[i], &shared.moves[j]) {
                        selected = Some(i);
                    }
                }
            }
        }

        if selected.is_none()
            && can_bump_depth
            && has_not_taken
            && shared.current_depth < max_depth
        {
            shared.current_depth += 1;
            return MpvDriver::select_work(shared, max_depth, false);
        }
        if let Some(i) = selected {
            shared.moves[i].taken = true;
        }
        return selected;
    }

    fn run_worker(&self) {
        let mut board = self.board.clone();
        loop {
            if self.should_stop.load(Ordering::Acquire) {
                break;
            }

            let (index, m, depth, lower_bound) = {
                let mut shared = self.shared.lock().unwrap();
                if shared.current_depth > self.max_depth {
                    break;
                }
                let index = match MpvDriver::select_work(&mut shared, self.max_depth, true) {
                    Some(i) => i,
                    None => break,
                };
                let m = shared.moves[index].m;
                let depth = shared.moves[index].next_depth;
                shared.moves[index].next_depth += 1;
                (index, m, depth, shared.lower_bound[depth as usize])
            };

            let mi = board.make(m);
            let mut core = SearchContext::new(
                &board,
                Arc::clone(&self.tt),
                Arc::clone(&self.move_history),
                None,
                false,
                Arc::clone(&self.should_stop),
                self.eval_params.clone(),
            );
            board.undo(m, &mi);

            let result = match core.search_one_depth(depth, Score::min(), -lower_bound) {
                Ok(Some(r)) => r,
                // interrupted, or nothing searchable: this worker is done
                _ => break,
            };
            let mut result = result;
            result.flip();
            result.prepend_move(m);

            {
                let mut shared = self.shared.lock().unwrap();
                shared.moves[index].taken = false;
                shared.node_count += result.nodes();

                let score = result.score();
                let d = depth as usize;
                let at = shared.best_scores[d].partition_point(|&s| s < score);
                shared.best_scores[d].insert(at, score);

                self.update_result(&mut shared, index, result, depth, lower_bound);

                if shared.best_scores[d].len() > self.max_pvs as usize {
                    // drop the lowest score
                    shared.best_scores[d].remove(0);
                }
                if shared.best_scores[d].len() == self.max_pvs as usize {
                    shared.lower_bound[d] = shared.best_scores[d][0] - Score::one_pawn();
                }
            }
        }
    }

    fn update_result(
        &self,
        shared: &mut MpvShared,
        index: usize,
        result: crate::search::SearchResultOneDepth,
        depth: i32,
        lower_bound: Score,
    ) {
        let score = result.score();
        let m = shared.moves[index].m;
        let result_info = SearchResultInfo::create(
            m,
            result.into_pv(),
            score,
            shared.node_count,
            depth,
            self.start.elapsed(),
        );

        shared.moves[index].last_result = Some(result_info);
        shared.moves[index].last_score = if score <= lower_bound {
            PartialScore::AtMost(lower_bound)
        } else {
            PartialScore::Exactly(score)
        };

        let mut order: Vec<usize> = (0..shared.moves.len()).collect();
        order.sort_by(|&a, &b| {
            if is_better_than(&shared.moves[a], &shared.moves[b]) {
                return std::cmp::Ordering::Less;
            }
            if is_better_than(&shared.moves[b], &shared.moves[a]) {
                return std::cmp::Ordering::Greater;
            }
            return std::cmp::Ordering::Equal;
        });

        let mut results = Vec::with_capacity(self.max_pvs as usize);
        for &i in order.iter() {
            let state = &shared.moves[i];
            if !state.last_score.is_exact() {
                continue;
            }
            if let Some(r) = &state.last_result {
                let mut clone = r.clone();
                clone.flip(self.player);
                results.push(clone);
                if results.len() >= self.max_pvs as usize {
                    break;
                }
            }
        }

        if !results.is_empty() {
            shared.latest = results.clone();
        }
        (shared.on_update)(results);
    }
}
