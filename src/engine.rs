use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::board::Board;
use crate::book::OpeningBook;
use crate::error::EngineError;
use crate::eval::EvalParams;
use crate::move_history::MoveHistory;
use crate::mpv::{MpvDriver, MpvUpdateFn};
use crate::result_info::SearchResultInfo;
use crate::score::Score;
use crate::search::{SearchContext, MAX_SEARCH_PLY};
use crate::tt::TranspositionTable;

/// Aspiration half-window around the previous depth's score.
const SEARCH_WINDOW: Score = Score::of_milli_pawns(554);

const DEFAULT_CACHE_SIZE: usize = 16 << 20;

/// Per-depth progress callback for the single-line search.
pub type UpdateFn = Box<dyn FnMut(SearchResultInfo) + Send>;

pub struct EngineOptions {
    pub cache_size: usize,
    /// Forget the transposition table and move history between requests.
    pub clear_cache_before_move: bool,
    pub eval_params: EvalParams,
    pub book: Option<Arc<dyn OpeningBook>>,
}

impl Default for EngineOptions {
    fn default() -> EngineOptions {
        EngineOptions {
            cache_size: DEFAULT_CACHE_SIZE,
            clear_cache_before_move: false,
            eval_params: EvalParams::default(),
            book: None,
        }
    }
}

/// A pending result: the shared stop flag plus the channel the worker will
/// answer on.  `wait_at_most` is the unit of cancellation: on timeout it
/// raises the flag and then blocks until the worker has let go.
pub struct FutureResult<T> {
    should_stop: Arc<AtomicBool>,
    receiver: Receiver<Result<T, EngineError>>,
}

impl<T> FutureResult<T> {
    fn new(
        should_stop: Arc<AtomicBool>,
        receiver: Receiver<Result<T, EngineError>>,
    ) -> FutureResult<T> {
        FutureResult {
            should_stop,
            receiver,
        }
    }

    pub fn stop_and_forget(&self) {
        self.should_stop.store(true, Ordering::Release);
    }

    pub fn stop_and_wait(&self) {
        self.stop_and_forget();
        let _ = self.receiver.recv();
    }

    pub fn result_now(&self) -> Result<T, EngineError> {
        return self.wait_at_most(Some(Duration::ZERO));
    }

    pub fn wait(&self) -> Result<T, EngineError> {
        return self.wait_at_most(None);
    }

    pub fn wait_at_most(&self, span: Option<Duration>) -> Result<T, EngineError> {
        if let Some(span) = span {
            match self.receiver.recv_timeout(span) {
                Ok(result) => return result,
                Err(RecvTimeoutError::Timeout) => {
                    self.stop_and_forget();
                    // fall through and block until the worker exits
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(EngineError::EngineProducedNoMove);
                }
            }
        }
        match self.receiver.recv() {
            Ok(result) => return result,
            Err(_) => return Err(EngineError::EngineProducedNoMove),
        }
    }
}

enum Request {
    Search {
        should_stop: Arc<AtomicBool>,
        board: Board,
        max_depth: i32,
        on_update: Option<UpdateFn>,
        reply: Sender<Result<SearchResultInfo, EngineError>>,
    },
    MpvSearch {
        should_stop: Arc<AtomicBool>,
        board: Board,
        max_depth: i32,
        max_pvs: i32,
        num_workers: Option<usize>,
        on_update: MpvUpdateFn,
        reply: Sender<Result<Vec<SearchResultInfo>, EngineError>>,
    },
    MpvSearchSp {
        should_stop: Arc<AtomicBool>,
        board: Board,
        max_depth: i32,
        max_pvs: i32,
        on_update: Option<MpvUpdateFn>,
        reply: Sender<Result<Vec<SearchResultInfo>, EngineError>>,
    },
}

/// Iterative deepening with aspiration windows over a single search core.
fn pv_search(
    board: &Board,
    max_depth: i32,
    tt: &Arc<TranspositionTable>,
    move_history: &Arc<MoveHistory>,
    book: Option<Arc<dyn OpeningBook>>,
    should_stop: &Arc<AtomicBool>,
    eval_params: EvalParams,
    mut on_update: Option<UpdateFn>,
) -> Result<SearchResultInfo, EngineError> {
    let start = Instant::now();
    let mut node_count: u64 = 0;
    let mut result: Option<SearchResultInfo> = None;

    let mut core = SearchContext::new(
        board,
        Arc::clone(tt),
        Arc::clone(move_history),
        book,
        true,
        Arc::clone(should_stop),
        eval_params,
    );

    for d in 1..=max_depth {
        let (lower_bound, upper_bound) = match &result {
            None => (Score::min(), Score::max()),
            Some(prev) => {
                if prev.eval.is_mate() {
                    (prev.eval.dec_mate_moves(2), prev.eval.inc_mate_moves(2))
                } else {
                    (prev.eval - SEARCH_WINDOW, prev.eval + SEARCH_WINDOW)
                }
            }
        };

        let mut r = match core.search_one_depth(d, lower_bound, upper_bound)? {
            Some(r) => r,
            None => break,
        };
        if !(r.score() > lower_bound && r.score() < upper_bound) {
            // the window failed; search again at full width
            r = match core.search_one_depth(d, Score::min(), Score::max())? {
                Some(r) => r,
                None => break,
            };
        }

        let m = match r.best_move() {
            Some(m) => m,
            None => return Err(EngineError::EngineProducedNoMove),
        };

        node_count += r.nodes();
        let score = r.score();
        let info =
            SearchResultInfo::create(m, r.into_pv(), score, node_count, d, start.elapsed());
        if let Some(on_update) = &mut on_update {
            let mut clone = info.clone();
            clone.flip(board.turn);
            on_update(clone);
        }
        let mate_found = info.eval.is_mate();
        result = Some(info);
        if should_stop.load(Ordering::Acquire) {
            break;
        }
        if mate_found {
            // a forced mate is confirmed; deeper search cannot improve it
            break;
        }
    }

    match result {
        Some(mut result) => {
            result.flip(board.turn);
            return Ok(result);
        }
        None => return Err(EngineError::EngineProducedNoMove),
    }
}

/// Full-width multi-PV deepening on a single search core.
fn mpv_search_sp(
    board: &Board,
    max_depth: i32,
    max_pvs: i32,
    tt: &Arc<TranspositionTable>,
    move_history: &Arc<MoveHistory>,
    book: Option<Arc<dyn OpeningBook>>,
    should_stop: &Arc<AtomicBool>,
    eval_params: EvalParams,
    mut on_update: Option<MpvUpdateFn>,
) -> Result<Vec<SearchResultInfo>, EngineError> {
    let start = Instant::now();
    let mut node_count: u64 = 0;
    let mut results: Vec<SearchResultInfo> = Vec::new();

    let mut core = SearchContext::new(
        board,
        Arc::clone(tt),
        Arc::clone(move_history),
        book,
        false,
        Arc::clone(should_stop),
        eval_params,
    );

    for d in 1..=max_depth {
        let r = match core.search_one_depth_mpv(d, max_pvs, Score::min(), Score::max())? {
            Some(r) => r,
            None => break,
        };

        node_count += r.nodes();
        let elapsed = start.elapsed();
        results.clear();
        for res in r.results {
            let score = res.score();
            let m = match res.best_move() {
                Some(m) => m,
                None => return Err(EngineError::EngineProducedNoMove),
            };
            results.push(SearchResultInfo::create(
                m,
                res.into_pv(),
                score,
                node_count,
                d,
                elapsed,
            ));
        }
        if let Some(on_update) = &mut on_update {
            let mut clones = Vec::with_capacity(results.len());
            for r in results.iter() {
                let mut clone = r.clone();
                clone.flip(board.turn);
                clones.push(clone);
            }
            on_update(clones);
        }
        if should_stop.load(Ordering::Acquire) {
            break;
        }
    }

    for r in results.iter_mut() {
        r.flip(board.turn);
    }
    return Ok(results);
}

fn run_background_engine(queue: Receiver<Request>, options: EngineOptions) {
    let tt = Arc::new(TranspositionTable::new(options.cache_size));
    let move_history = Arc::new(MoveHistory::new());

    while let Ok(request) = queue.recv() {
        if options.clear_cache_before_move {
            tt.clear();
            move_history.clear();
        }
        match request {
            Request::Search {
                should_stop,
                board,
                max_depth,
                on_update,
                reply,
            } => {
                let result = pv_search(
                    &board,
                    max_depth,
                    &tt,
                    &move_history,
                    options.book.clone(),
                    &should_stop,
                    options.eval_params.clone(),
                    on_update,
                );
                let _ = reply.send(result);
            }
            Request::MpvSearch {
                should_stop,
                board,
                max_depth,
                max_pvs,
                num_workers,
                on_update,
                reply,
            } => {
                let result = MpvDriver::search(
                    board,
                    max_depth,
                    max_pvs,
                    num_workers,
                    Arc::clone(&tt),
                    Arc::clone(&move_history),
                    should_stop,
                    options.eval_params.clone(),
                    on_update,
                );
                let _ = reply.send(result);
            }
            Request::MpvSearchSp {
                should_stop,
                board,
                max_depth,
                max_pvs,
                on_update,
                reply,
            } => {
                let result = mpv_search_sp(
                    &board,
                    max_depth,
                    max_pvs,
                    &tt,
                    &move_history,
                    options.book.clone(),
                    &should_stop,
                    options.eval_params.clone(),
                    on_update,
                );
                let _ = reply.send(result);
            }
        }
    }
}

/// The engine handle.  One background thread drains a FIFO queue of search
/// requests; callers hold `FutureResult`s.  Issuing a new request cancels
/// the one in flight, and dropping the handle cancels and joins.
pub struct Engine {
    sender: Option<Sender<Request>>,
    worker: Option<JoinHandle<()>>,
    stop_current: Option<Arc<AtomicBool>>,
}

impl Engine {
    pub fn new(options: EngineOptions) -> Engine {
        let (sender, receiver) = mpsc::channel();
        let worker = std::thread::spawn(move || run_background_engine(receiver, options));
        Engine {
            sender: Some(sender),
            worker: Some(worker),
            stop_current: None,
        }
    }

    fn validate_request(&self, board: &Board, max_depth: i32) -> Result<(), EngineError> {
        if !(1..=MAX_SEARCH_PLY).contains(&max_depth) {
            return Err(EngineError::SearchDepthOutOfRange(max_depth));
        }
        if board.is_history_full() {
            return Err(EngineError::HistoryFull);
        }
        return Ok(());
    }

    fn stop_previous(&mut self) {
        if let Some(stop) = self.stop_current.take() {
            stop.store(true, Ordering::Release);
        }
    }

    fn push(&mut self, request: Request) {
        // the queue only closes when the engine is dropped
        self.sender
            .as_ref()
            .expect("engine queue is closed")
            .send(request)
            .expect("engine worker is gone");
    }

    pub fn start_search(
        &mut self,
        board: &Board,
        max_depth: i32,
        on_update: Option<UpdateFn>,
    ) -> Result<FutureResult<SearchResultInfo>, EngineError> {
        self.validate_request(board, max_depth)?;
        self.stop_previous();

        let should_stop = Arc::new(AtomicBool::new(false));
        let (reply, receiver) = mpsc::channel();
        self.stop_current = Some(Arc::clone(&should_stop));
        self.push(Request::Search {
            should_stop: Arc::clone(&should_stop),
            board: board.clone(),
            max_depth,
            on_update,
            reply,
        });
        return Ok(FutureResult::new(should_stop, receiver));
    }

    pub fn find_best_move(
        &mut self,
        board: &Board,
        max_depth: i32,
        max_time: Option<Duration>,
        on_update: Option<UpdateFn>,
    ) -> Result<SearchResultInfo, EngineError> {
        let future = self.start_search(board, max_depth, on_update)?;
        return future.wait_at_most(max_time);
    }

    pub fn start_mpv_search(
        &mut self,
        board: &Board,
        max_depth: i32,
        max_pvs: i32,
        num_workers: Option<usize>,
        on_update: MpvUpdateFn,
    ) -> Result<FutureResult<Vec<SearchResultInfo>>, EngineError> {
        self.validate_request(board, max_depth)?;
        if max_pvs < 1 {
            return Err(EngineError::PvCountOutOfRange(max_pvs));
        }
        self.stop_previous();

        let should_stop = Arc::new(AtomicBool::new(false));
        let (reply, receiver) = mpsc::channel();
        self.stop_current = Some(Arc::clone(&should_stop));
        self.push(Request::MpvSearch {
            should_stop: Arc::clone(&should_stop),
            board: board.clone(),
            max_depth,
            max_pvs,
            num_workers,
            on_update,
            reply,
        });
        return Ok(FutureResult::new(should_stop, receiver));
    }

    pub fn find_best_moves_mpv(
        &mut self,
        board: &Board,
        max_depth: i32,
        max_pvs: i32,
        num_workers: Option<usize>,
        max_time: Option<Duration>,
        on_update: MpvUpdateFn,
    ) -> Result<Vec<SearchResultInfo>, EngineError> {
        let future =
            self.start_mpv_search(board, max_depth, max_pvs, num_workers, on_update)?;
        return future.wait_at_most(max_time);
    }

    pub fn start_mpv_search_sp(
        &mut self,
        board: &Board,
        max_depth: i32,
        max_pvs: i32,
        on_update: Option<MpvUpdateFn>,
    ) -> Result<FutureResult<Vec<SearchResultInfo>>, EngineError> {
        self.validate_request(board, max_depth)?;
        if max_pvs < 1 {
            return Err(EngineError::PvCountOutOfRange(max_pvs));
        }
        self.stop_previous();

        let should_stop = Arc::new(AtomicBool::new(false));
        let (reply, receiver) = mpsc::channel();
        self.stop_current = Some(Arc::clone(&should_stop));
        self.push(Request::MpvSearchSp {
            should_stop: Arc::clone(&should_stop),
            board: board.clone(),
            max_depth,
            max_pvs,
            on_update,
            reply,
        });
        return Ok(FutureResult::new(should_stop, receiver));
    }

    pub fn find_best_moves_mpv_sp(
        &mut self,
        board: &Board,
        max_depth: i32,
        max_pvs: i32,
        max_time: Option<Duration>,
        on_update: Option<MpvUpdateFn>,
    ) -> Result<Vec<SearchResultInfo>, EngineError> {
        let future = self.start_mpv_search_sp(board, max_depth, max_pvs, on_update)?;
        return future.wait_at_most(max_time);
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.stop_previous();
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::Move;
    use crate::rules::Rules;
    use std::sync::Mutex;

    #[test]
    fn finds_a_legal_move_from_the_start() {
        let mut engine = Engine::new(EngineOptions::default());
        let board = Board::initial();
        let result = engine.find_best_move(&board, 3, None, None).unwrap();
        let scratch = Rules::make_scratch(&board);
        assert!(Rules::is_legal_move(&board, &scratch, result.best_move));
        assert_eq!(result.depth, 3);
        assert_eq!(result.pv.first().copied(), Some(result.best_move));
    }

    #[test]
    fn updates_arrive_once_per_completed_depth() {
        let mut engine = Engine::new(EngineOptions::default());
        let board = Board::initial();
        let depths = Arc::new(Mutex::new(Vec::new()));
        let depths_in = Arc::clone(&depths);
        engine
            .find_best_move(
                &board,
                4,
                None,
                Some(Box::new(move |info| {
                    depths_in.lock().unwrap().push(info.depth);
                })),
            )
            .unwrap();
        assert_eq!(*depths.lock().unwrap(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn black_mate_score_is_negative_for_white() {
        // spec scenario S3 at the engine boundary
        let mut engine = Engine::new(EngineOptions::default());
        let board =
            Board::from_fen("1k6/2p5/p2qp3/p6p/2KPb2P/1P3r2/P1R5/R7 b - - 0 42").unwrap();
        let result = engine.find_best_move(&board, 5, None, None).unwrap();
        assert!(result.eval.is_mate());
        assert!(result.eval.is_negative());
    }

    #[test]
    fn white_mate_is_found_and_deepening_stops() {
        // spec scenario S2
        let mut engine = Engine::new(EngineOptions::default());
        let board = Board::from_fen("4k3/8/3K4/3Q4/8/8/8/8 w - - 0 1").unwrap();
        let result = engine.find_best_move(&board, 12, None, None).unwrap();
        assert!(result.eval.is_mate());
        assert!(result.eval.is_positive());
        assert!(result.eval.moves_to_mate() <= 3);
        // deepening stopped once the mate was confirmed
        assert!(result.depth < 12);
    }

    #[test]
    fn depth_out_of_range_is_rejected() {
        let mut engine = Engine::new(EngineOptions::default());
        let board = Board::initial();
        assert!(matches!(
            engine.find_best_move(&board, 0, None, None),
            Err(EngineError::SearchDepthOutOfRange(0))
        ));
        assert!(matches!(
            engine.find_best_move(&board, 600, None, None),
            Err(EngineError::SearchDepthOutOfRange(600))
        ));
        assert!(matches!(
            engine.find_best_moves_mpv(&board, 3, 0, None, None, Box::new(|_| {})),
            Err(EngineError::PvCountOutOfRange(0))
        ));
    }

    #[test]
    fn mated_position_produces_no_move() {
        let mut engine = Engine::new(EngineOptions::default());
        let board = Board::from_fen(
            "r1bqkb1r/pppp1Qpp/2n2n2/4p3/2B1P3/8/PPPP1PPP/RNB1K1NR b KQkq -",
        )
        .unwrap();
        assert!(matches!(
            engine.find_best_move(&board, 3, None, None),
            Err(EngineError::EngineProducedNoMove)
        ));
    }

    #[test]
    fn timeout_returns_the_best_so_far() {
        let mut engine = Engine::new(EngineOptions::default());
        let board = Board::from_fen(
            "r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq -",
        )
        .unwrap();
        let result = engine
            .find_best_move(&board, 40, Some(Duration::from_millis(300)), None)
            .unwrap();
        // a partial answer: some depth finished, nowhere near 40
        assert!(result.depth >= 1);
        assert!(result.depth < 40);
    }

    #[test]
    fn mpv_request_goes_through_the_queue() {
        let mut engine = Engine::new(EngineOptions::default());
        let board = Board::initial();
        let results = engine
            .find_best_moves_mpv(&board, 3, 3, Some(2), None, Box::new(|_| {}))
            .unwrap();
        assert_eq!(results.len(), 3);
        for window in results.windows(2) {
            assert!(window[0].eval >= window[1].eval);
        }
    }

    #[test]
    fn mpv_sp_request_matches_the_parallel_shape() {
        let mut engine = Engine::new(EngineOptions::default());
        let board = Board::initial();
        let results = engine
            .find_best_moves_mpv_sp(&board, 3, 3, None, None)
            .unwrap();
        assert_eq!(results.len(), 3);
        let moves: Vec<Move> = results.iter().map(|r| r.best_move).collect();
        let mut deduped = moves.clone();
        deduped.dedup();
        assert_eq!(moves, deduped);
    }

    #[test]
    fn serialized_requests_come_back_in_order() {
        let mut engine = Engine::new(EngineOptions::default());
        let board = Board::initial();
        let f1 = engine.start_search(&board, 2, None).unwrap();
        // issuing the second request cancels the first, which still answers
        let f2 = engine.start_search(&board, 2, None).unwrap();
        let r1 = f1.wait();
        let r2 = f2.wait().unwrap();
        assert_eq!(r2.depth, 2);
        // the first either finished or was cut short with a partial result
        if let Ok(r1) = r1 {
            assert!(r1.depth >= 1);
        }
    }

    #[test]
    fn dropping_the_engine_cancels_the_search() {
        let mut engine = Engine::new(EngineOptions::default());
        let board = Board::initial();
        let _future = engine.start_search(&board, 100, None).unwrap();
        // drop joins the worker; the raised stop flag makes that prompt
        drop(engine);
    }
}
