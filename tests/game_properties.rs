use sable::{Board, GameResult, Move, Rules, Score};

// Small deterministic generator so playouts are reproducible.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: usize) -> usize {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        return ((self.0 >> 33) as usize) % bound;
    }
}

fn legal_moves(board: &Board) -> Vec<Move> {
    let scratch = Rules::make_scratch(board);
    let mut moves = Vec::new();
    Rules::list_moves(board, &scratch, &mut moves);
    moves.retain(|&m| Rules::is_legal_move(board, &scratch, m));
    return moves;
}

#[test]
fn random_playouts_keep_every_invariant() {
    for seed in 1..=8u64 {
        let mut rng = Lcg(seed);
        let mut board = Board::initial();

        for _ in 0..80 {
            let moves = legal_moves(&board);
            if moves.is_empty() || Rules::result_slow(&board) != GameResult::NotFinished {
                break;
            }

            // every legal move can be made and unmade without a trace
            let fen_before = board.to_fen();
            let hash_before = board.hash_key();
            for &m in moves.iter() {
                let mi = board.make(m);
                assert!(board.check_board(), "board broken after {}", m);
                assert!(board.check_hash_key(), "hash broken after {}", m);
                board.undo(m, &mi);
                assert_eq!(board.to_fen(), fen_before, "undo of {} changed the fen", m);
                assert_eq!(board.hash_key(), hash_before, "undo of {} changed the hash", m);
            }

            // walk one random move forward
            let m = moves[rng.next(moves.len())];
            board.make(m);

            assert!(board.check_board());
            assert!(board.check_hash_key());

            // the fen survives a round trip
            let round = Board::from_fen(&board.to_fen()).unwrap();
            assert_eq!(round.to_fen(), board.to_fen());
            assert_eq!(round.hash_key(), board.hash_key());
        }
    }
}

#[test]
fn san_round_trips_along_a_playout() {
    let mut rng = Lcg(99);
    let mut board = Board::initial();

    for _ in 0..40 {
        let moves = legal_moves(&board);
        if moves.is_empty() {
            break;
        }
        for &m in moves.iter() {
            let pretty = Rules::pretty_move(&board, m);
            // the draw mark ends lines this parser cannot see again
            let parsed = Rules::parse_pretty_move(&board, &pretty)
                .unwrap_or_else(|e| panic!("failed to parse '{}': {}", pretty, e));
            assert_eq!(parsed, m, "'{}' parsed to a different move", pretty);
        }
        let m = moves[rng.next(moves.len())];
        board.make(m);
        if Rules::result_slow(&board) != GameResult::NotFinished {
            break;
        }
    }
}

#[test]
fn search_plays_a_sane_short_game() {
    use sable::{Engine, EngineOptions};

    let mut engine = Engine::new(EngineOptions::default());
    let mut board = Board::initial();

    // play a few engine moves from both sides; each returned move must be
    // legal and the reported pv must start with it
    for _ in 0..6 {
        let result = engine.find_best_move(&board, 3, None, None).unwrap();
        let scratch = Rules::make_scratch(&board);
        assert!(Rules::is_legal_move(&board, &scratch, result.best_move));
        assert_eq!(result.pv.first().copied(), Some(result.best_move));
        assert!(!result.eval.is_mate());
        assert!(result.eval.abs() < Score::of_pawns(5.0));
        board.make(result.best_move);
    }
}
