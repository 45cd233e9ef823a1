use std::sync::Arc;

use crate::bitboard;
use crate::board::Board;
use crate::place::Place;
use crate::rules::EvalScratch;
use crate::score::Score;
use crate::util::*;

// Feature coefficients.  All milli-pawn values.

const KING_SAFETY_FROM_QUEEN_SCORE: Score = Score::of_milli_pawns(271);
const KING_SAFETY_FROM_QUEEN_ROWS: usize = 5;
const KING_ROUGH_SAFETY_FROM_QUEEN_SCORE: Score = Score::of_milli_pawns(247);
const KING_ROUGH_SAFETY_FROM_QUEEN_WITH_PAWNS_SCORE: Score = Score::of_milli_pawns(300);
const KING_IS_BEING_ATTACKED_VALUE: Score = Score::of_milli_pawns(-274);

const KNIGHT_ATTACK_MULTIPLIER: Score = Score::of_milli_pawns(1000);
const BISHOP_ATTACK_MULTIPLIER: Score = Score::of_milli_pawns(1000);
const ROOK_ATTACK_MULTIPLIER: Score = Score::of_milli_pawns(1000);
const QUEEN_ATTACK_MULTIPLIER: Score = Score::of_milli_pawns(1000);
const ATTACK_MULTIPLIER: Score = Score::of_milli_pawns(309);

const KNIGHT_MOBILITY_MULTIPLIER: Score = Score::of_milli_pawns(830);
const BISHOP_MOBILITY_MULTIPLIER: Score = Score::of_milli_pawns(1320);
const ROOK_MOBILITY_MULTIPLIER: Score = Score::of_milli_pawns(1000);
const MOBILITY_MULTIPLIER: Score = Score::of_milli_pawns(1839);

const KNIGHT_MOBILITY_SCORE: Score = Score::of_milli_pawns(40);
const BISHOP_MOBILITY_SCORE: Score = Score::of_milli_pawns(30);
const ROOK_MOBILITY_SCORE: Score = Score::of_milli_pawns(20);

const DOUBLED_PAWN_SCORE: Score = Score::of_milli_pawns(0);
const ISOLATED_PAWN_SCORE: Score = Score::of_milli_pawns(-160);

const PASSED_PAWN_MULTIPLIER: f64 = 0.641;
const PASSED_PAWN_SCORE: [Score; 8] = [
    Score::of_milli_pawns(0),
    Score::of_milli_pawns(500),
    Score::of_milli_pawns(550),
    Score::of_milli_pawns(610),
    Score::of_milli_pawns(680),
    Score::of_milli_pawns(760),
    Score::of_milli_pawns(850),
    Score::of_milli_pawns(0),
];

const ROOK_ON_OPEN_FILE_SCORE: Score = Score::of_milli_pawns(171);

const BISHOP_PAIR_VALUE: Score = Score::of_milli_pawns(200);

/// Runtime-tunable coefficients for the optional king-threat term; all zero
/// or disabled by default.
#[derive(Copy, Clone, Debug)]
pub struct EvalConfig {
    pub king_threat_from_pieces_enabled: bool,
    pub king_threat_from_pieces: i32,
    pub king_threat_from_queen: i32,
    pub king_threat_from_bishop: i32,
    pub king_threat_from_rook: i32,
    pub king_threat_from_knight: i32,
}

impl Default for EvalConfig {
    fn default() -> EvalConfig {
        EvalConfig {
            king_threat_from_pieces_enabled: false,
            king_threat_from_pieces: 0,
            king_threat_from_queen: 1000,
            king_threat_from_bishop: 1000,
            king_threat_from_rook: 0,
            king_threat_from_knight: 0,
        }
    }
}

/// A custom re-weighting function may be installed to combine the raw
/// feature vector differently from the built-in weights.
pub type CustomEval = Arc<dyn Fn(&Features, &Board) -> Score + Send + Sync>;

#[derive(Clone, Default)]
pub struct EvalParams {
    pub config: EvalConfig,
    pub custom_eval: Option<CustomEval>,
}

/// One side's feature vector; `current_eval` is the built-in weighted sum.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PlayerFeatures {
    pub current_eval: Score,
    pub material_points: Score,
    pub attack_points: Score,
    pub mobility_points: Score,
    pub pawn_points: Score,
    pub rooks_on_open_file_points: Score,
    pub bishop_pair_points: Score,
    pub king_safe_from_queen_points: Score,
    pub king_rough_safe_from_queen_points: Score,
    pub king_rough_safe_from_queen_with_pawns_points: Score,
    pub king_is_being_attacked_points: Score,
    pub king_threat_from_pieces: Score,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Features {
    pub white: PlayerFeatures,
    pub black: PlayerFeatures,
}

impl Features {
    pub fn get(&self, color: Color) -> &PlayerFeatures {
        match color {
            Color::White => &self.white,
            Color::Black => &self.black,
            Color::None => panic!("features for empty color"),
        }
    }
}

fn count_attacks(board: &Board, color: Color, bb: u64) -> i32 {
    let bb = bb & !board.bb_piece[!color as usize][PieceType::Pawn.index()];
    return bb.count_ones() as i32;
}

// Knight

fn knight_moves_bb(board: &Board, color: Color, place: Place) -> u64 {
    return bitboard::knight_moves(place) & !board.bb_blockers[color as usize];
}

fn knight_attacks_bb(board: &Board, color: Color, place: Place) -> u64 {
    return bitboard::knight_moves(place) & board.bb_blockers[!color as usize];
}

fn count_knight_moves(board: &Board, color: Color, place: Place) -> i32 {
    return knight_moves_bb(board, color, place).count_ones() as i32;
}

// Long-range mobility sees through colleagues of the same movement kind:
// a bishop is not blocked by its own bishops or queens, a rook by its own
// rooks or queens.

fn count_bishop_moves(board: &Board, color: Color, place: Place) -> i32 {
    let block = board.bb_blockers[color as usize]
        ^ board.bb_piece[color as usize][PieceType::Bishop.index()]
        ^ board.bb_piece[color as usize][PieceType::Queen.index()];
    let dest =
        bitboard::bishop_moves(place, block | board.bb_blockers[!color as usize]) & !block;
    return dest.count_ones() as i32;
}

fn count_rook_moves(board: &Board, color: Color, place: Place) -> i32 {
    let block = board.bb_blockers[color as usize]
        ^ board.bb_piece[color as usize][PieceType::Rook.index()]
        ^ board.bb_piece[color as usize][PieceType::Queen.index()];
    let dest = bitboard::rook_moves(place, block | board.bb_blockers[!color as usize]) & !block;
    return dest.count_ones() as i32;
}

fn bishop_attacks_bb(board: &Board, color: Color, place: Place) -> u64 {
    return bitboard::bishop_moves(place, board.get_blockers())
        & board.bb_blockers[!color as usize];
}

fn rook_attacks_bb(board: &Board, color: Color, place: Place) -> u64 {
    return bitboard::rook_moves(place, board.get_blockers()) & board.bb_blockers[!color as usize];
}

fn queen_moves_bb(board: &Board, place: Place) -> u64 {
    return bitboard::queen_moves(place, board.get_blockers());
}

fn queen_attacks_bb(board: &Board, color: Color, place: Place) -> u64 {
    return queen_moves_bb(board, place) & board.bb_blockers[!color as usize];
}

fn eval_attacks(board: &Board, color: Color) -> Score {
    let mut attack_points = Score::zero();

    let mut knight_attacks = 0;
    for &place in board.pieces(color, PieceType::Knight) {
        knight_attacks += count_attacks(board, color, knight_attacks_bb(board, color, place));
    }
    attack_points += KNIGHT_ATTACK_MULTIPLIER * knight_attacks;

    let mut bishop_attacks = 0;
    for &place in board.pieces(color, PieceType::Bishop) {
        bishop_attacks += count_attacks(board, color, bishop_attacks_bb(board, color, place));
    }
    attack_points += BISHOP_ATTACK_MULTIPLIER * bishop_attacks;

    let mut rook_attacks = 0;
    for &place in board.pieces(color, PieceType::Rook) {
        rook_attacks += count_attacks(board, color, rook_attacks_bb(board, color, place));
    }
    attack_points += ROOK_ATTACK_MULTIPLIER * rook_attacks;

    let mut queen_attacks = 0;
    for &place in board.pieces(color, PieceType::Queen) {
        queen_attacks += count_attacks(board, color, queen_attacks_bb(board, color, place));
    }
    attack_points += QUEEN_ATTACK_MULTIPLIER * queen_attacks;

    return attack_points * ATTACK_MULTIPLIER;
}

fn eval_mob(board: &Board, color: Color) -> Score {
    let mut mob_score = Score::zero();

    let mut knight_moves = 0;
    for &place in board.pieces(color, PieceType::Knight) {
        knight_moves += count_knight_moves(board, color, place);
    }
    mob_score += KNIGHT_MOBILITY_SCORE * knight_moves * KNIGHT_MOBILITY_MULTIPLIER;

    let mut bishop_moves = 0;
    for &place in board.pieces(color, PieceType::Bishop) {
        bishop_moves += count_bishop_moves(board, color, place);
    }
    mob_score += BISHOP_MOBILITY_SCORE * bishop_moves * BISHOP_MOBILITY_MULTIPLIER;

    let mut rook_moves = 0;
    for &place in board.pieces(color, PieceType::Rook) {
        rook_moves += count_rook_moves(board, color, place);
    }
    mob_score += ROOK_MOBILITY_SCORE * rook_moves * ROOK_MOBILITY_MULTIPLIER;

    return mob_score * MOBILITY_MULTIPLIER;
}

fn eval_pawns(board: &Board, color: Color) -> Score {
    let mut pawn_score = Score::zero();

    let op = !color;
    let own_pawns = board.bb_piece[color as usize][PieceType::Pawn.index()];
    let enemy_pawns = board.bb_piece[op as usize][PieceType::Pawn.index()];

    for &place in board.pieces(color, PieceType::Pawn) {
        let row = place.player_view(color).rank() as usize;
        if bitboard::passed_pawn_mask(color, place) & enemy_pawns == 0 {
            pawn_score += PASSED_PAWN_SCORE[row] * PASSED_PAWN_MULTIPLIER;
        }
        if bitboard::neighbor_files_mask(place) & own_pawns == 0 {
            pawn_score += ISOLATED_PAWN_SCORE;
        }
        if (bitboard::file_mask(place) & own_pawns) & !place_bb(place) != 0 {
            pawn_score += DOUBLED_PAWN_SCORE;
        }
    }

    return pawn_score;
}

fn eval_rooks_on_open_file(board: &Board, color: Color) -> Score {
    let pawns_mask = board.bb_piece[color as usize][PieceType::Pawn.index()]
        | board.bb_piece[!color as usize][PieceType::Pawn.index()];
    let mut total = Score::zero();
    for &place in board.pieces(color, PieceType::Rook) {
        if pawns_mask & bitboard::file_ahead_mask(color, place) == 0 {
            total += ROOK_ON_OPEN_FILE_SCORE;
        }
    }
    return total;
}

fn eval_bishop_pair(board: &Board, color: Color) -> Score {
    if board.pieces(color, PieceType::Bishop).len() >= 2 {
        return BISHOP_PAIR_VALUE;
    }
    return Score::zero();
}

// King safety

fn eval_king_safe_from_queen(board: &Board, color: Color) -> Score {
    let op = !color;
    let safe = if board.pieces(op, PieceType::Queen).is_empty() {
        true
    } else {
        // a virtual queen on our king square must have no move into the
        // rows facing the opponent
        let king = board.king(color);
        let queen_reach = queen_moves_bb(board, king) & !board.bb_blockers[color as usize];
        queen_reach & bitboard::first_n_ranks(op, KING_SAFETY_FROM_QUEEN_ROWS) == 0
    };
    if safe {
        return KING_SAFETY_FROM_QUEEN_SCORE;
    }
    return Score::zero();
}

fn eval_king_rough_safe_from_queen(board: &Board, color: Color) -> Score {
    let op = !color;
    let safe = if board.pieces(op, PieceType::Queen).is_empty() {
        true
    } else {
        let king = board.king(color).player_view(color);
        king.rank() == 0 && !(3..=5).contains(&king.file())
    };
    if safe {
        return KING_ROUGH_SAFETY_FROM_QUEEN_SCORE;
    }
    return Score::zero();
}

fn shield_mask(color: Color, places: &[(i8, i8)]) -> u64 {
    let mut bb = 0u64;
    for &(rank, file) in places {
        let place = Place::of_rank_file(rank, file).player_view(color);
        bb |= place_bb(place);
    }
    return bb;
}

fn eval_king_rough_safe_from_queen_with_pawns(board: &Board, color: Color) -> Score {
    let op = !color;
    let safe = if board.pieces(op, PieceType::Queen).is_empty() {
        true
    } else {
        let king = board.king(color).player_view(color);
        let pawns = board.bb_piece[color as usize][PieceType::Pawn.index()];
        let covered = |mask: u64| pawns & mask == mask;
        if king.rank() != 0 {
            false
        } else if king.file() > 5 {
            covered(shield_mask(color, &[(1, 5), (1, 6), (1, 7)]))
                || covered(shield_mask(color, &[(1, 5), (1, 6), (2, 7)]))
        } else if king.file() < 3 {
            covered(shield_mask(color, &[(1, 0), (1, 1), (1, 2)]))
                || covered(shield_mask(color, &[(2, 0), (1, 1), (1, 2)]))
        } else {
            false
        }
    };
    if safe {
        return KING_ROUGH_SAFETY_FROM_QUEEN_WITH_PAWNS_SCORE;
    }
    return Score::zero();
}

fn eval_king_is_being_attacked(board: &Board, scratch: &EvalScratch, color: Color) -> Score {
    let op = !color;
    if scratch.get(op) & place_bb(board.king(color)) != 0 {
        return KING_IS_BEING_ATTACKED_VALUE;
    }
    return Score::zero();
}

fn eval_king_threat_from_pieces(board: &Board, color: Color, config: &EvalConfig) -> Score {
    if !config.king_threat_from_pieces_enabled {
        return Score::zero();
    }

    let king = board.king(color).player_view(color);
    if king.rank() >= 2 || (king.file() > 3 && king.file() < 5) {
        return Score::zero();
    }

    let king_side = king.file() > 4;
    let mut castle_area = 0u64;
    for rank in 1..=2 {
        let files: [i8; 3] = if king_side { [5, 6, 7] } else { [0, 1, 2] };
        for file in files {
            castle_area |= place_bb(Place::of_rank_file(rank, file).player_view(color));
        }
    }

    let op = !color;
    let blockers = board.bb_piece[0][PieceType::Pawn.index()]
        | board.bb_piece[1][PieceType::Pawn.index()];
    let mut score = Score::zero();
    for &place in board.pieces(op, PieceType::Knight) {
        if bitboard::knight_moves(place) & castle_area != 0 {
            score += Score::of_milli_pawns(config.king_threat_from_knight);
        }
    }
    for &place in board.pieces(op, PieceType::Rook) {
        if bitboard::rook_moves(place, blockers) & castle_area != 0 {
            score += Score::of_milli_pawns(config.king_threat_from_rook);
        }
    }
    for &place in board.pieces(op, PieceType::Bishop) {
        if bitboard::bishop_moves(place, blockers) & castle_area != 0 {
            score += Score::of_milli_pawns(config.king_threat_from_bishop);
        }
    }
    for &place in board.pieces(op, PieceType::Queen) {
        if bitboard::queen_moves(place, blockers) & castle_area != 0 {
            score += Score::of_milli_pawns(config.king_threat_from_queen);
        }
    }

    return score * Score::of_milli_pawns(config.king_threat_from_pieces);
}

fn eval_king_safety(
    board: &Board,
    scratch: &EvalScratch,
    color: Color,
    config: &EvalConfig,
) -> Score {
    return eval_king_safe_from_queen(board, color)
        + eval_king_rough_safe_from_queen(board, color)
        + eval_king_rough_safe_from_queen_with_pawns(board, color)
        + eval_king_is_being_attacked(board, scratch, color)
        + eval_king_threat_from_pieces(board, color, config);
}

fn player_features(
    board: &Board,
    scratch: &EvalScratch,
    color: Color,
    config: &EvalConfig,
) -> PlayerFeatures {
    let material_points = board.material_score(color);
    let attack_points = eval_attacks(board, color);
    let mobility_points = eval_mob(board, color);
    let pawn_points = eval_pawns(board, color);
    let rooks_on_open_file_points = eval_rooks_on_open_file(board, color);
    let bishop_pair_points = eval_bishop_pair(board, color);
    let king_safe_from_queen_points = eval_king_safe_from_queen(board, color);
    let king_rough_safe_from_queen_points = eval_king_rough_safe_from_queen(board, color);
    let king_rough_safe_from_queen_with_pawns_points =
        eval_king_rough_safe_from_queen_with_pawns(board, color);
    let king_is_being_attacked_points = eval_king_is_being_attacked(board, scratch, color);
    let king_threat_from_pieces = eval_king_threat_from_pieces(board, color, config);

    let current_eval = material_points
        + attack_points
        + mobility_points
        + pawn_points
        + rooks_on_open_file_points
        + bishop_pair_points
        + king_safe_from_queen_points
        + king_rough_safe_from_queen_points
        + king_rough_safe_from_queen_with_pawns_points
        + king_is_being_attacked_points
        + king_threat_from_pieces;

    return PlayerFeatures {
        current_eval,
        material_points,
        attack_points,
        mobility_points,
        pawn_points,
        rooks_on_open_file_points,
        bishop_pair_points,
        king_safe_from_queen_points,
        king_rough_safe_from_queen_points,
        king_rough_safe_from_queen_with_pawns_points,
        king_is_being_attacked_points,
        king_threat_from_pieces,
    };
}

pub struct Evaluator;

impl Evaluator {
    /// Static score from White's point of view.
    pub fn eval_for_white(board: &Board, scratch: &EvalScratch, params: &EvalParams) -> Score {
        if let Some(custom) = &params.custom_eval {
            return custom(&Evaluator::features(board, scratch, &params.config), board);
        }
        let white = player_features(board, scratch, Color::White, &params.config);
        let black = player_features(board, scratch, Color::Black, &params.config);
        return white.current_eval - black.current_eval;
    }

    pub fn eval_for_current_player(
        board: &Board,
        scratch: &EvalScratch,
        params: &EvalParams,
    ) -> Score {
        return Evaluator::eval_for_white(board, scratch, params)
            .neg_if(board.turn == Color::Black);
    }

    /// The raw per-side feature vectors, for external re-weighting.
    pub fn features(board: &Board, scratch: &EvalScratch, config: &EvalConfig) -> Features {
        return Features {
            white: player_features(board, scratch, Color::White, config),
            black: player_features(board, scratch, Color::Black, config),
        };
    }

    pub fn eval_king_safety(
        board: &Board,
        scratch: &EvalScratch,
        color: Color,
        config: &EvalConfig,
    ) -> Score {
        return eval_king_safety(board, scratch, color, config);
    }

    pub fn eval_rooks_on_open_file(board: &Board, color: Color) -> Score {
        return eval_rooks_on_open_file(board, color);
    }

    pub fn eval_pawns(board: &Board, color: Color) -> Score {
        return eval_pawns(board, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Rules;

    fn eval_fen(fen: &str) -> Score {
        let board = Board::from_fen(fen).unwrap();
        let scratch = Rules::make_scratch(&board);
        return Evaluator::eval_for_white(&board, &scratch, &EvalParams::default());
    }

    #[test]
    fn initial_position_is_balanced() {
        assert_eq!(
            eval_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -"),
            Score::zero()
        );
    }

    #[test]
    fn extra_queen_wins_the_eval() {
        let s = eval_fen("rnb1kbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -");
        assert!(s > Score::of_pawns(5.0));
        let s = eval_fen("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNB1KBNR w KQkq -");
        assert!(s < -Score::of_pawns(5.0));
    }

    #[test]
    fn eval_is_side_symmetric() {
        // mirror a middlegame position and flip the side to move
        let s1 = eval_fen("r1bqk2r/pppp1ppp/2n2n2/2b1p3/2B1P3/2N2N2/PPPP1PPP/R1BQK2R w KQkq -");
        let s2 = eval_fen("r1bqk2r/pppp1ppp/2n2n2/2b1p3/2B1P3/2N2N2/PPPP1PPP/R1BQK2R b KQkq -");
        // the static eval does not depend on the side to move
        assert_eq!(s1, s2);
    }

    #[test]
    fn eval_for_current_player_flips() {
        let board =
            Board::from_fen("rnb1kbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR b KQkq -").unwrap();
        let scratch = Rules::make_scratch(&board);
        let params = EvalParams::default();
        let white = Evaluator::eval_for_white(&board, &scratch, &params);
        let current = Evaluator::eval_for_current_player(&board, &scratch, &params);
        assert_eq!(current, -white);
    }

    #[test]
    fn passed_pawn_is_rewarded() {
        let with_passer = eval_fen("4k3/8/8/4P3/8/8/8/4K3 w - -");
        let without = eval_fen("4k3/4p3/8/4P3/8/8/8/4K3 w - -");
        assert!(with_passer > without);
    }

    #[test]
    fn isolated_pawn_is_punished() {
        let features_isolated = {
            let board = Board::from_fen("4k3/8/8/8/8/8/4P3/4K3 w - -").unwrap();
            let scratch = Rules::make_scratch(&board);
            Evaluator::features(&board, &scratch, &EvalConfig::default())
        };
        // a lone pawn is both passed and isolated
        assert_eq!(
            features_isolated.white.pawn_points,
            PASSED_PAWN_SCORE[1] * PASSED_PAWN_MULTIPLIER + ISOLATED_PAWN_SCORE
        );
    }

    #[test]
    fn rook_on_open_file_bonus() {
        let board = Board::from_fen("4k3/5ppp/8/8/8/8/5PPP/R3K3 w - -").unwrap();
        assert_eq!(
            Evaluator::eval_rooks_on_open_file(&board, Color::White),
            ROOK_ON_OPEN_FILE_SCORE
        );
        // a rook behind its own pawn gets nothing
        let board = Board::from_fen("4k3/5ppp/8/8/8/P7/5PPP/R3K3 w - -").unwrap();
        assert_eq!(
            Evaluator::eval_rooks_on_open_file(&board, Color::White),
            Score::zero()
        );
    }

    #[test]
    fn bishop_pair_bonus_shows_in_features() {
        let board = Board::from_fen("4k3/8/8/8/8/8/8/2B1KB2 w - -").unwrap();
        let scratch = Rules::make_scratch(&board);
        let features = Evaluator::features(&board, &scratch, &EvalConfig::default());
        assert_eq!(features.white.bishop_pair_points, BISHOP_PAIR_VALUE);
        assert_eq!(features.black.bishop_pair_points, Score::zero());
    }

    #[test]
    fn king_attack_penalty_applies() {
        // black rook pins its gaze on the white king
        let board = Board::from_fen("4k3/8/8/8/8/8/8/r3K3 w - -").unwrap();
        let scratch = Rules::make_scratch(&board);
        let features = Evaluator::features(&board, &scratch, &EvalConfig::default());
        assert_eq!(
            features.white.king_is_being_attacked_points,
            KING_IS_BEING_ATTACKED_VALUE
        );
        assert_eq!(
            features.black.king_is_being_attacked_points,
            Score::zero()
        );
    }

    #[test]
    fn no_queen_means_king_is_safe_from_queen() {
        let board = Board::from_fen("4k3/8/8/8/8/8/8/4K3 w - -").unwrap();
        let scratch = Rules::make_scratch(&board);
        let features = Evaluator::features(&board, &scratch, &EvalConfig::default());
        assert_eq!(
            features.white.king_safe_from_queen_points,
            KING_SAFETY_FROM_QUEEN_SCORE
        );
        assert_eq!(
            features.white.king_rough_safe_from_queen_points,
            KING_ROUGH_SAFETY_FROM_QUEEN_SCORE
        );
    }

    #[test]
    fn custom_eval_replaces_the_weights() {
        let board =
            Board::from_fen("rnb1kbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -").unwrap();
        let scratch = Rules::make_scratch(&board);
        let params = EvalParams {
            custom_eval: Some(Arc::new(|features: &Features, _board: &Board| {
                features.white.material_points - features.black.material_points
            })),
            ..EvalParams::default()
        };
        let custom = Evaluator::eval_for_white(&board, &scratch, &params);
        let board2 = board.clone();
        assert_eq!(
            custom,
            board2.material_score(Color::White) - board2.material_score(Color::Black)
        );
    }
}
