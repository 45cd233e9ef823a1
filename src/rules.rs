use crate::bitboard;
use crate::board::Board;
use crate::error::EngineError;
use crate::moves::Move;
use crate::place::Place;
use crate::util::*;

/// Per-position attack bitboards, computed once and passed around so that
/// move generation, legality and evaluation never recompute them.
#[derive(Copy, Clone, Debug)]
pub struct EvalScratch {
    pub attacks: [u64; 2],
}

impl EvalScratch {
    #[inline]
    pub fn get(&self, color: Color) -> u64 {
        return self.attacks[color as usize];
    }
}

// For pawn move generation the en passant target counts as a blocker so the
// capture mask picks it up.
fn pawn_blockers(board: &Board) -> u64 {
    let mut blockers = board.get_blockers();
    if board.passant_place.is_valid() {
        blockers |= place_bb(board.passant_place);
    }
    return blockers;
}

fn piece_attacks_bb(board: &Board, color: Color, piece_type: PieceType, place: Place) -> u64 {
    let attacks = match piece_type {
        PieceType::Pawn => {
            bitboard::pawn_capture_promotion_moves(color, place, pawn_blockers(board))
        }
        PieceType::Knight => bitboard::knight_moves(place),
        PieceType::Bishop => bitboard::bishop_moves(place, board.get_blockers()),
        PieceType::Rook => bitboard::rook_moves(place, board.get_blockers()),
        PieceType::Queen => bitboard::queen_moves(place, board.get_blockers()),
        PieceType::King => bitboard::king_moves(place),
        PieceType::Clear => 0,
    };
    return attacks & !board.bb_blockers[color as usize];
}

fn castle_moves_bb(board: &Board, color: Color, place: Place, attacked: u64) -> u64 {
    let mut moves = 0u64;
    if !board.castle_flags.can_castle(color) {
        return moves;
    }
    if attacked & place_bb(place) != 0 {
        // castling out of check is never allowed
        return moves;
    }
    let line = if color == Color::White { 0 } else { 7 };
    if place.rank() != line {
        return moves;
    }
    let blockers = board.get_blockers();
    let rooks = board.bb_piece[color as usize][PieceType::Rook.index()];
    let at = |file: i8| place_bb(Place::of_rank_file(line, file));

    if board.castle_flags.can_castle_king_side(color)
        && rooks & at(7) != 0
        && blockers & (at(5) | at(6)) == 0
        && attacked & (at(5) | at(6)) == 0
    {
        moves |= at(6);
    }
    if board.castle_flags.can_castle_queen_side(color)
        && rooks & at(0) != 0
        && blockers & (at(1) | at(2) | at(3)) == 0
        && attacked & (at(2) | at(3)) == 0
    {
        moves |= at(2);
    }
    return moves;
}

/// Pseudo-legal destination squares for the piece standing on `place`.
fn piece_moves_bb(
    board: &Board,
    color: Color,
    piece_type: PieceType,
    place: Place,
    attacked: u64,
) -> u64 {
    let moves = match piece_type {
        PieceType::Pawn => bitboard::pawn_moves(color, place, pawn_blockers(board)),
        PieceType::Knight => bitboard::knight_moves(place),
        PieceType::Bishop => bitboard::bishop_moves(place, board.get_blockers()),
        PieceType::Rook => bitboard::rook_moves(place, board.get_blockers()),
        PieceType::Queen => bitboard::queen_moves(place, board.get_blockers()),
        PieceType::King => {
            bitboard::king_moves(place) | castle_moves_bb(board, color, place, attacked)
        }
        PieceType::Clear => 0,
    };
    return moves & !board.bb_blockers[color as usize];
}

fn pop_moves(origin: Place, mut bb: u64, promote: bool, out: &mut Vec<Move>) {
    while bb != 0 {
        let dest = pop_place(&mut bb);
        let mut m = Move::new(origin, dest, PieceType::Clear);
        if promote && (dest.rank() == 0 || dest.rank() == 7) {
            // bulk generation only considers queening; the validator accepts
            // explicit under-promotions from outside
            m.set_promotion(PieceType::Queen);
        }
        out.push(m);
    }
}

fn additional_move_validation(piece_type: PieceType, m: Move) -> bool {
    if piece_type != PieceType::Pawn {
        return m.promotion() == PieceType::Clear;
    }
    let dest_rank = m.dest.rank();
    match m.promotion() {
        PieceType::Clear => {
            return dest_rank != 0 && dest_rank != 7;
        }
        PieceType::Pawn | PieceType::King => {
            return false;
        }
        _ => {
            return dest_rank == 0 || dest_rank == 7;
        }
    }
}

pub struct Rules;

impl Rules {
    /// All squares `color` attacks, own pieces excluded from the targets.
    pub fn attacks_bb(board: &Board, color: Color) -> u64 {
        let mut out = 0u64;
        for piece_type in ALL_PIECES {
            for &place in board.pieces(color, piece_type) {
                out |= piece_attacks_bb(board, color, piece_type, place);
            }
        }
        return out;
    }

    pub fn make_scratch(board: &Board) -> EvalScratch {
        return EvalScratch {
            attacks: [
                Rules::attacks_bb(board, Color::Black),
                Rules::attacks_bb(board, Color::White),
            ],
        };
    }

    /// Enumerate pseudo-legal moves for the side to move, castling and en
    /// passant included.
    pub fn list_moves(board: &Board, scratch: &EvalScratch, out: &mut Vec<Move>) {
        let color = board.turn;
        let attacked = scratch.get(!color);
        for piece_type in ALL_PIECES {
            Rules::list_piece_moves_inner(board, color, attacked, piece_type, out);
        }
    }

    pub fn list_piece_moves(
        board: &Board,
        scratch: &EvalScratch,
        piece_type: PieceType,
        out: &mut Vec<Move>,
    ) {
        let color = board.turn;
        let attacked = scratch.get(!color);
        Rules::list_piece_moves_inner(board, color, attacked, piece_type, out);
    }

    fn list_piece_moves_inner(
        board: &Board,
        color: Color,
        attacked: u64,
        piece_type: PieceType,
        out: &mut Vec<Move>,
    ) {
        let promote = piece_type == PieceType::Pawn;
        for &place in board.pieces(color, piece_type) {
            let bb = piece_moves_bb(board, color, piece_type, place, attacked);
            pop_moves(place, bb, promote, out);
        }
    }

    /// Capture moves only, for the quiescence search.
    pub fn list_takes(board: &Board, out: &mut Vec<Move>) {
        let color = board.turn;
        let enemy = board.bb_blockers[!color as usize];
        for piece_type in ALL_PIECES {
            let promote = piece_type == PieceType::Pawn;
            for &place in board.pieces(color, piece_type) {
                let bb = piece_attacks_bb(board, color, piece_type, place) & enemy;
                pop_moves(place, bb, promote, out);
            }
        }
    }

    /// True iff `m` is pseudo-legal for the side to move and does not leave
    /// its own king attacked.
    pub fn is_legal_move(board: &Board, _scratch: &EvalScratch, m: Move) -> bool {
        let color = board.turn;
        let sq = board.at(m.origin);
        if sq.piece_type == PieceType::Clear || sq.owner != color {
            return false;
        }

        if !additional_move_validation(sq.piece_type, m) {
            return false;
        }
        let attacked = Rules::attacks_bb(board, !color);
        let moves = piece_moves_bb(board, color, sq.piece_type, m.origin, attacked);
        if moves & place_bb(m.dest) == 0 {
            return false;
        }

        let mut copy = board.clone();
        copy.make(m);
        let scratch = Rules::make_scratch(&copy);
        return !Rules::is_king_under_attack(&copy, &scratch, color);
    }

    pub fn is_king_under_attack(board: &Board, scratch: &EvalScratch, color: Color) -> bool {
        let king = board.bb_piece[color as usize][PieceType::King.index()];
        return king & scratch.get(!color) != 0;
    }

    pub fn is_check(board: &Board, scratch: &EvalScratch) -> bool {
        return Rules::is_king_under_attack(board, scratch, board.turn);
    }

    fn has_legal_moves(board: &Board, scratch: &EvalScratch) -> bool {
        let mut moves = Vec::new();
        Rules::list_moves(board, scratch, &mut moves);
        return moves.iter().any(|&m| Rules::is_legal_move(board, scratch, m));
    }

    pub fn is_mate(board: &Board, scratch: &EvalScratch) -> bool {
        if !Rules::is_check(board, scratch) {
            return false;
        }
        return !Rules::has_legal_moves(board, scratch);
    }

    /// Draws that do not require looking at the legal moves: repetition
    /// since the last irreversible move, the 50-move rule, and insufficient
    /// material.  Stalemate is reported through `result`.
    pub fn is_draw_without_stalemate(board: &Board) -> bool {
        if board.repeated() || board.moves_since_last_capture_or_pawn_move() >= 100 {
            return true;
        }
        return is_draw_by_insufficient_material(board);
    }

    pub fn result(board: &Board, scratch: &EvalScratch) -> GameResult {
        let check = Rules::is_check(board, scratch);
        let legal_moves = Rules::has_legal_moves(board, scratch);

        if check && !legal_moves {
            if board.turn == Color::White {
                return GameResult::BlackWon;
            }
            return GameResult::WhiteWon;
        }

        if !legal_moves {
            return GameResult::Draw;
        }

        if Rules::is_draw_without_stalemate(board) {
            return GameResult::Draw;
        }

        return GameResult::NotFinished;
    }

    pub fn result_slow(board: &Board) -> GameResult {
        return Rules::result(board, &Rules::make_scratch(board));
    }

    pub fn is_game_over_slow(board: &Board) -> bool {
        return Rules::result_slow(board) != GameResult::NotFinished;
    }

    /// Standard short algebraic notation with full disambiguation, `x` for
    /// captures, `=Q` for promotions and a `+`/`#` suffix.
    pub fn pretty_move(board: &Board, m: Move) -> String {
        let piece = board.at(m.origin).piece_type;
        let color = board.at(m.origin).owner;

        if piece == PieceType::King {
            if m.origin.file() == 4 && m.dest.file() == 6 {
                return "O-O".to_string();
            } else if m.origin.file() == 4 && m.dest.file() == 2 {
                return "O-O-O".to_string();
            }
        }

        // a pawn leaving its file is capturing even when the target square
        // is empty (en passant)
        let captured = !board.at(m.dest).is_empty()
            || (piece == PieceType::Pawn && m.origin.file() != m.dest.file());

        let mut output = String::new();
        if piece != PieceType::Pawn {
            output.push(piece.to_letter());
        }

        let mut has_other_piece = false;
        let mut has_other_piece_same_rank = false;
        let mut has_other_piece_same_file = false;
        let scratch = Rules::make_scratch(board);
        for &p in board.pieces(color, piece) {
            if p == m.origin {
                continue;
            }
            if !Rules::is_legal_move(board, &scratch, Move::new(p, m.dest, m.promotion())) {
                continue;
            }
            has_other_piece = true;
            if p.file() == m.origin.file() {
                has_other_piece_same_file = true;
            }
            if p.rank() == m.origin.rank() {
                has_other_piece_same_rank = true;
            }
        }

        let include_orig_file = (piece == PieceType::Pawn && captured)
            || (has_other_piece
                && (!has_other_piece_same_file
                    || (has_other_piece_same_file && has_other_piece_same_rank)));
        let include_orig_rank = has_other_piece_same_file;

        if include_orig_file {
            output.push((b'a' + m.origin.file() as u8) as char);
        }
        if include_orig_rank {
            output.push((b'1' + m.origin.rank() as u8) as char);
        }

        if captured {
            output.push('x');
        }

        output.push((b'a' + m.dest.file() as u8) as char);
        output.push((b'1' + m.dest.rank() as u8) as char);

        if m.promotion() != PieceType::Clear {
            output.push('=');
            output.push(m.promotion().to_letter());
        }

        let mut copy = board.clone();
        copy.make(m);
        let scratch = Rules::make_scratch(&copy);
        match Rules::result(&copy, &scratch) {
            GameResult::BlackWon | GameResult::WhiteWon => output.push('#'),
            GameResult::Draw => output.push('='),
            GameResult::NotFinished => {
                if Rules::is_check(&copy, &scratch) {
                    output.push('+');
                }
            }
        }

        return output;
    }

    /// Parse short algebraic notation, tolerating trailing `!?+#` marks.
    pub fn parse_pretty_move(board: &Board, move_in: &str) -> Result<Move, EngineError> {
        if !move_in.is_ascii() {
            return Err(EngineError::InvalidMove(format!(
                "non-ascii move '{}'",
                move_in
            )));
        }
        let mut move_str: Vec<u8> = move_in.as_bytes().to_vec();

        let empty = |s: &Vec<u8>| s.is_empty();
        let peek = |s: &Vec<u8>| *s.last().unwrap() as char;

        // a trailing '=' is the draw mark; a promotion '=' always has its
        // letter after it and is left alone
        while !empty(&move_str) {
            match peek(&move_str) {
                '!' | '?' | '+' | '#' | '=' => {
                    move_str.pop();
                }
                _ => break,
            }
        }

        let stripped = String::from_utf8(move_str.clone()).unwrap();
        if stripped == "O-O" || stripped == "O-O-O" {
            return board.parse_xboard_move_string(&stripped);
        }

        let mut promotion = PieceType::Clear;
        if !empty(&move_str) && peek(&move_str).is_ascii_uppercase() {
            promotion = PieceType::of_letter(peek(&move_str));
            if promotion == PieceType::Clear {
                return Err(EngineError::InvalidMove(format!(
                    "invalid promotion piece in '{}'",
                    move_in
                )));
            }
            move_str.pop();
            if empty(&move_str) || peek(&move_str) != '=' {
                return Err(EngineError::InvalidMove(format!(
                    "expected '=' before promotion letter in '{}'",
                    move_in
                )));
            }
            move_str.pop();
        }

        if move_str.len() < 2 {
            return Err(EngineError::InvalidMove(format!("'{}' too short", move_in)));
        }
        let to_rank = (move_str.pop().unwrap() as i8) - b'1' as i8;
        let to_file = (move_str.pop().unwrap() as i8) - b'a' as i8;
        if !(0..8).contains(&to_rank) || !(0..8).contains(&to_file) {
            return Err(EngineError::InvalidMove(format!(
                "invalid target square in '{}'",
                move_in
            )));
        }
        let to = Place::of_rank_file(to_rank, to_file);

        let mut is_capture = false;
        if !empty(&move_str) && peek(&move_str) == 'x' {
            is_capture = true;
            move_str.pop();
        }

        let mut from_rank: Option<i8> = None;
        if !empty(&move_str) && peek(&move_str).is_ascii_digit() {
            from_rank = Some((move_str.pop().unwrap() as i8) - b'1' as i8);
        }

        let mut from_file: Option<i8> = None;
        if !empty(&move_str) && peek(&move_str).is_ascii_lowercase() {
            from_file = Some((move_str.pop().unwrap() as i8) - b'a' as i8);
        }

        let piece_type;
        if !empty(&move_str) && peek(&move_str).is_ascii_uppercase() {
            piece_type = PieceType::of_letter(peek(&move_str));
            move_str.pop();
        } else {
            piece_type = PieceType::Pawn;
        }

        if !empty(&move_str) {
            return Err(EngineError::InvalidMove(format!(
                "unexpected leading characters in '{}'",
                move_in
            )));
        }

        let scratch = Rules::make_scratch(board);
        let mut moves = Vec::new();
        Rules::list_piece_moves(board, &scratch, piece_type, &mut moves);

        let mut candidate: Option<Move> = None;
        for &m in moves.iter() {
            if !Rules::is_legal_move(board, &scratch, m) {
                continue;
            }
            if let Some(rank) = from_rank {
                if rank != m.origin.rank() {
                    continue;
                }
            }
            if let Some(file) = from_file {
                if file != m.origin.file() {
                    continue;
                }
            }
            if board.at(m.origin).piece_type != piece_type {
                continue;
            }
            if m.dest != to {
                continue;
            }

            let to_cell = board.at(m.dest);
            if piece_type != PieceType::Pawn
                && ((is_capture && to_cell.is_empty()) || (!is_capture && !to_cell.is_empty()))
            {
                return Err(EngineError::InvalidMove(format!(
                    "capture marker does not match the target square in '{}'",
                    move_in
                )));
            }

            if candidate.is_some() {
                return Err(EngineError::AmbiguousMove(move_in.to_string()));
            }
            candidate = Some(m);
        }

        match candidate {
            Some(mut m) => {
                m.set_promotion(promotion);
                return Ok(m);
            }
            None => {
                return Err(EngineError::NoMatchingMove(move_in.to_string()));
            }
        }
    }
}

fn is_draw_by_insufficient_material(board: &Board) -> bool {
    #[derive(PartialEq)]
    enum PiecesLeft {
        KingOnly,
        KingOneKnight,
        KingOneBishop,
        Other,
    }

    let pieces_left = |color: Color| {
        if board.pieces(color, PieceType::Queen).len() > 0
            || board.pieces(color, PieceType::Rook).len() > 0
            || board.pieces(color, PieceType::Pawn).len() > 0
            || board.pieces(color, PieceType::King).len() != 1
        {
            return PiecesLeft::Other;
        }
        let knights = board.pieces(color, PieceType::Knight).len();
        let bishops = board.pieces(color, PieceType::Bishop).len();
        match (knights, bishops) {
            (0, 0) => PiecesLeft::KingOnly,
            (1, 0) => PiecesLeft::KingOneKnight,
            (0, 1) => PiecesLeft::KingOneBishop,
            _ => PiecesLeft::Other,
        }
    };

    let white_left = pieces_left(Color::White);
    if white_left == PiecesLeft::Other {
        return false;
    }
    let black_left = pieces_left(Color::Black);
    if black_left == PiecesLeft::Other {
        return false;
    }

    return white_left == PiecesLeft::KingOnly || black_left == PiecesLeft::KingOnly;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;

    fn legal_moves(board: &Board) -> Vec<Move> {
        let scratch = Rules::make_scratch(board);
        let mut moves = Vec::new();
        Rules::list_moves(board, &scratch, &mut moves);
        moves.retain(|&m| Rules::is_legal_move(board, &scratch, m));
        return moves;
    }

    #[test]
    fn twenty_legal_moves_in_the_initial_position() {
        let board = Board::initial();
        assert_eq!(legal_moves(&board).len(), 20);
    }

    #[test]
    fn kiwipete_has_48_legal_moves() {
        // well known perft position
        let board = Board::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq -",
        )
        .unwrap();
        assert_eq!(legal_moves(&board).len(), 48);
    }

    fn perft(board: &mut Board, depth: i32) -> u64 {
        if depth == 0 {
            return 1;
        }
        let scratch = Rules::make_scratch(board);
        let mut moves = Vec::new();
        Rules::list_moves(board, &scratch, &mut moves);
        let mut nodes = 0;
        for &m in moves.iter() {
            let mi = board.make(m);
            let after = Rules::make_scratch(board);
            if !Rules::is_king_under_attack(board, &after, !board.turn) {
                nodes += perft(board, depth - 1);
            }
            board.undo(m, &mi);
        }
        return nodes;
    }

    #[test]
    fn perft_initial_matches_known_counts() {
        let mut board = Board::initial();
        assert_eq!(perft(&mut board, 1), 20);
        assert_eq!(perft(&mut board, 2), 400);
        assert_eq!(perft(&mut board, 3), 8902);
    }

    #[test]
    fn perft_counts_castles_and_en_passant() {
        // every move kind appears within two plies here
        let mut board = Board::from_fen(
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq -",
        )
        .unwrap();
        assert_eq!(perft(&mut board, 2), 2039);
    }

    #[test]
    fn scholars_mate_is_mate() {
        let board = Board::from_fen(
            "r1bqkb1r/pppp1Qpp/2n2n2/4p3/2B1P3/8/PPPP1PPP/RNB1K1NR b KQkq -",
        )
        .unwrap();
        let scratch = Rules::make_scratch(&board);
        assert!(Rules::is_check(&board, &scratch));
        assert!(Rules::is_mate(&board, &scratch));
        assert_eq!(Rules::result(&board, &scratch), GameResult::WhiteWon);
        assert!(legal_moves(&board).is_empty());
    }

    #[test]
    fn stalemate_reports_draw_through_result_only() {
        let board = Board::from_fen("k7/8/1Q6/8/8/8/8/7K b - -").unwrap();
        let scratch = Rules::make_scratch(&board);
        assert!(!Rules::is_check(&board, &scratch));
        assert!(legal_moves(&board).is_empty());
        assert_eq!(Rules::result(&board, &scratch), GameResult::Draw);
        assert!(!Rules::is_draw_without_stalemate(&board));
    }

    #[test]
    fn insufficient_material_draws() {
        // spec scenario S4
        for fen in [
            "k7/8/K7/8/8/8/8/8 b - - 0 42",
            "k7/8/KN6/8/8/8/8/8 b - -",
            "k7/8/KB6/8/8/8/8/8 b - -",
        ] {
            let board = Board::from_fen(fen).unwrap();
            assert!(Rules::is_draw_without_stalemate(&board), "{}", fen);
            assert_eq!(Rules::result_slow(&board), GameResult::Draw, "{}", fen);
        }
        // knight vs knight is not covered by the rule
        let board = Board::from_fen("kn6/8/KN6/8/8/8/8/8 b - -").unwrap();
        assert!(!Rules::is_draw_without_stalemate(&board));
        // neither is a rook ending
        let board = Board::from_fen("kr6/8/8/8/K7/8/8/7R b - -").unwrap();
        assert!(!Rules::is_draw_without_stalemate(&board));
    }

    #[test]
    fn threefold_repetition_draw() {
        // spec scenario S6
        let mut board = Board::initial();
        for s in [
            "g1f3", "g8f6", "f3g1", "f6g8", "g1f3", "g8f6", "f3g1", "f6g8",
        ] {
            board.make(s.parse::<Move>().unwrap());
        }
        assert!(board.repeated());
        assert!(Rules::is_draw_without_stalemate(&board));
        assert_eq!(Rules::result_slow(&board), GameResult::Draw);
    }

    #[test]
    fn castle_gating() {
        // rights present, path clear
        let board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq -").unwrap();
        let moves = legal_moves(&board);
        assert!(moves.contains(&"e1g1".parse::<Move>().unwrap()));
        assert!(moves.contains(&"e1c1".parse::<Move>().unwrap()));

        // a rook guards the king-side through square
        let board = Board::from_fen("r3k2r/8/8/8/8/8/5r2/R3K2R w KQkq -").unwrap();
        let moves = legal_moves(&board);
        assert!(!moves.contains(&"e1g1".parse::<Move>().unwrap()));
        // queen side is unaffected by the f-file rook
        assert!(moves.contains(&"e1c1".parse::<Move>().unwrap()));

        // castling out of check is not allowed
        let board = Board::from_fen("r3k2r/8/8/8/8/8/4r3/R3K2R w KQkq -").unwrap();
        let moves = legal_moves(&board);
        assert!(!moves.contains(&"e1g1".parse::<Move>().unwrap()));
        assert!(!moves.contains(&"e1c1".parse::<Move>().unwrap()));

        // no rights, no castle
        let board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w - -").unwrap();
        let moves = legal_moves(&board);
        assert!(!moves.contains(&"e1g1".parse::<Move>().unwrap()));
    }

    #[test]
    fn pinned_piece_cannot_move() {
        let board = Board::from_fen("4k3/8/8/8/7b/8/5P2/4K3 w - -").unwrap();
        let scratch = Rules::make_scratch(&board);
        // f2 pawn is pinned against the king
        assert!(!Rules::is_legal_move(
            &board,
            &scratch,
            "f2f3".parse::<Move>().unwrap()
        ));
        assert!(Rules::is_legal_move(
            &board,
            &scratch,
            "e1d2".parse::<Move>().unwrap()
        ));
    }

    #[test]
    fn pretty_move_basics() {
        let board = Board::initial();
        assert_eq!(
            Rules::pretty_move(&board, "e2e4".parse().unwrap()),
            "e4"
        );
        assert_eq!(
            Rules::pretty_move(&board, "g1f3".parse().unwrap()),
            "Nf3"
        );
    }

    #[test]
    fn pretty_move_disambiguation() {
        // two knights can reach d3; file disambiguation applies
        let board = Board::from_fen("4k3/8/8/8/8/8/1N3N2/4K3 w - -").unwrap();
        let m = "b2d3".parse::<Move>().unwrap();
        let s = Rules::pretty_move(&board, m);
        assert_eq!(s, "Nbd3");

        // two rooks on one file; rank disambiguation applies
        let board = Board::from_fen("4k3/8/8/7R/8/8/8/4K2R w - -").unwrap();
        let m = "h5h3".parse::<Move>().unwrap();
        assert_eq!(Rules::pretty_move(&board, m), "R5h3");
    }

    #[test]
    fn pretty_move_capture_check_and_castle() {
        let board = Board::from_fen("4k3/8/8/3p4/4N3/8/8/4K2R w K -").unwrap();
        assert_eq!(
            Rules::pretty_move(&board, "e4d5".parse().unwrap()),
            "Nxd5"
        );
        assert_eq!(Rules::pretty_move(&board, "e1g1".parse().unwrap()), "O-O");

        let board = Board::from_fen("k7/8/1K6/8/8/8/7Q/8 w - -").unwrap();
        let s = Rules::pretty_move(&board, "h2h8".parse().unwrap());
        assert_eq!(s, "Qh8#");
    }

    #[test]
    fn parse_pretty_round_trip_on_legal_moves() {
        for fen in [
            INITIAL_TEST_FEN,
            "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq -",
            "4k3/P7/8/8/8/8/8/4K3 w - -",
        ] {
            let board = Board::from_fen(fen).unwrap();
            for m in legal_moves(&board) {
                let pretty = Rules::pretty_move(&board, m);
                let parsed = Rules::parse_pretty_move(&board, &pretty)
                    .unwrap_or_else(|e| panic!("could not parse '{}': {}", pretty, e));
                assert_eq!(parsed, m, "pretty '{}'", pretty);
                assert_eq!(parsed.promotion(), m.promotion(), "pretty '{}'", pretty);
            }
        }
    }

    const INITIAL_TEST_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -";

    #[test]
    fn parse_pretty_tolerates_annotations() {
        let board = Board::initial();
        let m = "e2e4".parse::<Move>().unwrap();
        for s in ["e4", "e4!", "e4?", "e4!?"] {
            assert_eq!(Rules::parse_pretty_move(&board, s).unwrap(), m);
        }
        assert!(Rules::parse_pretty_move(&board, "e5").is_err());
        assert!(Rules::parse_pretty_move(&board, "").is_err());
    }

    #[test]
    fn parse_pretty_ambiguity_is_reported() {
        let board = Board::from_fen("4k3/8/8/8/8/8/1N3N2/4K3 w - -").unwrap();
        match Rules::parse_pretty_move(&board, "Nd3") {
            Err(EngineError::AmbiguousMove(_)) => {}
            other => panic!("expected ambiguity, got {:?}", other),
        }
        assert!(Rules::parse_pretty_move(&board, "Nbd3").is_ok());
    }

    #[test]
    fn parse_pretty_promotion() {
        let board = Board::from_fen("4k3/P7/8/8/8/8/8/4K3 w - -").unwrap();
        let m = Rules::parse_pretty_move(&board, "a8=Q+").unwrap();
        assert_eq!(m, "a7a8".parse::<Move>().unwrap());
        assert_eq!(m.promotion(), PieceType::Queen);
        let m = Rules::parse_pretty_move(&board, "a8=N").unwrap();
        assert_eq!(m.promotion(), PieceType::Knight);
    }
}
