use crate::place::Place;
use crate::util::{Color, PieceType};

// Key tables are generated by build.rs from a fixed-seed PRNG so that the
// same position always hashes to the same value, build after build.
include!(concat!(env!("OUT_DIR"), "/zobrist_tables.rs"));

#[inline]
pub fn piece_key(place: Place, piece_type: PieceType, owner: Color) -> u64 {
    return PIECE_KEYS[place.index()][piece_type.index()][owner as usize];
}

#[inline]
pub fn passant_key(place: Place) -> u64 {
    return PASSANT_KEYS[place.index()];
}

#[inline]
pub fn turn_key() -> u64 {
    return TURN_KEY;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_distinct_and_nonzero() {
        let a = piece_key(Place::of_int(0), PieceType::Pawn, Color::White);
        let b = piece_key(Place::of_int(0), PieceType::Pawn, Color::Black);
        let c = piece_key(Place::of_int(1), PieceType::Pawn, Color::White);
        assert_ne!(a, 0);
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_ne!(turn_key(), 0);
        assert_ne!(passant_key(Place::of_int(20)), passant_key(Place::of_int(21)));
    }

    #[test]
    fn empty_square_hashes_to_nothing() {
        assert_eq!(piece_key(Place::of_int(12), PieceType::Clear, Color::White), 0);
    }
}
