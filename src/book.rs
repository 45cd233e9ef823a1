use crate::moves::Move;
use crate::score::Score;

/// A known-position record from an external opening lookup.  The
/// evaluation is from White's point of view; the search flips it for the
/// side to move.
#[derive(Clone, Debug)]
pub struct BookEntry {
    pub best_move: Move,
    pub pv: Vec<Move>,
    pub eval: Score,
}

/// External opening-theory lookup.  The engine core has no storage of its
/// own; it only consults whatever implementation the caller provides.
pub trait OpeningBook: Send + Sync {
    fn lookup(&self, fen: &str) -> Option<BookEntry>;
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::collections::HashMap;

    /// In-memory book for tests.
    pub struct MapBook {
        pub entries: HashMap<String, BookEntry>,
    }

    impl OpeningBook for MapBook {
        fn lookup(&self, fen: &str) -> Option<BookEntry> {
            return self.entries.get(fen).cloned();
        }
    }
}
