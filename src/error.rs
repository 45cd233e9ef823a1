use thiserror::Error;

/// Errors surfaced across the engine boundary.  Cancellation is not an
/// error: it is a dedicated signal inside the search (see `search.rs`) that
/// never leaks out of the crate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("invalid FEN: {0}")]
    InvalidFen(String),

    #[error("invalid move: {0}")]
    InvalidMove(String),

    #[error("ambiguous move: {0}")]
    AmbiguousMove(String),

    #[error("no matching move: {0}")]
    NoMatchingMove(String),

    #[error("illegal move: {0}")]
    IllegalMove(String),

    #[error("search depth must be between 1 and 512, got {0}")]
    SearchDepthOutOfRange(i32),

    #[error("pv count must be at least 1, got {0}")]
    PvCountOutOfRange(i32),

    #[error("engine produced no move")]
    EngineProducedNoMove,

    #[error("board history is full")]
    HistoryFull,
}
