#![allow(dead_code)]

pub mod bitboard;
pub mod board;
pub mod book;
pub mod engine;
pub mod error;
pub mod eval;
pub mod move_history;
pub mod moves;
pub mod mpv;
pub mod place;
pub mod result_info;
pub mod rules;
pub mod score;
pub mod search;
pub mod tt;
pub mod util;
pub mod zobrist;

pub use crate::board::{Board, MoveInfo};
pub use crate::book::{BookEntry, OpeningBook};
pub use crate::engine::{Engine, EngineOptions, FutureResult};
pub use crate::error::EngineError;
pub use crate::eval::{EvalConfig, EvalParams, Evaluator, Features, PlayerFeatures};
pub use crate::move_history::MoveHistory;
pub use crate::moves::Move;
pub use crate::mpv::MpvDriver;
pub use crate::place::Place;
pub use crate::result_info::SearchResultInfo;
pub use crate::rules::{EvalScratch, Rules};
pub use crate::score::Score;
pub use crate::search::SearchContext;
pub use crate::tt::TranspositionTable;
pub use crate::util::{CastleFlags, Color, GameResult, PieceType};
