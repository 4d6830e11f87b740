pub mod board;
pub mod engine;
pub mod search;
pub mod tt;
pub mod zobrist;

pub use board::types::{Bitboard, Color, Move, MoveList, Piece, Square};
pub use board::{Board, Variant, START_FEN};
pub use engine::{Engine, Strength};
pub use search::{SearchContext, SearchReport, INFINITY, MATE_VALUE};
pub use tt::TranspositionTable;
