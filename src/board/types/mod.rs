//! Core chess types.
//!
//! - `Piece` and `Color` - piece types and colors
//! - `Square` - (rank, file) board square
//! - `Bitboard` - 64-bit set of squares
//! - `Move` and `MoveList` - packed 16-bit move representation

mod bitboard;
mod moves;
mod piece;
mod square;

pub use bitboard::{Bitboard, BitboardIter};
pub use moves::{Move, MoveList};
pub use piece::{Color, Piece};
pub use square::Square;

pub(crate) use bitboard::{bit_for_square, pop_lsb};
pub(crate) use moves::{ScoredMoveList, MAX_PLY};

use piece::Color as C;

pub(crate) const CASTLE_WHITE_K: u8 = 1 << 0;
pub(crate) const CASTLE_WHITE_Q: u8 = 1 << 1;
pub(crate) const CASTLE_BLACK_K: u8 = 1 << 2;
pub(crate) const CASTLE_BLACK_Q: u8 = 1 << 3;

pub(crate) const ALL_CASTLING_RIGHTS: u8 =
    CASTLE_WHITE_K | CASTLE_WHITE_Q | CASTLE_BLACK_K | CASTLE_BLACK_Q;

#[inline]
pub(crate) const fn castle_bit(color: C, kingside: bool) -> u8 {
    match (color, kingside) {
        (C::White, true) => CASTLE_WHITE_K,
        (C::White, false) => CASTLE_WHITE_Q,
        (C::Black, true) => CASTLE_BLACK_K,
        (C::Black, false) => CASTLE_BLACK_Q,
    }
}
