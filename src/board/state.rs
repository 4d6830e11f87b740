//! Board state: packed bitboard position with undo history.

use std::collections::HashMap;

use super::types::{
    bit_for_square, castle_bit, Bitboard, Color, Move, Piece, Square, ALL_CASTLING_RIGHTS,
};
use super::variant::Variant;
use crate::zobrist::ZOBRIST;

/// Undo record pushed by `apply_move`, popped by `pop_move`.
#[derive(Clone, Debug)]
pub struct UnmakeInfo {
    pub(crate) mv: Move,
    /// The piece that moved, as it stood on the origin square (a promotion
    /// records the pawn here).
    pub(crate) moved: (Color, Piece),
    /// Captured piece and the square it stood on (differs from the move's
    /// destination for en passant).
    pub(crate) captured: Option<(Square, Color, Piece)>,
    /// Adjacent pieces removed by an atomic explosion (the captured piece
    /// and the mover are tracked separately).
    pub(crate) exploded: Vec<(Square, Color, Piece)>,
    /// True when the mover itself left the board (atomic capture).
    pub(crate) mover_removed: bool,
    pub(crate) previous_en_passant: Option<Square>,
    pub(crate) previous_castling_rights: u8,
    pub(crate) previous_halfmove_clock: u32,
    pub(crate) previous_hash: u64,
}

/// Position-hash occurrence counts for threefold-repetition detection.
#[derive(Clone, Debug, Default)]
pub(crate) struct RepetitionTable {
    counts: HashMap<u64, u32>,
}

impl RepetitionTable {
    pub(crate) fn new() -> Self {
        RepetitionTable {
            counts: HashMap::new(),
        }
    }

    pub(crate) fn get(&self, hash: u64) -> u32 {
        self.counts.get(&hash).copied().unwrap_or(0)
    }

    pub(crate) fn increment(&mut self, hash: u64) {
        *self.counts.entry(hash).or_insert(0) += 1;
    }

    pub(crate) fn decrement(&mut self, hash: u64) {
        if let Some(count) = self.counts.get_mut(&hash) {
            *count -= 1;
            if *count == 0 {
                self.counts.remove(&hash);
            }
        }
    }
}

/// A mutable chess position.
///
/// Per color and piece type one bitboard, plus derived occupancy
/// aggregates, side to move, castling rights, en passant target, counters,
/// and an incrementally-maintained zobrist hash. Moves are applied in place
/// and reversed through an explicit undo stack; clone the board for
/// speculative work on another thread.
#[derive(Clone, Debug)]
pub struct Board {
    pub(crate) pieces: [[Bitboard; 6]; 2],
    pub(crate) occupied: [Bitboard; 2],
    pub(crate) all_occupied: Bitboard,
    pub(crate) white_to_move: bool,
    pub(crate) en_passant_target: Option<Square>,
    pub(crate) castling_rights: u8,
    pub(crate) hash: u64,
    pub(crate) halfmove_clock: u32,
    /// Halfmoves played since the game started.
    pub(crate) ply: u32,
    /// Rook starting files per (color, side: 0=kingside, 1=queenside);
    /// relaxed from h/a by Fischer-Random FENs.
    pub(crate) rook_home: [[usize; 2]; 2],
    pub(crate) history: Vec<UnmakeInfo>,
    pub(crate) repetition_counts: RepetitionTable,
    pub(crate) variant: Variant,
}

impl Board {
    /// The standard initial position.
    #[must_use]
    pub fn new() -> Self {
        let mut board = Board::empty(Variant::Standard);
        let back_rank = [
            Piece::Rook,
            Piece::Knight,
            Piece::Bishop,
            Piece::Queen,
            Piece::King,
            Piece::Bishop,
            Piece::Knight,
            Piece::Rook,
        ];
        for (file, piece) in back_rank.iter().enumerate() {
            board.set_piece(Square(0, file), Color::White, *piece);
            board.set_piece(Square(7, file), Color::Black, *piece);
            board.set_piece(Square(1, file), Color::White, Piece::Pawn);
            board.set_piece(Square(6, file), Color::Black, Piece::Pawn);
        }
        board.castling_rights = ALL_CASTLING_RIGHTS;
        board.hash = board.compute_hash();
        board.repetition_counts.increment(board.hash);
        board
    }

    pub(crate) fn empty(variant: Variant) -> Self {
        Board {
            pieces: [[Bitboard::EMPTY; 6]; 2],
            occupied: [Bitboard::EMPTY; 2],
            all_occupied: Bitboard::EMPTY,
            white_to_move: true,
            en_passant_target: None,
            castling_rights: 0,
            hash: 0,
            halfmove_clock: 0,
            ply: 0,
            rook_home: [[7, 0], [7, 0]],
            history: Vec::new(),
            repetition_counts: RepetitionTable::new(),
            variant,
        }
    }

    #[must_use]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    #[must_use]
    pub fn white_to_move(&self) -> bool {
        self.white_to_move
    }

    #[must_use]
    pub fn side_to_move(&self) -> Color {
        if self.white_to_move {
            Color::White
        } else {
            Color::Black
        }
    }

    #[must_use]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    /// Halfmoves played since the game started.
    #[must_use]
    pub fn ply(&self) -> u32 {
        self.ply
    }

    #[must_use]
    pub fn variant(&self) -> Variant {
        self.variant
    }

    #[must_use]
    pub fn en_passant_target(&self) -> Option<Square> {
        self.en_passant_target
    }

    pub(crate) fn has_castling_right(&self, color: Color, kingside: bool) -> bool {
        self.castling_rights & castle_bit(color, kingside) != 0
    }

    pub(crate) fn set_piece(&mut self, sq: Square, color: Color, piece: Piece) {
        let bit = bit_for_square(sq);
        self.pieces[color.index()][piece.index()].0 |= bit;
        self.occupied[color.index()].0 |= bit;
        self.all_occupied.0 |= bit;
    }

    pub(crate) fn remove_piece(&mut self, sq: Square, color: Color, piece: Piece) {
        let bit = bit_for_square(sq);
        self.pieces[color.index()][piece.index()].0 &= !bit;
        self.occupied[color.index()].0 &= !bit;
        self.all_occupied.0 &= !bit;
    }

    pub(crate) fn piece_at(&self, sq: Square) -> Option<(Color, Piece)> {
        let bit = bit_for_square(sq);
        if self.all_occupied.0 & bit == 0 {
            return None;
        }
        let color = if self.occupied[0].0 & bit != 0 {
            Color::White
        } else {
            Color::Black
        };
        for p_idx in 0..6 {
            if self.pieces[color.index()][p_idx].0 & bit != 0 {
                return Some((color, Piece::from_index(p_idx)));
            }
        }
        None
    }

    pub(crate) fn is_empty_square(&self, sq: Square) -> bool {
        self.all_occupied.0 & bit_for_square(sq) == 0
    }

    /// Get just the piece type on a square (without color).
    #[must_use]
    pub fn piece_on(&self, sq: Square) -> Option<Piece> {
        self.piece_at(sq).map(|(_, piece)| piece)
    }

    /// Get just the color of the piece on a square.
    #[must_use]
    pub fn color_on(&self, sq: Square) -> Option<Color> {
        self.piece_at(sq).map(|(color, _)| color)
    }

    /// The king's square, if that color has a king on the board (it may
    /// not, in suicide chess or after an atomic explosion).
    #[must_use]
    pub fn king_square(&self, color: Color) -> Option<Square> {
        let kings = self.pieces[color.index()][Piece::King.index()];
        if kings.is_empty() {
            None
        } else {
            Some(Square::from_index(kings.first_bit()))
        }
    }

    /// Recompute the zobrist hash from the full board state. The
    /// incremental hash in `apply_move`/`pop_move` must always agree with
    /// this.
    #[must_use]
    pub(crate) fn compute_hash(&self) -> u64 {
        let mut hash: u64 = 0;

        for color in Color::BOTH {
            for piece in Piece::ALL {
                for sq_idx in self.pieces[color.index()][piece.index()].iter() {
                    hash ^= ZOBRIST.piece_keys[piece.index()][color.index()][sq_idx];
                }
            }
        }

        if !self.white_to_move {
            hash ^= ZOBRIST.black_to_move_key;
        }

        for bit in 0..4 {
            if self.castling_rights & (1 << bit) != 0 {
                hash ^= ZOBRIST.castling_keys[bit];
            }
        }

        if let Some(ep) = self.en_passant_target {
            hash ^= ZOBRIST.en_passant_keys[ep.file()];
        }

        hash
    }

    /// Fifty-move rule or threefold repetition.
    #[must_use]
    pub fn is_draw(&self) -> bool {
        if self.halfmove_clock >= 100 {
            return true;
        }
        self.repetition_counts.get(self.hash) >= 3
    }

    /// Draw by rule or by insufficient mating material.
    #[must_use]
    pub fn is_theoretical_draw(&self) -> bool {
        self.is_draw() || (self.variant == Variant::Standard && self.is_insufficient_material())
    }

    fn is_insufficient_material(&self) -> bool {
        let white = Color::White.index();
        let black = Color::Black.index();

        let pawns =
            self.pieces[white][Piece::Pawn.index()].0 | self.pieces[black][Piece::Pawn.index()].0;
        let rooks =
            self.pieces[white][Piece::Rook.index()].0 | self.pieces[black][Piece::Rook.index()].0;
        let queens =
            self.pieces[white][Piece::Queen.index()].0 | self.pieces[black][Piece::Queen.index()].0;

        if pawns != 0 || rooks != 0 || queens != 0 {
            return false;
        }

        let knights = Bitboard(
            self.pieces[white][Piece::Knight.index()].0
                | self.pieces[black][Piece::Knight.index()].0,
        );
        let bishops = Bitboard(
            self.pieces[white][Piece::Bishop.index()].0
                | self.pieces[black][Piece::Bishop.index()].0,
        );

        let minors = knights.popcount() + bishops.popcount();
        if minors <= 1 {
            return true;
        }

        if knights.is_empty() && bishops.popcount() == 2 {
            return bishops_all_same_color(bishops.0);
        }

        false
    }

    /// Castling rights still set for this position, as a FEN-style string
    /// fragment (for debugging and FEN output).
    /// Castling field for FEN output. A rook away from its classical home
    /// file (Fischer Random) is written as its Shredder-style file letter
    /// so the round trip keeps the rook's location.
    pub(crate) fn castling_rights_string(&self) -> String {
        let mut s = String::new();
        for color in Color::BOTH {
            for (slot, classic, letter) in [(0usize, 7usize, 'K'), (1, 0, 'Q')] {
                if self.castling_rights & castle_bit(color, slot == 0) == 0 {
                    continue;
                }
                let file = self.rook_home[color.index()][slot];
                let c = if file == classic {
                    letter
                } else {
                    (b'A' + file as u8) as char
                };
                s.push(if color == Color::White {
                    c
                } else {
                    c.to_ascii_lowercase()
                });
            }
        }
        if s.is_empty() {
            s.push('-');
        }
        s
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::new()
    }
}

fn bishops_all_same_color(bishops: u64) -> bool {
    const LIGHT_SQUARES: u64 = 0x55AA55AA55AA55AA;
    const DARK_SQUARES: u64 = 0xAA55AA55AA55AA55;
    (bishops & LIGHT_SQUARES == 0) || (bishops & DARK_SQUARES == 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_position_counts() {
        let board = Board::new();
        assert_eq!(board.all_occupied.popcount(), 32);
        assert_eq!(board.occupied[0].popcount(), 16);
        assert_eq!(board.occupied[1].popcount(), 16);
        assert_eq!(
            board.pieces[0][Piece::Pawn.index()].popcount(),
            8
        );
        assert!(board.white_to_move());
        assert_eq!(board.castling_rights, ALL_CASTLING_RIGHTS);
    }

    #[test]
    fn test_bitboard_invariants() {
        let board = Board::new();
        for color in Color::BOTH {
            let mut union = 0u64;
            for piece in Piece::ALL {
                let bb = board.pieces[color.index()][piece.index()].0;
                // Piece bitboards never overlap
                assert_eq!(union & bb, 0);
                union |= bb;
            }
            assert_eq!(union, board.occupied[color.index()].0);
        }
        assert_eq!(
            board.all_occupied.0,
            board.occupied[0].0 | board.occupied[1].0
        );
    }

    #[test]
    fn test_one_king_per_side() {
        let board = Board::new();
        assert_eq!(board.pieces[0][Piece::King.index()].popcount(), 1);
        assert_eq!(board.king_square(Color::White), Some(Square(0, 4)));
        assert_eq!(board.king_square(Color::Black), Some(Square(7, 4)));
    }

    #[test]
    fn test_piece_at() {
        let board = Board::new();
        assert_eq!(
            board.piece_at(Square(0, 4)),
            Some((Color::White, Piece::King))
        );
        assert_eq!(
            board.piece_at(Square(7, 3)),
            Some((Color::Black, Piece::Queen))
        );
        assert_eq!(board.piece_at(Square(4, 4)), None);
    }

    #[test]
    fn test_hash_nonzero_and_stable() {
        let a = Board::new();
        let b = Board::new();
        assert_ne!(a.hash(), 0);
        assert_eq!(a.hash(), b.hash());
        assert_eq!(a.hash(), a.compute_hash());
    }

    #[test]
    fn test_insufficient_material() {
        use crate::board::Board;
        // King vs king
        let board = Board::from_fen("8/8/8/4k3/8/8/8/4K3 w - - 0 1").unwrap();
        assert!(board.is_theoretical_draw());
        // King+bishop vs king
        let board = Board::from_fen("8/8/8/4k3/8/8/8/3BK3 w - - 0 1").unwrap();
        assert!(board.is_theoretical_draw());
        // King+pawn is not insufficient
        let board = Board::from_fen("8/8/8/4k3/8/8/4P3/4K3 w - - 0 1").unwrap();
        assert!(!board.is_theoretical_draw());
    }
}
