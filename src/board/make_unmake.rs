//! Applying and reverting moves.
//!
//! `apply_move` mutates the position in place, pushes an undo record, and
//! maintains the zobrist hash incrementally. `pop_move` is its exact
//! inverse: after a pop the board compares equal to the pre-apply state,
//! hash included.

use super::attack_tables::KING_ATTACKS;
use super::state::{Board, UnmakeInfo};
use super::types::{castle_bit, Color, Move, Piece, Square};
use crate::zobrist::ZOBRIST;

impl Board {
    #[inline]
    fn toggle_piece_hash(&mut self, sq: Square, color: Color, piece: Piece) {
        self.hash ^= ZOBRIST.piece_keys[piece.index()][color.index()][sq.as_index()];
    }

    /// Apply a pseudo-legal move. Legality (own king left in check) is the
    /// caller's concern; see `legal_moves` and `validate_move`.
    pub fn apply_move(&mut self, mv: Move) {
        let mover = self.side_to_move();
        let previous_hash = self.hash;
        let previous_castling_rights = self.castling_rights;
        let previous_en_passant = self.en_passant_target;
        let previous_halfmove_clock = self.halfmove_clock;

        if let Some(ep) = self.en_passant_target {
            self.hash ^= ZOBRIST.en_passant_keys[ep.file()];
        }
        self.en_passant_target = None;

        let from = mv.from();
        let to = mv.to();

        let mut captured: Option<(Square, Color, Piece)> = None;
        let mut exploded: Vec<(Square, Color, Piece)> = Vec::new();
        let mut mover_removed = false;

        let moved_piece = if let Some(piece) = mv.dropped_piece() {
            piece
        } else {
            self.piece_at(from)
                .expect("apply_move called with an empty origin square")
                .1
        };

        if mv.is_castling() {
            let back = mover.back_rank();
            let kingside = mv.is_castle_kingside();
            let (side_idx, rook_to_file) = if kingside { (0, 5) } else { (1, 3) };
            let rook_from = Square(back, self.rook_home[mover.index()][side_idx]);
            let rook_to = Square(back, rook_to_file);

            // Remove both before placing either; in Fischer-Random the
            // squares can overlap.
            self.remove_piece(from, mover, Piece::King);
            self.toggle_piece_hash(from, mover, Piece::King);
            self.remove_piece(rook_from, mover, Piece::Rook);
            self.toggle_piece_hash(rook_from, mover, Piece::Rook);
            self.set_piece(to, mover, Piece::King);
            self.toggle_piece_hash(to, mover, Piece::King);
            self.set_piece(rook_to, mover, Piece::Rook);
            self.toggle_piece_hash(rook_to, mover, Piece::Rook);
        } else {
            if mv.is_en_passant() {
                let cap_sq = Square(from.rank(), to.file());
                let victim = mover.opponent();
                self.remove_piece(cap_sq, victim, Piece::Pawn);
                self.toggle_piece_hash(cap_sq, victim, Piece::Pawn);
                captured = Some((cap_sq, victim, Piece::Pawn));
            } else if mv.is_capture() {
                if let Some((cap_color, cap_piece)) = self.piece_at(to) {
                    self.remove_piece(to, cap_color, cap_piece);
                    self.toggle_piece_hash(to, cap_color, cap_piece);
                    captured = Some((to, cap_color, cap_piece));
                }
            }

            if !mv.is_drop() {
                self.remove_piece(from, mover, moved_piece);
                self.toggle_piece_hash(from, mover, moved_piece);
            }

            let placed = mv.promoted_piece().unwrap_or(moved_piece);
            self.set_piece(to, mover, placed);
            self.toggle_piece_hash(to, mover, placed);

            if captured.is_some() && self.variant.explodes_on_capture() {
                self.remove_piece(to, mover, placed);
                self.toggle_piece_hash(to, mover, placed);
                mover_removed = true;

                let mut blast = KING_ATTACKS[to.as_index()] & self.all_occupied.0;
                while blast != 0 {
                    let sq_idx = blast.trailing_zeros() as usize;
                    blast &= blast - 1;
                    let sq = Square::from_index(sq_idx);
                    if let Some((color, piece)) = self.piece_at(sq) {
                        if piece != Piece::Pawn {
                            self.remove_piece(sq, color, piece);
                            self.toggle_piece_hash(sq, color, piece);
                            exploded.push((sq, color, piece));
                        }
                    }
                }
            }

            if mv.is_double_pawn_push() {
                let ep = Square((from.rank() + to.rank()) / 2, from.file());
                self.en_passant_target = Some(ep);
                self.hash ^= ZOBRIST.en_passant_keys[ep.file()];
            }
        }

        let mut new_rights = self.castling_rights;
        if moved_piece == Piece::King && !mv.is_drop() {
            new_rights &= !(castle_bit(mover, true) | castle_bit(mover, false));
        }
        if moved_piece == Piece::Rook && !mv.is_drop() && from.rank() == mover.back_rank() {
            if from.file() == self.rook_home[mover.index()][0] {
                new_rights &= !castle_bit(mover, true);
            }
            if from.file() == self.rook_home[mover.index()][1] {
                new_rights &= !castle_bit(mover, false);
            }
        }
        for &(sq, color, piece) in captured.iter().chain(exploded.iter()) {
            match piece {
                Piece::Rook if sq.rank() == color.back_rank() => {
                    if sq.file() == self.rook_home[color.index()][0] {
                        new_rights &= !castle_bit(color, true);
                    }
                    if sq.file() == self.rook_home[color.index()][1] {
                        new_rights &= !castle_bit(color, false);
                    }
                }
                Piece::King => {
                    new_rights &= !(castle_bit(color, true) | castle_bit(color, false));
                }
                _ => {}
            }
        }
        let changed = self.castling_rights ^ new_rights;
        for bit in 0..4 {
            if changed & (1 << bit) != 0 {
                self.hash ^= ZOBRIST.castling_keys[bit];
            }
        }
        self.castling_rights = new_rights;

        if moved_piece == Piece::Pawn || captured.is_some() {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }

        self.hash ^= ZOBRIST.black_to_move_key;
        self.white_to_move = !self.white_to_move;
        self.ply += 1;

        self.repetition_counts.increment(self.hash);

        self.history.push(UnmakeInfo {
            mv,
            moved: (mover, moved_piece),
            captured,
            exploded,
            mover_removed,
            previous_en_passant,
            previous_castling_rights,
            previous_halfmove_clock,
            previous_hash,
        });
    }

    /// Revert the most recently applied move. Returns it, or `None` when
    /// the undo stack is empty.
    pub fn pop_move(&mut self) -> Option<Move> {
        let info = self.history.pop()?;
        self.repetition_counts.decrement(self.hash);
        self.white_to_move = !self.white_to_move;

        let (mover, moved_piece) = info.moved;
        let mv = info.mv;
        let from = mv.from();
        let to = mv.to();

        if mv.is_castling() {
            let back = mover.back_rank();
            let kingside = mv.is_castle_kingside();
            let (side_idx, rook_to_file) = if kingside { (0, 5) } else { (1, 3) };
            let rook_from = Square(back, self.rook_home[mover.index()][side_idx]);
            let rook_to = Square(back, rook_to_file);

            self.remove_piece(to, mover, Piece::King);
            self.remove_piece(rook_to, mover, Piece::Rook);
            self.set_piece(from, mover, Piece::King);
            self.set_piece(rook_from, mover, Piece::Rook);
        } else if mv.is_drop() {
            self.remove_piece(to, mover, moved_piece);
        } else {
            if !info.mover_removed {
                let placed = mv.promoted_piece().unwrap_or(moved_piece);
                self.remove_piece(to, mover, placed);
            }
            self.set_piece(from, mover, moved_piece);
        }

        if let Some((sq, color, piece)) = info.captured {
            self.set_piece(sq, color, piece);
        }
        for &(sq, color, piece) in &info.exploded {
            self.set_piece(sq, color, piece);
        }

        self.en_passant_target = info.previous_en_passant;
        self.castling_rights = info.previous_castling_rights;
        self.halfmove_clock = info.previous_halfmove_clock;
        self.hash = info.previous_hash;
        self.ply -= 1;

        Some(mv)
    }

    /// Number of moves on the undo stack.
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// The last applied move, if any.
    #[must_use]
    pub fn last_move(&self) -> Option<Move> {
        self.history.last().map(|info| info.mv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::variant::Variant;

    fn assert_boards_match(a: &Board, b: &Board) {
        assert_eq!(a.pieces, b.pieces);
        assert_eq!(a.occupied, b.occupied);
        assert_eq!(a.all_occupied, b.all_occupied);
        assert_eq!(a.white_to_move, b.white_to_move);
        assert_eq!(a.en_passant_target, b.en_passant_target);
        assert_eq!(a.castling_rights, b.castling_rights);
        assert_eq!(a.halfmove_clock, b.halfmove_clock);
        assert_eq!(a.hash, b.hash);
    }

    #[test]
    fn test_apply_pop_round_trip() {
        let mut board = Board::new();
        let original = board.clone();
        let mv = Move::double_pawn_push(Square(1, 4), Square(3, 4));
        board.apply_move(mv);
        assert!(!board.white_to_move());
        assert_eq!(board.en_passant_target(), Some(Square(2, 4)));
        assert_eq!(board.hash(), board.compute_hash());
        assert_eq!(board.pop_move(), Some(mv));
        assert_boards_match(&board, &original);
    }

    #[test]
    fn test_capture_round_trip() {
        let mut board =
            Board::from_fen("rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2")
                .unwrap();
        let original = board.clone();
        let mv = Move::capture(Square(3, 4), Square(4, 3)); // exd5
        board.apply_move(mv);
        assert_eq!(board.piece_at(Square(4, 3)), Some((Color::White, Piece::Pawn)));
        assert_eq!(board.halfmove_clock(), 0);
        assert_eq!(board.hash(), board.compute_hash());
        board.pop_move();
        assert_boards_match(&board, &original);
    }

    #[test]
    fn test_en_passant_round_trip() {
        let mut board =
            Board::from_fen("rnbqkbnr/ppp1pppp/8/8/3pP3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 3")
                .unwrap();
        let original = board.clone();
        let mv = Move::en_passant(Square(3, 3), Square(2, 4)); // dxe3
        board.apply_move(mv);
        // The captured pawn sits beside the origin, not on the target
        assert_eq!(board.piece_at(Square(3, 4)), None);
        assert_eq!(board.piece_at(Square(2, 4)), Some((Color::Black, Piece::Pawn)));
        assert_eq!(board.hash(), board.compute_hash());
        board.pop_move();
        assert_boards_match(&board, &original);
    }

    #[test]
    fn test_castle_round_trip() {
        let mut board = Board::from_fen("8/8/8/8/8/8/6k1/4K2R w K - 0 1").unwrap();
        let original = board.clone();
        let mv = Move::castle_kingside(Square(0, 4), Square(0, 6));
        board.apply_move(mv);
        assert_eq!(board.piece_at(Square(0, 6)), Some((Color::White, Piece::King)));
        assert_eq!(board.piece_at(Square(0, 5)), Some((Color::White, Piece::Rook)));
        assert_eq!(board.piece_at(Square(0, 4)), None);
        assert_eq!(board.piece_at(Square(0, 7)), None);
        assert!(!board.has_castling_right(Color::White, true));
        assert_eq!(board.hash(), board.compute_hash());
        board.pop_move();
        assert_boards_match(&board, &original);
    }

    #[test]
    fn test_promotion_round_trip() {
        let mut board = Board::from_fen("8/4P1k1/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        let original = board.clone();
        let mv = Move::promotion(Square(6, 4), Square(7, 4), Piece::Queen, false);
        board.apply_move(mv);
        assert_eq!(board.piece_at(Square(7, 4)), Some((Color::White, Piece::Queen)));
        assert_eq!(board.hash(), board.compute_hash());
        board.pop_move();
        assert_boards_match(&board, &original);
        assert_eq!(board.piece_at(Square(6, 4)), Some((Color::White, Piece::Pawn)));
    }

    #[test]
    fn test_rook_move_clears_castling_right() {
        let mut board = Board::from_fen("8/8/8/8/8/8/6k1/4K2R w K - 0 1").unwrap();
        board.apply_move(Move::quiet(Square(0, 7), Square(0, 6)));
        assert!(!board.has_castling_right(Color::White, true));
        board.pop_move();
        assert!(board.has_castling_right(Color::White, true));
    }

    #[test]
    fn test_capturing_rook_clears_opponent_right() {
        let mut board =
            Board::from_fen("rnbqkbnr/1ppppp1p/p5p1/8/8/1P4P1/PBPPPP1P/RN1QKBNR w KQkq - 0 1")
                .unwrap();
        board.apply_move(Move::capture(Square(1, 1), Square(7, 7))); // Bxh8
        assert!(!board.has_castling_right(Color::Black, true));
        assert!(board.has_castling_right(Color::Black, false));
        assert_eq!(board.hash(), board.compute_hash());
    }

    #[test]
    fn test_atomic_explosion() {
        let mut board = Board::from_fen_variant(
            "rnbqkb1r/pppppppp/5n2/8/4P3/3N1P2/PPPP2PP/R1BQKBNR b KQkq - 0 3",
            Variant::Atomic,
        )
        .unwrap();
        let original = board.clone();
        board.apply_move(Move::capture(Square(5, 5), Square(3, 4))); // Nxe4
        // Capturer and victim both gone
        assert_eq!(board.piece_at(Square(3, 4)), None);
        assert_eq!(board.piece_at(Square(5, 5)), None);
        // The knight on d3 stood next to the blast and explodes with it
        assert_eq!(board.piece_at(Square(2, 3)), None);
        // The pawn on f3 is just as close but pawns survive
        assert_eq!(board.piece_at(Square(2, 5)), Some((Color::White, Piece::Pawn)));
        assert_eq!(board.hash(), board.compute_hash());
        board.pop_move();
        assert_boards_match(&board, &original);
    }

    #[test]
    fn test_repetition_detection() {
        let mut board = Board::new();
        let out = [
            Move::quiet(Square(0, 6), Square(2, 5)),
            Move::quiet(Square(7, 6), Square(5, 5)),
        ];
        let back = [
            Move::quiet(Square(2, 5), Square(0, 6)),
            Move::quiet(Square(5, 5), Square(7, 6)),
        ];
        assert!(!board.is_draw());
        for _ in 0..2 {
            for mv in out {
                board.apply_move(mv);
            }
            for mv in back {
                board.apply_move(mv);
            }
        }
        // Start position has now occurred three times
        assert!(board.is_draw());
    }

    #[test]
    fn test_fifty_move_counter() {
        let mut board = Board::new();
        board.apply_move(Move::quiet(Square(0, 6), Square(2, 5)));
        assert_eq!(board.halfmove_clock(), 1);
        board.apply_move(Move::double_pawn_push(Square(6, 4), Square(4, 4)));
        assert_eq!(board.halfmove_clock(), 0);
    }
}
