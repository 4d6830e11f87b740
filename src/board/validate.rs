//! Cheap pseudo-legality validation for externally supplied moves.
//!
//! Transposition-table moves and user input are checked against the
//! current position without generating the full move list. A move that
//! validates still needs the make/unmake safety test for full legality.

use super::attack_tables::{slider_attacks, KING_ATTACKS, KNIGHT_ATTACKS, PAWN_ATTACKS};
use super::state::Board;
use super::types::{bit_for_square, Move, MoveList, Piece};

impl Board {
    /// Is `mv` pseudo-legal in this position? Piece on the origin,
    /// movement pattern, clear path, and flag consistency are checked;
    /// leaving the own king in check is not.
    #[must_use]
    pub fn validate_move(&self, mv: Move) -> bool {
        if mv == Move::null() {
            return false;
        }
        if mv.is_drop() && !self.variant.allows_drops() {
            return false;
        }

        let us = self.side_to_move();
        if mv.is_castling() {
            if !self.variant.allows_castling() {
                return false;
            }
            let mut castles = MoveList::new();
            self.gen_castles(&mut castles);
            return castles.contains(mv);
        }

        let from = mv.from();
        let to = mv.to();
        let Some((color, piece)) = self.piece_at(from) else {
            return false;
        };
        if color != us {
            return false;
        }

        let from_idx = from.as_index();
        let to_bit = bit_for_square(to);
        if self.occupied[us.index()].0 & to_bit != 0 {
            return false;
        }
        // En passant targets an empty square; any other capture flag must
        // agree with the destination's occupancy.
        let target_is_enemy = self.occupied[us.opponent().index()].0 & to_bit != 0;
        if !mv.is_en_passant() && mv.is_capture() != target_is_enemy {
            return false;
        }

        if piece != Piece::Pawn
            && (mv.is_en_passant() || mv.is_double_pawn_push() || mv.is_promotion())
        {
            return false;
        }

        match piece {
            Piece::Pawn => self.validate_pawn_move(mv, target_is_enemy),
            Piece::Knight => KNIGHT_ATTACKS[from_idx] & to_bit != 0,
            Piece::King => {
                if target_is_enemy && !self.variant.king_may_capture() {
                    return false;
                }
                KING_ATTACKS[from_idx] & to_bit != 0
            }
            Piece::Bishop => slider_attacks(from_idx, self.all_occupied.0, true) & to_bit != 0,
            Piece::Rook => slider_attacks(from_idx, self.all_occupied.0, false) & to_bit != 0,
            Piece::Queen => {
                (slider_attacks(from_idx, self.all_occupied.0, true)
                    | slider_attacks(from_idx, self.all_occupied.0, false))
                    & to_bit
                    != 0
            }
        }
    }

    fn validate_pawn_move(&self, mv: Move, target_is_enemy: bool) -> bool {
        let us = self.side_to_move();
        let from = mv.from();
        let to = mv.to();
        let dir = us.pawn_direction();

        // Promotion flag must agree with the destination rank
        if mv.is_promotion() != (to.rank() == us.pawn_promotion_rank()) {
            return false;
        }

        if mv.is_en_passant() {
            return self.en_passant_target == Some(to)
                && PAWN_ATTACKS[us.index()][from.as_index()] & bit_for_square(to) != 0;
        }

        if mv.is_capture() {
            return target_is_enemy
                && PAWN_ATTACKS[us.index()][from.as_index()] & bit_for_square(to) != 0;
        }

        if to.file() != from.file() || !self.is_empty_square(to) {
            return false;
        }
        let step = to.rank() as isize - from.rank() as isize;
        if mv.is_double_pawn_push() {
            let mid = super::types::Square((from.rank() as isize + dir) as usize, from.file());
            return from.rank() == us.pawn_start_rank() && step == 2 * dir
                && self.is_empty_square(mid);
        }
        step == dir
    }

    /// Full legality: pseudo-legal, leaves no lost king, and honors
    /// mandatory captures where the variant imposes them.
    #[must_use]
    pub fn is_legal(&mut self, mv: Move) -> bool {
        if !self.validate_move(mv) || !self.leaves_mover_safe(mv) {
            return false;
        }
        if self.variant.captures_mandatory() && !mv.is_capture() {
            return !self.legal_moves().iter().any(|m| m.is_capture());
        }
        true
    }
}
