//! Attack queries: which squares a side attacks, and check detection.

use super::attack_tables::{slider_attacks, DISTANCE, KING_ATTACKS, KNIGHT_ATTACKS, PAWN_ATTACKS};
use super::state::Board;
use super::types::{Bitboard, Color, Piece, Square};

impl Board {
    /// Is `sq` attacked by any piece of `by`, with an explicit occupancy?
    ///
    /// The occupancy override lets check-evasion generation trace slider
    /// rays through the square the king is vacating.
    pub(crate) fn is_square_attacked_with_occ(
        &self,
        sq: Square,
        by: Color,
        occupancy: u64,
    ) -> bool {
        let idx = sq.as_index();
        let them = &self.pieces[by.index()];

        // A pawn of `by` attacks sq iff it stands on a square a pawn of the
        // other color on sq would attack.
        if PAWN_ATTACKS[by.opponent().index()][idx] & them[Piece::Pawn.index()].0 != 0 {
            return true;
        }
        if KNIGHT_ATTACKS[idx] & them[Piece::Knight.index()].0 != 0 {
            return true;
        }
        if KING_ATTACKS[idx] & them[Piece::King.index()].0 != 0 {
            return true;
        }

        let diag = them[Piece::Bishop.index()].0 | them[Piece::Queen.index()].0;
        if diag != 0 && slider_attacks(idx, occupancy, true) & diag != 0 {
            return true;
        }
        let straight = them[Piece::Rook.index()].0 | them[Piece::Queen.index()].0;
        if straight != 0 && slider_attacks(idx, occupancy, false) & straight != 0 {
            return true;
        }

        false
    }

    /// Is `sq` attacked by any piece of `by` on the current occupancy?
    #[must_use]
    pub fn is_square_attacked(&self, sq: Square, by: Color) -> bool {
        self.is_square_attacked_with_occ(sq, by, self.all_occupied.0)
    }

    /// All pieces of `by` that attack `sq` on the current occupancy.
    #[must_use]
    pub fn attacks_to(&self, sq: Square, by: Color) -> Bitboard {
        let idx = sq.as_index();
        let occ = self.all_occupied.0;
        let them = &self.pieces[by.index()];

        let mut attackers =
            PAWN_ATTACKS[by.opponent().index()][idx] & them[Piece::Pawn.index()].0;
        attackers |= KNIGHT_ATTACKS[idx] & them[Piece::Knight.index()].0;
        attackers |= KING_ATTACKS[idx] & them[Piece::King.index()].0;

        let diag = them[Piece::Bishop.index()].0 | them[Piece::Queen.index()].0;
        if diag != 0 {
            attackers |= slider_attacks(idx, occ, true) & diag;
        }
        let straight = them[Piece::Rook.index()].0 | them[Piece::Queen.index()].0;
        if straight != 0 {
            attackers |= slider_attacks(idx, occ, false) & straight;
        }

        Bitboard(attackers)
    }

    /// Is `color`'s king in check?
    ///
    /// Always false in variants without a check concept, when the king is
    /// off the board, and in atomic chess while the kings touch.
    #[must_use]
    pub fn is_color_checked(&self, color: Color) -> bool {
        if !self.variant.has_check() {
            return false;
        }
        let Some(king_sq) = self.king_square(color) else {
            return false;
        };
        if self.variant.explodes_on_capture() {
            if let Some(enemy_king) = self.king_square(color.opponent()) {
                if DISTANCE[king_sq.as_index()][enemy_king.as_index()] <= 1 {
                    return false;
                }
            }
        }
        self.is_square_attacked(king_sq, color.opponent())
    }

    /// Is the side to move in check?
    #[must_use]
    pub fn is_checked(&self) -> bool {
        self.is_color_checked(self.side_to_move())
    }

    /// Is the side that just moved in check? After `apply_move` this tells
    /// whether the move was legal.
    #[must_use]
    pub fn op_is_checked(&self) -> bool {
        self.is_color_checked(self.side_to_move().opponent())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::variant::Variant;

    #[test]
    fn test_start_position_attacks() {
        let board = Board::new();
        // e4 not attacked by black; f6 attacked by black pieces
        assert!(!board.is_square_attacked(Square(3, 4), Color::Black));
        assert!(board.is_square_attacked(Square(5, 5), Color::Black));
        // e2 defended by white
        assert!(board.is_square_attacked(Square(1, 4), Color::White));
        assert!(!board.is_checked());
    }

    #[test]
    fn test_open_game_kings_stay_safe() {
        let mut board = Board::new();
        let e4 = board.parse_move("e2e4").unwrap();
        board.apply_move(e4);
        let e5 = board.parse_move("e7e5").unwrap();
        board.apply_move(e5);
        // 1. e4 e5 leaves both kings unattacked
        assert!(!board.is_square_attacked(Square(0, 4), Color::Black));
        assert!(!board.is_square_attacked(Square(7, 4), Color::White));
    }

    #[test]
    fn test_slider_check_through_occupancy() {
        let board = Board::from_fen("4k3/8/8/8/8/8/8/4KR2 w - - 0 1").unwrap();
        // Rook on f1 does not check the king on e8
        assert!(!board.is_color_checked(Color::Black));
        let board = Board::from_fen("4k3/8/8/8/8/8/8/K3R3 b - - 0 1").unwrap();
        assert!(board.is_checked());
        // Blocker stops the check
        let board = Board::from_fen("4k3/8/8/4n3/8/8/8/K3R3 b - - 0 1").unwrap();
        assert!(!board.is_checked());
    }

    #[test]
    fn test_knight_and_pawn_checks() {
        let board = Board::from_fen("4k3/8/3N4/8/8/8/8/4K3 b - - 0 1").unwrap();
        assert!(board.is_checked());
        let board = Board::from_fen("4k3/3P4/8/8/8/8/8/4K3 b - - 0 1").unwrap();
        assert!(board.is_checked());
        // Pawn does not check straight ahead
        let board = Board::from_fen("4k3/8/4P3/8/8/8/8/4K3 b - - 0 1").unwrap();
        assert!(!board.is_checked());
    }

    #[test]
    fn test_attacks_to_counts_all_attackers() {
        let board = Board::from_fen("4k3/8/8/3r4/8/3N4/8/3RK3 w - - 0 1").unwrap();
        // The knight on d3 blocks the d1 rook, and does not attack d5 itself
        let attackers = board.attacks_to(Square(4, 3), Color::White);
        assert_eq!(attackers.popcount(), 0);
        // The black rook on d5 attacks the knight
        let attackers = board.attacks_to(Square(2, 3), Color::Black);
        assert_eq!(attackers.popcount(), 1);
    }

    #[test]
    fn test_suicide_never_checked() {
        let board =
            Board::from_fen_variant("4k3/8/8/8/8/8/8/K3R3 b - - 0 1", Variant::Suicide).unwrap();
        assert!(!board.is_checked());
    }

    #[test]
    fn test_atomic_touching_kings_no_check() {
        let board =
            Board::from_fen_variant("8/8/8/3kK3/8/8/8/3R4 b - - 0 1", Variant::Atomic).unwrap();
        // The rook attacks d5, but the kings touch, so there is no check
        assert!(!board.is_checked());
        let board = Board::from_fen_variant("8/8/8/3k4/8/4K3/8/3R4 b - - 0 1", Variant::Atomic)
            .unwrap();
        // Separated kings restore the normal rule
        assert!(board.is_checked());
    }
}
