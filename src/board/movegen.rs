//! Move generation.
//!
//! `gen_all_moves` and `gen_captures` produce pseudo-legal moves: correct
//! piece movement, but the mover's king may be left in check.
//! `gen_check_evasions` is the narrow generator used when the side to move
//! is already in check. `legal_moves` filters either through make/unmake
//! and applies variant rules (mandatory captures, explosion legality).

use super::attack_tables::{slider_attacks, BETWEEN, KING_ATTACKS, KNIGHT_ATTACKS, PAWN_ATTACKS};
use super::state::Board;
use super::types::{bit_for_square, pop_lsb, Bitboard, Move, MoveList, Piece, Square};

impl Board {
    /// All pseudo-legal moves for the side to move.
    #[must_use]
    pub fn gen_all_moves(&self) -> MoveList {
        let mut list = MoveList::new();
        self.gen_pawn_moves(&mut list, false);
        self.gen_piece_moves(&mut list, false);
        if self.variant.allows_castling() {
            self.gen_castles(&mut list);
        }
        list
    }

    /// Pseudo-legal captures only (including en passant and capturing
    /// promotions). Used by quiescence search.
    #[must_use]
    pub fn gen_captures(&self) -> MoveList {
        let mut list = MoveList::new();
        self.gen_pawn_moves(&mut list, true);
        self.gen_piece_moves(&mut list, true);
        list
    }

    fn gen_pawn_moves(&self, list: &mut MoveList, only_captures: bool) {
        let us = self.side_to_move();
        let them = us.opponent();
        let dir = us.pawn_direction();
        let promo_rank = us.pawn_promotion_rank();
        let start_rank = us.pawn_start_rank();
        let enemy_occ = self.occupied[them.index()].0;

        let mut pawns = self.pieces[us.index()][Piece::Pawn.index()];
        while !pawns.is_empty() {
            let from_idx = pop_lsb(&mut pawns);
            let from = Square::from_index(from_idx);
            // Pawns never stand on their promotion rank
            let next_rank = (from.rank() as isize + dir) as usize;

            let mut caps = Bitboard(PAWN_ATTACKS[us.index()][from_idx] & enemy_occ);
            while !caps.is_empty() {
                let to = Square::from_index(pop_lsb(&mut caps));
                if next_rank == promo_rank {
                    for &piece in self.variant.promotion_pieces() {
                        list.push(Move::promotion(from, to, piece, true));
                    }
                } else {
                    list.push(Move::capture(from, to));
                }
            }

            if let Some(ep) = self.en_passant_target {
                if PAWN_ATTACKS[us.index()][from_idx] & bit_for_square(ep) != 0 {
                    list.push(Move::en_passant(from, ep));
                }
            }

            if only_captures {
                continue;
            }

            let to = Square(next_rank, from.file());
            if self.is_empty_square(to) {
                if next_rank == promo_rank {
                    for &piece in self.variant.promotion_pieces() {
                        list.push(Move::promotion(from, to, piece, false));
                    }
                } else {
                    list.push(Move::quiet(from, to));
                    if from.rank() == start_rank {
                        let two = Square((next_rank as isize + dir) as usize, from.file());
                        if self.is_empty_square(two) {
                            list.push(Move::double_pawn_push(from, two));
                        }
                    }
                }
            }
        }
    }

    fn gen_piece_moves(&self, list: &mut MoveList, only_captures: bool) {
        let us = self.side_to_move();
        let them = us.opponent();
        let own_occ = self.occupied[us.index()].0;
        let enemy_occ = self.occupied[them.index()].0;
        let all_occ = self.all_occupied.0;

        let push_targets = |list: &mut MoveList, from: Square, mut targets: Bitboard| {
            while !targets.is_empty() {
                let to = Square::from_index(pop_lsb(&mut targets));
                if bit_for_square(to) & enemy_occ != 0 {
                    list.push(Move::capture(from, to));
                } else {
                    list.push(Move::quiet(from, to));
                }
            }
        };

        for piece in [Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen, Piece::King] {
            let mut movers = self.pieces[us.index()][piece.index()];
            while !movers.is_empty() {
                let from_idx = pop_lsb(&mut movers);
                let from = Square::from_index(from_idx);
                let mut attacks = match piece {
                    Piece::Knight => KNIGHT_ATTACKS[from_idx],
                    Piece::King => KING_ATTACKS[from_idx],
                    Piece::Bishop => slider_attacks(from_idx, all_occ, true),
                    Piece::Rook => slider_attacks(from_idx, all_occ, false),
                    _ => {
                        slider_attacks(from_idx, all_occ, true)
                            | slider_attacks(from_idx, all_occ, false)
                    }
                };
                attacks &= !own_occ;
                if piece == Piece::King && !self.variant.king_may_capture() {
                    attacks &= !enemy_occ;
                }
                if only_captures {
                    attacks &= enemy_occ;
                }
                push_targets(list, from, Bitboard(attacks));
            }
        }
    }

    /// Castling moves for the side to move. Checks rights, empty paths for
    /// both king and rook, and that the king never crosses an attacked
    /// square. Home squares come from the board (relaxed under
    /// Fischer-Random), targets are always the g/c and f/d files.
    pub(crate) fn gen_castles(&self, list: &mut MoveList) {
        let us = self.side_to_move();
        let them = us.opponent();
        let back = us.back_rank();

        let Some(king_sq) = self.king_square(us) else {
            return;
        };
        if king_sq.rank() != back {
            return;
        }

        for kingside in [true, false] {
            if !self.has_castling_right(us, kingside) {
                continue;
            }
            let (side_idx, king_file, rook_file) = if kingside { (0, 6, 5) } else { (1, 2, 3) };
            let rook_from = Square(back, self.rook_home[us.index()][side_idx]);
            if self.piece_at(rook_from) != Some((us, Piece::Rook)) {
                continue;
            }
            let king_to = Square(back, king_file);
            let rook_to = Square(back, rook_file);

            let king_bit = bit_for_square(king_sq);
            let rook_bit = bit_for_square(rook_from);
            let occ_without = self.all_occupied.0 & !king_bit & !rook_bit;

            let path = BETWEEN[king_sq.as_index()][king_to.as_index()]
                | bit_for_square(king_to)
                | BETWEEN[rook_from.as_index()][rook_to.as_index()]
                | bit_for_square(rook_to);
            if path & occ_without != 0 {
                continue;
            }

            // The rook cannot shield the king's path from attack
            let attack_occ = self.all_occupied.0 & !rook_bit;
            let mut king_path =
                Bitboard(BETWEEN[king_sq.as_index()][king_to.as_index()] | king_bit
                    | bit_for_square(king_to));
            let mut safe = true;
            while !king_path.is_empty() {
                let sq = Square::from_index(pop_lsb(&mut king_path));
                if self.is_square_attacked_with_occ(sq, them, attack_occ) {
                    safe = false;
                    break;
                }
            }
            if !safe {
                continue;
            }

            list.push(if kingside {
                Move::castle_kingside(king_sq, king_to)
            } else {
                Move::castle_queenside(king_sq, king_to)
            });
        }
    }

    /// Candidate moves when the side to move is in check: king steps to
    /// unattacked squares, captures of a lone checker, and interpositions
    /// against a lone sliding checker. Under double check only king moves
    /// are produced. Pins are not resolved here; `legal_moves` filters.
    #[must_use]
    pub fn gen_check_evasions(&self) -> MoveList {
        let mut list = MoveList::new();
        let us = self.side_to_move();
        let them = us.opponent();
        let Some(king_sq) = self.king_square(us) else {
            return list;
        };
        let king_idx = king_sq.as_index();
        let own_occ = self.occupied[us.index()].0;
        let enemy_occ = self.occupied[them.index()].0;

        // King steps, with the king removed from the occupancy so a
        // checking slider's ray extends through the vacated square.
        let occ_without_king = self.all_occupied.0 & !bit_for_square(king_sq);
        let mut steps = KING_ATTACKS[king_idx] & !own_occ;
        if !self.variant.king_may_capture() {
            steps &= !enemy_occ;
        }
        let mut steps = Bitboard(steps);
        while !steps.is_empty() {
            let to = Square::from_index(pop_lsb(&mut steps));
            if self.is_square_attacked_with_occ(to, them, occ_without_king) {
                continue;
            }
            if bit_for_square(to) & enemy_occ != 0 {
                list.push(Move::capture(king_sq, to));
            } else {
                list.push(Move::quiet(king_sq, to));
            }
        }

        let checkers = self.attacks_to(king_sq, them);
        if checkers.popcount() != 1 {
            // Double check: only the king can move
            return list;
        }
        let checker_idx = checkers.first_bit();
        let checker_sq = Square::from_index(checker_idx);
        let checker_piece = self
            .piece_at(checker_sq)
            .map(|(_, piece)| piece)
            .unwrap_or(Piece::Pawn);

        // Capture the checker with a non-king piece
        let mut capturers = Bitboard(
            self.attacks_to(checker_sq, us).0 & !self.pieces[us.index()][Piece::King.index()].0,
        );
        let promo_rank = us.pawn_promotion_rank();
        while !capturers.is_empty() {
            let from = Square::from_index(pop_lsb(&mut capturers));
            let is_pawn = bit_for_square(from) & self.pieces[us.index()][Piece::Pawn.index()].0 != 0;
            if is_pawn && checker_sq.rank() == promo_rank {
                for &piece in self.variant.promotion_pieces() {
                    list.push(Move::promotion(from, checker_sq, piece, true));
                }
            } else {
                list.push(Move::capture(from, checker_sq));
            }
        }

        // En passant capture of a double-pushed checking pawn
        if let Some(ep) = self.en_passant_target {
            let dir = us.pawn_direction();
            let victim_sq = Square((ep.rank() as isize - dir) as usize, ep.file());
            if victim_sq == checker_sq {
                let mut pawns = Bitboard(
                    PAWN_ATTACKS[them.index()][ep.as_index()]
                        & self.pieces[us.index()][Piece::Pawn.index()].0,
                );
                while !pawns.is_empty() {
                    let from = Square::from_index(pop_lsb(&mut pawns));
                    list.push(Move::en_passant(from, ep));
                }
            }
        }

        // Interpose on a sliding checker's ray
        if checker_piece.is_slider() {
            let mut blocks = Bitboard(BETWEEN[king_idx][checker_idx]);
            while !blocks.is_empty() {
                let block_sq = Square::from_index(pop_lsb(&mut blocks));
                self.gen_moves_to_empty(&mut list, block_sq);
            }
        }

        list
    }

    /// Non-king moves that land a piece on the empty square `to`.
    fn gen_moves_to_empty(&self, list: &mut MoveList, to: Square) {
        let us = self.side_to_move();
        let to_idx = to.as_index();
        let all_occ = self.all_occupied.0;
        let mine = &self.pieces[us.index()];

        let mut knights = Bitboard(KNIGHT_ATTACKS[to_idx] & mine[Piece::Knight.index()].0);
        while !knights.is_empty() {
            let from = Square::from_index(pop_lsb(&mut knights));
            list.push(Move::quiet(from, to));
        }

        let diag = mine[Piece::Bishop.index()].0 | mine[Piece::Queen.index()].0;
        let straight = mine[Piece::Rook.index()].0 | mine[Piece::Queen.index()].0;
        let mut sliders = Bitboard(
            (slider_attacks(to_idx, all_occ, true) & diag)
                | (slider_attacks(to_idx, all_occ, false) & straight),
        );
        while !sliders.is_empty() {
            let from = Square::from_index(pop_lsb(&mut sliders));
            list.push(Move::quiet(from, to));
        }

        // Pawn pushes onto the square
        let dir = us.pawn_direction();
        let behind_rank = to.rank() as isize - dir;
        if !(0..8).contains(&behind_rank) {
            return;
        }
        let behind = Square(behind_rank as usize, to.file());
        if bit_for_square(behind) & mine[Piece::Pawn.index()].0 != 0 {
            if to.rank() == us.pawn_promotion_rank() {
                for &piece in self.variant.promotion_pieces() {
                    list.push(Move::promotion(behind, to, piece, false));
                }
            } else {
                list.push(Move::quiet(behind, to));
            }
        } else if self.is_empty_square(behind) {
            let double_rank = behind_rank - dir;
            if (0..8).contains(&double_rank) {
                let start = Square(double_rank as usize, to.file());
                if start.rank() == us.pawn_start_rank()
                    && bit_for_square(start) & mine[Piece::Pawn.index()].0 != 0
                {
                    list.push(Move::double_pawn_push(start, to));
                }
            }
        }
    }

    /// Does applying `mv` leave the mover in a lost-king state? Applies
    /// and reverts the move.
    pub(crate) fn leaves_mover_safe(&mut self, mv: Move) -> bool {
        let mover = self.side_to_move();
        self.apply_move(mv);
        let safe = if !self.variant.has_check() {
            true
        } else if self.variant.explodes_on_capture() {
            if self.king_square(mover).is_none() {
                false
            } else if self.king_square(mover.opponent()).is_none() {
                // Exploding the enemy king wins outright
                true
            } else {
                !self.is_color_checked(mover)
            }
        } else {
            !self.is_color_checked(mover)
        };
        self.pop_move();
        safe
    }

    /// All fully legal moves for the side to move, with variant rules
    /// applied (mandatory captures in suicide chess, explosion legality in
    /// atomic).
    #[must_use]
    pub fn legal_moves(&mut self) -> MoveList {
        let pseudo = if self.is_checked() {
            self.gen_check_evasions()
        } else {
            self.gen_all_moves()
        };

        let mut legal = MoveList::new();
        for &mv in pseudo.iter() {
            if self.leaves_mover_safe(mv) {
                legal.push(mv);
            }
        }

        if self.variant.captures_mandatory() && legal.iter().any(|mv| mv.is_capture()) {
            let mut captures = MoveList::new();
            for &mv in legal.iter() {
                if mv.is_capture() {
                    captures.push(mv);
                }
            }
            return captures;
        }

        legal
    }

    /// Checkmate or stalemate: the side to move has no legal moves.
    #[must_use]
    pub fn is_game_over(&mut self) -> bool {
        self.legal_moves().is_empty()
    }

    /// Count leaf nodes of the legal move tree to `depth`.
    #[must_use]
    pub fn perft(&mut self, depth: u32) -> u64 {
        if depth == 0 {
            return 1;
        }
        let moves = self.legal_moves();
        if depth == 1 {
            return moves.len() as u64;
        }
        let mut nodes = 0;
        for &mv in moves.iter() {
            self.apply_move(mv);
            nodes += self.perft(depth - 1);
            self.pop_move();
        }
        nodes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::variant::Variant;

    #[test]
    fn test_start_position_has_twenty_moves() {
        let mut board = Board::new();
        assert_eq!(board.gen_all_moves().len(), 20);
        assert_eq!(board.legal_moves().len(), 20);
    }

    #[test]
    fn test_movegen_deterministic() {
        let board = Board::new();
        let a: Vec<Move> = board.gen_all_moves().iter().copied().collect();
        let b: Vec<Move> = board.gen_all_moves().iter().copied().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_gen_captures_subset() {
        let board =
            Board::from_fen("rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2")
                .unwrap();
        let captures = board.gen_captures();
        assert!(captures.iter().all(|mv| mv.is_capture()));
        let all = board.gen_all_moves();
        assert!(captures.iter().all(|mv| all.contains(*mv)));
        // exd5 is the only capture
        assert_eq!(captures.len(), 1);
    }

    #[test]
    fn test_castle_generated_when_path_clear() {
        let mut board = Board::from_fen("8/8/8/8/8/8/6k1/4K2R w K - 0 1").unwrap();
        let castle = Move::castle_kingside(Square(0, 4), Square(0, 6));
        // g1 is covered by the black king on g2, so castling is not available
        assert!(!board.legal_moves().contains(castle));

        let mut board = Board::from_fen("8/8/8/8/8/6k1/8/4K2R w K - 0 1").unwrap();
        assert!(board.legal_moves().contains(castle));
    }

    #[test]
    fn test_castle_blocked_by_piece() {
        let board = Board::from_fen("4k3/8/8/8/8/8/8/4KB1R w K - 0 1").unwrap();
        let mut list = MoveList::new();
        board.gen_castles(&mut list);
        assert!(list.is_empty());
    }

    #[test]
    fn test_castle_requires_right() {
        let board = Board::from_fen("4k3/8/8/8/8/8/8/4K2R w - - 0 1").unwrap();
        let mut list = MoveList::new();
        board.gen_castles(&mut list);
        assert!(list.is_empty());
    }

    #[test]
    fn test_no_castling_out_of_check() {
        let board = Board::from_fen("4k3/8/8/8/8/8/4r3/4K2R w K - 0 1").unwrap();
        let mut list = MoveList::new();
        board.gen_castles(&mut list);
        assert!(list.is_empty());
    }

    #[test]
    fn test_evasions_match_filtered_all_moves() {
        // Rook check with capture, block, and king-step answers
        let fens = [
            "4k3/8/8/8/4r3/8/3P4/4K3 w - - 0 1",
            "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3",
            "4k3/8/8/b7/8/8/8/1N2K3 w - - 0 1",
        ];
        for fen in fens {
            let mut board = Board::from_fen(fen).unwrap();
            assert!(board.is_checked());
            let mut from_evasions: Vec<u16> = board
                .gen_check_evasions()
                .iter()
                .copied()
                .filter(|&mv| board.leaves_mover_safe(mv))
                .map(Move::as_u16)
                .collect();
            let mut from_all: Vec<u16> = board
                .gen_all_moves()
                .iter()
                .copied()
                .filter(|&mv| board.leaves_mover_safe(mv))
                .map(Move::as_u16)
                .collect();
            from_evasions.sort_unstable();
            from_evasions.dedup();
            from_all.sort_unstable();
            assert_eq!(from_evasions, from_all, "evasion mismatch in {fen}");
        }
    }

    #[test]
    fn test_double_check_king_moves_only() {
        let board = Board::from_fen("4k3/8/8/b7/8/8/8/3NK2r w - - 0 1").unwrap();
        // Bishop a5 and rook h1 both give check; the d1 knight can't help
        assert!(board.is_checked());
        let evasions = board.gen_check_evasions();
        assert!(!evasions.is_empty());
        assert!(evasions.iter().all(|mv| mv.from() == Square(0, 4)));
    }

    #[test]
    fn test_pinned_piece_filtered_by_legal_moves() {
        let mut board = Board::from_fen("4k3/8/8/8/8/4n3/8/4RK2 b - - 0 1").unwrap();
        // Knight on e3 shields the black king from the rook on e1
        let legal = board.legal_moves();
        assert!(legal.iter().all(|mv| mv.from() != Square(2, 4)));
    }

    #[test]
    fn test_stalemate_no_moves() {
        let mut board = Board::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        assert!(!board.is_checked());
        assert!(board.is_game_over());
    }

    #[test]
    fn test_suicide_captures_mandatory() {
        let mut board = Board::from_fen_variant(
            "8/8/8/3p4/4P3/8/8/8 w - - 0 1",
            Variant::Suicide,
        )
        .unwrap();
        let legal = board.legal_moves();
        assert!(legal.iter().all(|mv| mv.is_capture()));
        assert_eq!(legal.len(), 1);
    }

    #[test]
    fn test_atomic_king_cannot_capture() {
        let mut board =
            Board::from_fen_variant("4k3/8/8/8/8/8/3p4/4K3 w - - 0 1", Variant::Atomic).unwrap();
        let legal = board.legal_moves();
        assert!(legal
            .iter()
            .all(|mv| !(mv.from() == Square(0, 4) && mv.is_capture())));
    }

    #[test]
    fn test_perft_shallow() {
        let mut board = Board::new();
        assert_eq!(board.perft(1), 20);
        assert_eq!(board.perft(2), 400);
        assert_eq!(board.perft(3), 8_902);
    }
}
