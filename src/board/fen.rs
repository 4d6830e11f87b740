//! FEN input/output and long-algebraic move parsing.

use super::error::{FenError, MoveParseError};
use super::state::Board;
use super::types::{castle_bit, Color, Move, Piece, Square};
use super::variant::Variant;

/// FEN of the standard starting position.
pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

impl Board {
    /// Parse a FEN string as a standard-rules position.
    pub fn from_fen(fen: &str) -> Result<Board, FenError> {
        Board::from_fen_variant(fen, Variant::Standard)
    }

    /// Parse a FEN string under the given rule set.
    ///
    /// At least four fields are required; the counters default to `0 1`.
    /// A bracketed holdings suffix on the placement field (crazyhouse-style
    /// FENs) is accepted and ignored. Shredder-style castling letters
    /// (`AHah`) record the rook's home file for Fischer-Random positions.
    pub fn from_fen_variant(fen: &str, variant: Variant) -> Result<Board, FenError> {
        let parts: Vec<&str> = fen.split_whitespace().collect();
        if parts.len() < 4 {
            return Err(FenError::TooFewParts { found: parts.len() });
        }

        let mut board = Board::empty(variant);

        let mut placement = parts[0];
        if let Some(bracket) = placement.find('[') {
            placement = &placement[..bracket];
        }
        let ranks: Vec<&str> = placement.split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::InvalidRank { rank: ranks.len() });
        }
        for (i, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - i;
            let mut file = 0usize;
            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10) {
                    file += skip as usize;
                } else {
                    let piece = Piece::from_char(c).ok_or(FenError::InvalidPiece { char: c })?;
                    if file >= 8 {
                        return Err(FenError::TooManyFiles {
                            rank,
                            files: file + 1,
                        });
                    }
                    let color = if c.is_ascii_uppercase() {
                        Color::White
                    } else {
                        Color::Black
                    };
                    board.set_piece(Square(rank, file), color, piece);
                    file += 1;
                }
            }
            if file > 8 {
                return Err(FenError::TooManyFiles { rank, files: file });
            }
        }

        if variant.has_check() {
            for color in Color::BOTH {
                let kings = board.pieces[color.index()][Piece::King.index()].popcount();
                if kings != 1 {
                    return Err(FenError::BadKingCount {
                        color: if color == Color::White { "White" } else { "Black" },
                        count: kings,
                    });
                }
            }
        }

        board.white_to_move = match parts[1] {
            "w" => true,
            "b" => false,
            other => {
                return Err(FenError::InvalidSideToMove {
                    found: other.to_string(),
                })
            }
        };

        if parts[2] != "-" {
            for c in parts[2].chars() {
                match c {
                    'K' => board.castling_rights |= castle_bit(Color::White, true),
                    'Q' => board.castling_rights |= castle_bit(Color::White, false),
                    'k' => board.castling_rights |= castle_bit(Color::Black, true),
                    'q' => board.castling_rights |= castle_bit(Color::Black, false),
                    'A'..='H' | 'a'..='h' => {
                        let color = if c.is_ascii_uppercase() {
                            Color::White
                        } else {
                            Color::Black
                        };
                        let file = c.to_ascii_lowercase() as usize - 'a' as usize;
                        let king = board
                            .king_square(color)
                            .ok_or(FenError::InvalidCastling { char: c })?;
                        let kingside = file > king.file();
                        board.rook_home[color.index()][usize::from(!kingside)] = file;
                        board.castling_rights |= castle_bit(color, kingside);
                    }
                    _ => return Err(FenError::InvalidCastling { char: c }),
                }
            }
        }

        if parts[3] != "-" {
            let ep: Square = parts[3].parse().map_err(|_| FenError::InvalidEnPassant {
                found: parts[3].to_string(),
            })?;
            board.en_passant_target = Some(ep);
        }

        board.halfmove_clock = parts
            .get(4)
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);
        let fullmove: u32 = parts
            .get(5)
            .and_then(|s| s.parse().ok())
            .unwrap_or(1)
            .max(1);
        board.ply = (fullmove - 1) * 2 + u32::from(!board.white_to_move);

        board.hash = board.compute_hash();
        board.repetition_counts.increment(board.hash);
        Ok(board)
    }

    /// Serialize the position as a six-field FEN string.
    #[must_use]
    pub fn to_fen(&self) -> String {
        let mut fen = String::new();
        for rank in (0..8).rev() {
            let mut empties = 0u32;
            for file in 0..8 {
                match self.piece_at(Square(rank, file)) {
                    Some((color, piece)) => {
                        if empties > 0 {
                            fen.push(char::from_digit(empties, 10).unwrap_or('0'));
                            empties = 0;
                        }
                        fen.push(piece.to_fen_char(color));
                    }
                    None => empties += 1,
                }
            }
            if empties > 0 {
                fen.push(char::from_digit(empties, 10).unwrap_or('0'));
            }
            if rank > 0 {
                fen.push('/');
            }
        }

        fen.push(' ');
        fen.push(if self.white_to_move { 'w' } else { 'b' });
        fen.push(' ');
        fen.push_str(&self.castling_rights_string());
        fen.push(' ');
        match self.en_passant_target {
            Some(sq) => fen.push_str(&sq.to_string()),
            None => fen.push('-'),
        }
        fen.push_str(&format!(" {} {}", self.halfmove_clock, self.ply / 2 + 1));
        fen
    }

    /// Parse a long-algebraic move string (`e2e4`, `e7e8q`) against this
    /// position. The flags (capture, en passant, castling, double push)
    /// are inferred from the board; a promotion without a piece letter
    /// defaults to queen.
    pub fn parse_move(&self, notation: &str) -> Result<Move, MoveParseError> {
        if !notation.is_ascii() {
            return Err(MoveParseError::InvalidSquare {
                notation: notation.to_string(),
            });
        }
        let len = notation.len();
        if !(4..=5).contains(&len) {
            return Err(MoveParseError::InvalidLength { len });
        }

        let parse_sq = |s: &str| -> Result<Square, MoveParseError> {
            s.parse().map_err(|_| MoveParseError::InvalidSquare {
                notation: notation.to_string(),
            })
        };
        let from = parse_sq(&notation[0..2])?;
        let to = parse_sq(&notation[2..4])?;

        let promo = if len == 5 {
            let c = notation.as_bytes()[4] as char;
            match Piece::from_char(c) {
                Some(p @ (Piece::Knight | Piece::Bishop | Piece::Rook | Piece::Queen)) => Some(p),
                _ => return Err(MoveParseError::InvalidPromotion { char: c }),
            }
        } else {
            None
        };

        let illegal = || MoveParseError::IllegalMove {
            notation: notation.to_string(),
        };
        let (_, piece) = self.piece_at(from).ok_or_else(illegal)?;
        let target_is_enemy = self
            .piece_at(to)
            .map(|(color, _)| color == self.side_to_move().opponent())
            .unwrap_or(false);

        let mv = if piece == Piece::King && from.rank() == to.rank() && from.file().abs_diff(to.file()) == 2
        {
            if to.file() > from.file() {
                Move::castle_kingside(from, to)
            } else {
                Move::castle_queenside(from, to)
            }
        } else if piece == Piece::Pawn {
            if to.rank() == self.side_to_move().pawn_promotion_rank() {
                Move::promotion(from, to, promo.unwrap_or(Piece::Queen), target_is_enemy)
            } else if from.file() != to.file() && !target_is_enemy {
                Move::en_passant(from, to)
            } else if from.rank().abs_diff(to.rank()) == 2 {
                Move::double_pawn_push(from, to)
            } else if target_is_enemy {
                Move::capture(from, to)
            } else {
                Move::quiet(from, to)
            }
        } else if target_is_enemy {
            Move::capture(from, to)
        } else {
            Move::quiet(from, to)
        };

        if self.validate_move(mv) {
            Ok(mv)
        } else {
            Err(illegal())
        }
    }
}
