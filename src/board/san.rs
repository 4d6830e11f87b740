//! Standard Algebraic Notation.

use super::error::SanError;
use super::state::Board;
use super::types::{Move, Piece, Square};

impl Board {
    /// Render a legal move in SAN, with minimal disambiguation and a
    /// `+`/`#` suffix where the move gives check or mate.
    #[must_use]
    pub fn move_to_san(&mut self, mv: Move) -> String {
        let mut san = if mv.is_castle_kingside() {
            "O-O".to_string()
        } else if mv.is_castle_queenside() {
            "O-O-O".to_string()
        } else {
            let piece = self
                .piece_at(mv.from())
                .map(|(_, piece)| piece)
                .unwrap_or(Piece::Pawn);
            let mut s = String::new();
            if piece == Piece::Pawn {
                if mv.is_capture() {
                    s.push((mv.from().file() as u8 + b'a') as char);
                }
            } else {
                s.push(piece.to_char().to_ascii_uppercase());
                s.push_str(&self.disambiguation(mv, piece));
            }
            if mv.is_capture() {
                s.push('x');
            }
            s.push_str(&mv.to().to_string());
            if let Some(promo) = mv.promoted_piece() {
                s.push('=');
                s.push(promo.to_char().to_ascii_uppercase());
            }
            s
        };

        self.apply_move(mv);
        if self.is_checked() {
            san.push(if self.legal_moves().is_empty() {
                '#'
            } else {
                '+'
            });
        }
        self.pop_move();
        san
    }

    /// Minimal origin qualifier when another piece of the same type can
    /// reach the same square: file if it distinguishes, else rank, else
    /// both.
    fn disambiguation(&mut self, mv: Move, piece: Piece) -> String {
        let mut same_file = false;
        let mut same_rank = false;
        let mut any_other = false;
        for &other in self.legal_moves().iter() {
            if other == mv || other.to() != mv.to() || other.is_castling() {
                continue;
            }
            if self.piece_at(other.from()).map(|(_, p)| p) != Some(piece) {
                continue;
            }
            any_other = true;
            if other.from().file() == mv.from().file() {
                same_file = true;
            }
            if other.from().rank() == mv.from().rank() {
                same_rank = true;
            }
        }
        if !any_other {
            return String::new();
        }
        let from = mv.from();
        if !same_file {
            ((from.file() as u8 + b'a') as char).to_string()
        } else if !same_rank {
            (from.rank() + 1).to_string()
        } else {
            from.to_string()
        }
    }

    /// Parse a SAN string against this position. Check, mate, and
    /// annotation suffixes are ignored.
    pub fn parse_san(&mut self, san: &str) -> Result<Move, SanError> {
        let core: &str = san.trim_end_matches(['+', '#', '!', '?']);
        if core.is_empty() {
            return Err(SanError::Empty);
        }

        let legal = self.legal_moves();

        if core == "O-O" || core == "0-0" {
            return legal
                .iter()
                .copied()
                .find(|m| m.is_castle_kingside())
                .ok_or_else(|| SanError::NoMatchingMove {
                    san: san.to_string(),
                });
        }
        if core == "O-O-O" || core == "0-0-0" {
            return legal
                .iter()
                .copied()
                .find(|m| m.is_castle_queenside())
                .ok_or_else(|| SanError::NoMatchingMove {
                    san: san.to_string(),
                });
        }

        let mut chars: Vec<char> = core.chars().collect();

        let promo = if chars.len() >= 2 && chars[chars.len() - 2] == '=' {
            let c = chars[chars.len() - 1];
            let piece = match Piece::from_char(c.to_ascii_lowercase()) {
                Some(p @ (Piece::Knight | Piece::Bishop | Piece::Rook | Piece::Queen)) => p,
                _ => return Err(SanError::InvalidPromotion { char: c }),
            };
            chars.truncate(chars.len() - 2);
            Some(piece)
        } else {
            None
        };

        if chars.len() < 2 {
            return Err(SanError::InvalidSquare {
                notation: san.to_string(),
            });
        }
        let target: String = chars.split_off(chars.len() - 2).into_iter().collect();
        let to: Square = target.parse().map_err(|_| SanError::InvalidSquare {
            notation: san.to_string(),
        })?;

        let piece = if chars.first().is_some_and(char::is_ascii_uppercase) {
            let c = chars.remove(0);
            Piece::from_char(c.to_ascii_lowercase()).ok_or(SanError::InvalidPiece { char: c })?
        } else {
            Piece::Pawn
        };

        let is_capture = if chars.last() == Some(&'x') {
            chars.pop();
            true
        } else {
            false
        };

        let mut from_file = None;
        let mut from_rank = None;
        for c in chars {
            match c {
                'a'..='h' => from_file = Some(c as usize - 'a' as usize),
                '1'..='8' => from_rank = Some(c as usize - '1' as usize),
                _ => {
                    return Err(SanError::InvalidSquare {
                        notation: san.to_string(),
                    })
                }
            }
        }

        let mut matched: Option<Move> = None;
        for &mv in legal.iter() {
            if mv.to() != to || mv.is_castling() || mv.is_drop() {
                continue;
            }
            if self.piece_at(mv.from()).map(|(_, p)| p) != Some(piece) {
                continue;
            }
            if is_capture && !mv.is_capture() {
                continue;
            }
            if mv.promoted_piece() != promo {
                continue;
            }
            if from_file.is_some_and(|f| mv.from().file() != f) {
                continue;
            }
            if from_rank.is_some_and(|r| mv.from().rank() != r) {
                continue;
            }
            if matched.is_some() {
                return Err(SanError::AmbiguousMove {
                    san: san.to_string(),
                });
            }
            matched = Some(mv);
        }
        matched.ok_or_else(|| SanError::NoMatchingMove {
            san: san.to_string(),
        })
    }
}
