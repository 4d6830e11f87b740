//! Static evaluation: material with a damping term, plus king tropism.

use super::attack_tables::DISTANCE;
use super::state::Board;
use super::types::{pop_lsb, Color, Piece};

// Tropism bonus per piece type, indexed by Chebyshev distance to the
// enemy king.
const PAWN_TROPISM: [i32; 10] = [0, 40, 20, 12, 9, 6, 4, 2, 1, 0];
const KNIGHT_TROPISM: [i32; 10] = [0, 100, 50, 35, 10, 3, 2, 2, 1, 1];
const BISHOP_TROPISM: [i32; 10] = [0, 50, 25, 15, 7, 5, 3, 2, 2, 1];
const ROOK_TROPISM: [i32; 10] = [0, 50, 40, 15, 5, 2, 1, 1, 1, 0];
const QUEEN_TROPISM: [i32; 10] = [0, 100, 60, 20, 10, 7, 5, 4, 3, 2];

fn tropism_row(piece: Piece) -> &'static [i32; 10] {
    match piece {
        Piece::Pawn => &PAWN_TROPISM,
        Piece::Knight => &KNIGHT_TROPISM,
        Piece::Bishop => &BISHOP_TROPISM,
        Piece::Rook => &ROOK_TROPISM,
        _ => &QUEEN_TROPISM,
    }
}

impl Board {
    /// Static score from the side to move's perspective, for negamax.
    #[must_use]
    pub fn evaluate(&self) -> i32 {
        let white_score = self.eval_material() + self.eval_king_tropism();
        if self.white_to_move {
            white_score
        } else {
            -white_score
        }
    }

    /// Material balance from White's perspective.
    ///
    /// The raw difference is capped at 2400 and extended with a term that
    /// grows as material comes off the board and shrinks with the number
    /// of the leading side's pawns, nudging the leader to trade pieces but
    /// keep pawns.
    fn eval_material(&self) -> i32 {
        let mut material = [0i32; 2];
        let mut pawn_count = [0i32; 2];
        for color in Color::BOTH {
            for piece in [
                Piece::Pawn,
                Piece::Knight,
                Piece::Bishop,
                Piece::Rook,
                Piece::Queen,
            ] {
                let count = self.pieces[color.index()][piece.index()].popcount() as i32;
                material[color.index()] += count * piece.value();
                if piece == Piece::Pawn {
                    pawn_count[color.index()] = count;
                }
            }
        }

        let diff = material[0] - material[1];
        if diff == 0 {
            return 0;
        }
        let leader = if diff > 0 { 0 } else { 1 };
        let advantage = diff.abs();
        let total = material[0] + material[1];
        let pawns = pawn_count[leader];
        let score =
            advantage.min(2400) + advantage * (12000 - total) * pawns / (6400 * (pawns + 1));
        if leader == 0 {
            score
        } else {
            -score
        }
    }

    /// King tropism from White's perspective: each piece earns a bonus
    /// shrinking with its Chebyshev distance to the enemy king.
    fn eval_king_tropism(&self) -> i32 {
        let mut score = 0;
        for color in Color::BOTH {
            let Some(enemy_king) = self.king_square(color.opponent()) else {
                continue;
            };
            let king_idx = enemy_king.as_index();
            let mut side = 0;
            for piece in [
                Piece::Pawn,
                Piece::Knight,
                Piece::Bishop,
                Piece::Rook,
                Piece::Queen,
            ] {
                let row = tropism_row(piece);
                let mut movers = self.pieces[color.index()][piece.index()];
                while !movers.is_empty() {
                    let sq = pop_lsb(&mut movers);
                    side += row[DISTANCE[sq][king_idx] as usize];
                }
            }
            if color == Color::White {
                score += side;
            } else {
                score -= side;
            }
        }
        score
    }
}
