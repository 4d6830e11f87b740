//! Move ordering.
//!
//! Hash move first, then captures by MVV-LVA, then killer moves, then
//! quiet moves by history counters. The sort is stable, so equal scores
//! keep generation order and search stays deterministic.

use crate::board::types::{Move, MoveList, Piece, ScoredMoveList};
use crate::board::Board;

use super::SearchContext;

const HASH_MOVE_SCORE: i32 = 1 << 24;
const CAPTURE_BASE: i32 = 1 << 20;
const KILLER_BASE: i32 = 1 << 16;

pub(crate) fn order_moves(
    ctx: &SearchContext,
    board: &Board,
    moves: &MoveList,
    hash_move: Move,
    ply: usize,
) -> ScoredMoveList {
    let mut scored = ScoredMoveList::new();
    for &mv in moves.iter() {
        let score = if mv == hash_move && mv != Move::null() {
            HASH_MOVE_SCORE
        } else if mv.is_capture() {
            CAPTURE_BASE + mvv_lva(board, mv) + promotion_bonus(mv)
        } else if mv.is_promotion() {
            CAPTURE_BASE + promotion_bonus(mv)
        } else {
            let killer = ctx.killers.bonus(ply, mv);
            if killer > 0 {
                KILLER_BASE + killer
            } else {
                ctx.history.bonus(mv)
            }
        };
        scored.push(mv, score);
    }
    scored.sort_by_score_desc();
    scored
}

/// Most valuable victim, least valuable attacker.
fn mvv_lva(board: &Board, mv: Move) -> i32 {
    let victim = if mv.is_en_passant() {
        Piece::Pawn
    } else {
        board.piece_on(mv.to()).unwrap_or(Piece::Pawn)
    };
    let attacker = board.piece_on(mv.from()).unwrap_or(Piece::Pawn);
    victim.value() * 10 - attacker.value() / 10
}

fn promotion_bonus(mv: Move) -> i32 {
    mv.promoted_piece().map_or(0, Piece::value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::types::Square;

    #[test]
    fn test_hash_move_first() {
        let board = Board::new();
        let ctx = SearchContext::new();
        let moves = board.gen_all_moves();
        let hash_move = moves.get(7).unwrap();
        let ordered = order_moves(&ctx, &board, &moves, hash_move, 0);
        assert_eq!(ordered.iter().next().unwrap().mv, hash_move);
    }

    #[test]
    fn test_captures_before_quiets() {
        let board =
            Board::from_fen("rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2")
                .unwrap();
        let ctx = SearchContext::new();
        let moves = board.gen_all_moves();
        let ordered = order_moves(&ctx, &board, &moves, Move::null(), 0);
        assert!(ordered.iter().next().unwrap().mv.is_capture());
    }

    #[test]
    fn test_mvv_lva_prefers_big_victims() {
        // Pawn can take queen or knight
        let board = Board::from_fen("4k3/8/8/2q1n3/3P4/8/8/4K3 w - - 0 1").unwrap();
        let ctx = SearchContext::new();
        let moves = board.gen_all_moves();
        let ordered = order_moves(&ctx, &board, &moves, Move::null(), 0);
        let first = ordered.iter().next().unwrap().mv;
        assert_eq!(first.to(), Square(4, 2));
    }

    #[test]
    fn test_killers_before_history() {
        let board = Board::new();
        let mut ctx = SearchContext::new();
        let killer = Move::quiet(Square(1, 0), Square(2, 0));
        let historic = Move::quiet(Square(1, 7), Square(2, 7));
        ctx.killers.record(3, killer);
        ctx.history.record(historic, 9);
        let moves = board.gen_all_moves();
        let ordered = order_moves(&ctx, &board, &moves, Move::null(), 3);
        let order: Vec<Move> = ordered.iter().map(|s| s.mv).collect();
        let killer_pos = order.iter().position(|&m| m == killer).unwrap();
        let historic_pos = order.iter().position(|&m| m == historic).unwrap();
        assert!(killer_pos < historic_pos);
    }
}
