//! Negamax alpha-beta with principal variation search and quiescence.

use crate::board::types::{Move, MAX_PLY};
use crate::board::Board;
use crate::tt::{Bound, ProbeResult};

use super::order::order_moves;
use super::{SearchContext, INFINITY, MATE_THRESHOLD, MATE_VALUE};

/// Mate scores are stored relative to the probing node and converted back
/// to root-relative on retrieval, so a mate found through one path scores
/// correctly when the position is reached at a different depth.
fn score_to_tt(score: i32, ply: i32) -> i32 {
    if score > MATE_THRESHOLD {
        score + ply
    } else if score < -MATE_THRESHOLD {
        score - ply
    } else {
        score
    }
}

fn score_from_tt(score: i32, ply: i32) -> i32 {
    if score > MATE_THRESHOLD {
        score - ply
    } else if score < -MATE_THRESHOLD {
        score + ply
    } else {
        score
    }
}

impl SearchContext {
    /// Search `board` to `depth`, returning the principal variation and
    /// its score from the side to move's perspective. A cancelled search
    /// unwinds with an empty line; the driver discards it.
    pub(crate) fn alpha_beta(
        &mut self,
        board: &mut Board,
        depth: i32,
        mut alpha: i32,
        beta: i32,
        ply: i32,
    ) -> (Vec<Move>, i32) {
        if !self.is_alive() {
            return (Vec::new(), 0);
        }
        self.stats.nodes += 1;

        if ply > 0 && board.is_draw() {
            return (Vec::new(), 0);
        }
        if ply as usize >= MAX_PLY {
            return (Vec::new(), board.evaluate());
        }

        let hash = board.hash();
        let mut hash_move = Move::null();
        // The root is never cut from the table so a full PV always exists
        if ply > 0 {
            match self.tt.probe(hash, depth, alpha, beta) {
                ProbeResult::Usable { score, mv } => {
                    self.stats.tt_cutoffs += 1;
                    let pv = if mv == Move::null() { Vec::new() } else { vec![mv] };
                    return (pv, score_from_tt(score, ply));
                }
                ProbeResult::MoveOnly { mv } => hash_move = mv,
                ProbeResult::Miss => {}
            }
            // An entry written by an earlier position with the same low
            // bits can carry a move that is nonsense here
            if hash_move != Move::null() && !board.validate_move(hash_move) {
                hash_move = Move::null();
            }
        }

        if depth <= 0 {
            return (Vec::new(), self.quiescence(board, alpha, beta, ply));
        }

        let moves = board.legal_moves();
        if moves.is_empty() {
            let score = if !board.variant().has_check() {
                // No moves in suicide chess wins for the side to move
                MATE_VALUE - ply
            } else if board.is_checked() {
                -(MATE_VALUE - ply)
            } else {
                0
            };
            return (Vec::new(), score);
        }

        let ordered = order_moves(self, board, &moves, hash_move, ply as usize);
        let original_alpha = alpha;
        let mut best_score = -INFINITY;
        let mut best_move = Move::null();
        let mut best_line: Vec<Move> = Vec::new();

        for (i, scored) in ordered.iter().enumerate() {
            let mv = scored.mv;
            board.apply_move(mv);
            let (line, score) = if i == 0 {
                let (line, score) = self.alpha_beta(board, depth - 1, -beta, -alpha, ply + 1);
                (line, -score)
            } else {
                // Null-window probe; re-search on an unexpected improvement
                let (line, score) =
                    self.alpha_beta(board, depth - 1, -alpha - 1, -alpha, ply + 1);
                let score = -score;
                if score > alpha && score < beta {
                    let (line, score) =
                        self.alpha_beta(board, depth - 1, -beta, -alpha, ply + 1);
                    (line, -score)
                } else {
                    (line, score)
                }
            };
            board.pop_move();

            if !self.is_alive() {
                return (Vec::new(), 0);
            }

            if score > best_score {
                best_score = score;
                best_move = mv;
                best_line.clear();
                best_line.push(mv);
                best_line.extend(line);
            }
            if score > alpha {
                alpha = score;
            }
            if alpha >= beta {
                if mv.is_quiet() {
                    self.killers.record(ply as usize, mv);
                    self.history.record(mv, depth);
                }
                break;
            }
        }

        let bound = if best_score >= beta {
            Bound::Lower
        } else if best_score <= original_alpha {
            Bound::Upper
        } else {
            Bound::Exact
        };
        self.tt
            .store(hash, depth, score_to_tt(best_score, ply), bound, best_move);

        (best_line, best_score)
    }

    /// Capture-only search below the horizon: stand pat on the static
    /// eval, then try captures until the position is quiet.
    fn quiescence(&mut self, board: &mut Board, mut alpha: i32, beta: i32, ply: i32) -> i32 {
        if !self.is_alive() {
            return 0;
        }
        self.stats.qnodes += 1;

        let stand_pat = board.evaluate();
        if ply as usize >= MAX_PLY || stand_pat >= beta {
            return stand_pat;
        }
        if stand_pat > alpha {
            alpha = stand_pat;
        }

        let captures = board.gen_captures();
        let ordered = order_moves(self, board, &captures, Move::null(), ply as usize);
        let mut best = stand_pat;
        for scored in ordered.iter() {
            let mv = scored.mv;
            if !board.leaves_mover_safe(mv) {
                continue;
            }
            board.apply_move(mv);
            let score = -self.quiescence(board, -beta, -alpha, ply + 1);
            board.pop_move();

            if score > best {
                best = score;
            }
            if score > alpha {
                alpha = score;
            }
            if alpha >= beta {
                break;
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mate_score_tt_adjustment() {
        let mate_in_3 = MATE_VALUE - 3;
        let stored = score_to_tt(mate_in_3, 2);
        assert_eq!(score_from_tt(stored, 2), mate_in_3);
        // Same position probed deeper reports a longer mate
        assert_eq!(score_from_tt(stored, 4), mate_in_3 - 2);
        let mated = -(MATE_VALUE - 3);
        let stored = score_to_tt(mated, 2);
        assert_eq!(score_from_tt(stored, 2), mated);
    }

    #[test]
    fn test_finds_mate_in_one() {
        let mut board = Board::from_fen("4k3/8/4K3/8/8/8/8/7R w - - 0 1").unwrap();
        let mut ctx = SearchContext::new();
        ctx.begin_search();
        let (pv, score) = ctx.alpha_beta(&mut board, 3, -INFINITY, INFINITY, 0);
        assert_eq!(score, MATE_VALUE - 1);
        assert_eq!(pv.first().map(ToString::to_string), Some("h1h8".to_string()));
    }

    #[test]
    fn test_detects_being_mated() {
        // Black is checkmated: score is -MATE at ply 0
        let mut board = Board::from_fen("4k2R/8/4K3/8/8/8/8/8 b - - 0 1").unwrap();
        let mut ctx = SearchContext::new();
        ctx.begin_search();
        let (pv, score) = ctx.alpha_beta(&mut board, 2, -INFINITY, INFINITY, 0);
        assert!(pv.is_empty());
        assert_eq!(score, -MATE_VALUE);
    }

    #[test]
    fn test_stalemate_scores_zero() {
        let mut board = Board::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        let mut ctx = SearchContext::new();
        ctx.begin_search();
        let (_, score) = ctx.alpha_beta(&mut board, 2, -INFINITY, INFINITY, 0);
        assert_eq!(score, 0);
    }

    #[test]
    fn test_quiescence_resolves_hanging_piece() {
        // White to move, black queen hangs on d5 to the pawn on e4
        let mut board =
            Board::from_fen("4k3/8/8/3q4/4P3/8/8/4K3 w - - 0 1").unwrap();
        let mut ctx = SearchContext::new();
        ctx.begin_search();
        let (pv, score) = ctx.alpha_beta(&mut board, 1, -INFINITY, INFINITY, 0);
        assert_eq!(pv.first().map(ToString::to_string), Some("e4d5".to_string()));
        // Pawn up against a bare king; the damped material term keeps the
        // score modest, but it must clearly beat losing the e-pawn
        assert!(score > 150);
    }

    #[test]
    fn test_search_board_unchanged() {
        let mut board = Board::new();
        let before = board.hash();
        let mut ctx = SearchContext::new();
        ctx.begin_search();
        let _ = ctx.alpha_beta(&mut board, 4, -INFINITY, INFINITY, 0);
        assert_eq!(board.hash(), before);
        assert_eq!(board.history_len(), 0);
    }
}
