//! Property-based tests using proptest.

use crate::board::types::Move;
use crate::board::Board;
use proptest::prelude::*;

fn move_count_strategy() -> impl Strategy<Value = usize> {
    1..=20usize
}

fn seed_strategy() -> impl Strategy<Value = u64> {
    any::<u64>()
}

/// Play `num_moves` pseudo-random legal moves.
fn random_playout(board: &mut Board, seed: u64, num_moves: usize) {
    use rand::prelude::*;

    let mut rng = StdRng::seed_from_u64(seed);
    for _ in 0..num_moves {
        let moves = board.legal_moves();
        if moves.is_empty() {
            break;
        }
        let idx = rng.gen_range(0..moves.len());
        board.apply_move(moves[idx]);
    }
}

proptest! {
    /// apply_move followed by pop_move restores the position exactly
    #[test]
    fn prop_apply_pop_restores_state(seed in seed_strategy(), num_moves in move_count_strategy()) {
        let mut board = Board::new();
        random_playout(&mut board, seed, num_moves);

        let fen = board.to_fen();
        let hash = board.hash();
        let depth = board.history_len();

        let moves = board.legal_moves();
        for &mv in moves.iter() {
            board.apply_move(mv);
            board.pop_move();
            prop_assert_eq!(board.to_fen(), fen.clone());
            prop_assert_eq!(board.hash(), hash);
            prop_assert_eq!(board.history_len(), depth);
        }
    }

    /// The incremental hash always matches a from-scratch recomputation
    #[test]
    fn prop_hash_consistency(seed in seed_strategy(), num_moves in move_count_strategy()) {
        use rand::prelude::*;

        let mut board = Board::new();
        let mut rng = StdRng::seed_from_u64(seed);

        for _ in 0..num_moves {
            let moves = board.legal_moves();
            if moves.is_empty() {
                break;
            }
            let idx = rng.gen_range(0..moves.len());
            board.apply_move(moves[idx]);
            prop_assert_eq!(board.hash(), board.compute_hash());
        }
    }

    /// FEN round-trip preserves the position
    #[test]
    fn prop_fen_roundtrip(seed in seed_strategy(), num_moves in move_count_strategy()) {
        let mut board = Board::new();
        random_playout(&mut board, seed, num_moves);

        let fen = board.to_fen();
        let restored = Board::from_fen(&fen).unwrap();

        prop_assert_eq!(board.hash(), restored.hash());
        prop_assert_eq!(board.white_to_move(), restored.white_to_move());
        prop_assert_eq!(board.en_passant_target(), restored.en_passant_target());
        prop_assert_eq!(restored.to_fen(), fen);
    }

    /// No legal move ever leaves the mover's own king in check
    #[test]
    fn prop_legal_moves_are_legal(seed in seed_strategy(), num_moves in move_count_strategy()) {
        let mut board = Board::new();
        random_playout(&mut board, seed, num_moves);

        let mover = board.side_to_move();
        let moves = board.legal_moves();
        for &mv in moves.iter() {
            board.apply_move(mv);
            prop_assert!(
                !board.is_color_checked(mover),
                "legal move left king in check: {:?}", mv
            );
            board.pop_move();
        }
    }

    /// Every legal move passes validation, and the legal set filtered
    /// from check evasions matches the one filtered from all moves
    #[test]
    fn prop_evasions_equal_filtered_moves(seed in seed_strategy(), num_moves in move_count_strategy()) {
        let mut board = Board::new();
        random_playout(&mut board, seed, num_moves);

        for &mv in board.legal_moves().iter() {
            prop_assert!(board.validate_move(mv), "legal move failed validation: {:?}", mv);
        }

        if board.is_checked() {
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
            prop_assert_eq!(from_evasions, from_all);
        }
    }

    /// Evaluation stays within sane bounds over random play
    #[test]
    fn prop_eval_bounded(seed in seed_strategy(), num_moves in 0..30usize) {
        let mut board = Board::new();
        random_playout(&mut board, seed, num_moves);

        let eval = board.evaluate();
        prop_assert!(eval.abs() < 10_000, "evaluation {} is unreasonably large", eval);
    }

    /// Move encoding survives a round trip through the packed form
    #[test]
    fn prop_move_packing_roundtrip(seed in seed_strategy(), num_moves in move_count_strategy()) {
        let mut board = Board::new();
        random_playout(&mut board, seed, num_moves);

        for &mv in board.legal_moves().iter() {
            prop_assert_eq!(Move::from_u16(mv.as_u16()), mv);
        }
    }
}
