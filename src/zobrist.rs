//! Zobrist hashing keys.
//!
//! One random 64-bit key per (piece, color, square), one for the side to
//! move, one per castling right, and one per en-passant file. Keys come
//! from a fixed-seed PRNG so hashes are reproducible across runs and
//! builds, which keeps transposition-table probes and test expectations
//! stable.

use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub(crate) struct ZobristKeys {
    /// `piece_keys[piece][color][square]`
    pub piece_keys: [[[u64; 64]; 2]; 6],
    pub black_to_move_key: u64,
    /// Indexed by castling-right bit position.
    pub castling_keys: [u64; 4],
    /// Indexed by en-passant file.
    pub en_passant_keys: [u64; 8],
}

const ZOBRIST_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

pub(crate) static ZOBRIST: Lazy<ZobristKeys> = Lazy::new(|| {
    let mut rng = StdRng::seed_from_u64(ZOBRIST_SEED);

    let mut piece_keys = [[[0u64; 64]; 2]; 6];
    for piece_table in piece_keys.iter_mut() {
        for color_table in piece_table.iter_mut() {
            for key in color_table.iter_mut() {
                *key = rng.gen();
            }
        }
    }

    let black_to_move_key = rng.gen();

    let mut castling_keys = [0u64; 4];
    for key in castling_keys.iter_mut() {
        *key = rng.gen();
    }

    let mut en_passant_keys = [0u64; 8];
    for key in en_passant_keys.iter_mut() {
        *key = rng.gen();
    }

    ZobristKeys {
        piece_keys,
        black_to_move_key,
        castling_keys,
        en_passant_keys,
    }
});
