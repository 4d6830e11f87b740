//! Precomputed attack tables.
//!
//! Knight, king, and pawn attacks are per-square lookups. Sliding attacks
//! are resolved by classic ray tracing: take the full ray from the source
//! square, find the nearest blocker in the occupancy, and cut the ray there.

use once_cell::sync::Lazy;

fn pop_lsb_u64(bb: &mut u64) -> usize {
    let idx = bb.trailing_zeros() as usize;
    *bb &= *bb - 1;
    idx
}

pub(crate) static KNIGHT_ATTACKS: Lazy<[u64; 64]> = Lazy::new(|| {
    let deltas = [
        (2, 1),
        (1, 2),
        (-1, 2),
        (-2, 1),
        (-2, -1),
        (-1, -2),
        (1, -2),
        (2, -1),
    ];
    leaper_table(&deltas)
});

pub(crate) static KING_ATTACKS: Lazy<[u64; 64]> = Lazy::new(|| {
    let deltas = [
        (1, 0),
        (-1, 0),
        (0, 1),
        (0, -1),
        (1, 1),
        (1, -1),
        (-1, 1),
        (-1, -1),
    ];
    leaper_table(&deltas)
});

fn leaper_table(deltas: &[(isize, isize)]) -> [u64; 64] {
    let mut attacks = [0u64; 64];
    for (sq, mask) in attacks.iter_mut().enumerate() {
        let r = (sq / 8) as isize;
        let f = (sq % 8) as isize;
        for &(dr, df) in deltas {
            let nr = r + dr;
            let nf = f + df;
            if (0..8).contains(&nr) && (0..8).contains(&nf) {
                *mask |= 1u64 << ((nr as usize) * 8 + (nf as usize));
            }
        }
    }
    attacks
}

/// `PAWN_ATTACKS[color][sq]` = squares a pawn of `color` on `sq` attacks.
pub(crate) static PAWN_ATTACKS: Lazy<[[u64; 64]; 2]> = Lazy::new(|| {
    let mut attacks = [[0u64; 64]; 2];
    for sq in 0..64 {
        let r = (sq / 8) as isize;
        let f = (sq % 8) as isize;
        for (c, dr) in [(0usize, 1isize), (1, -1)] {
            let nr = r + dr;
            if (0..8).contains(&nr) {
                for df in [-1isize, 1] {
                    let nf = f + df;
                    if (0..8).contains(&nf) {
                        attacks[c][sq] |= 1u64 << ((nr as usize) * 8 + (nf as usize));
                    }
                }
            }
        }
    }
    attacks
});

pub(crate) const DIR_N: usize = 0;
pub(crate) const DIR_S: usize = 1;
pub(crate) const DIR_E: usize = 2;
pub(crate) const DIR_W: usize = 3;
pub(crate) const DIR_NE: usize = 4;
pub(crate) const DIR_NW: usize = 5;
pub(crate) const DIR_SE: usize = 6;
pub(crate) const DIR_SW: usize = 7;

const DIR_DELTAS: [(isize, isize); 8] = [
    (1, 0),   // N
    (-1, 0),  // S
    (0, 1),   // E
    (0, -1),  // W
    (1, 1),   // NE
    (1, -1),  // NW
    (-1, 1),  // SE
    (-1, -1), // SW
];

pub(crate) static RAYS: Lazy<[[u64; 64]; 8]> = Lazy::new(|| {
    let mut rays = [[0u64; 64]; 8];
    for sq in 0..64 {
        let r = (sq / 8) as isize;
        let f = (sq % 8) as isize;
        for (d, (dr, df)) in DIR_DELTAS.iter().enumerate() {
            let mut mask = 0u64;
            let mut nr = r + dr;
            let mut nf = f + df;
            while (0..8).contains(&nr) && (0..8).contains(&nf) {
                mask |= 1u64 << ((nr as usize) * 8 + (nf as usize));
                nr += dr;
                nf += df;
            }
            rays[d][sq] = mask;
        }
    }
    rays
});

/// `BETWEEN[a][b]` = squares strictly between `a` and `b` when they share a
/// rank, file, or diagonal; 0 otherwise. Used for check interpositions,
/// castling paths, and slider path validation.
pub(crate) static BETWEEN: Lazy<Box<[[u64; 64]; 64]>> = Lazy::new(|| {
    let mut between = Box::new([[0u64; 64]; 64]);
    for a in 0..64 {
        for d in 0..8 {
            let ray = RAYS[d][a];
            let mut targets = ray;
            while targets != 0 {
                let b = pop_lsb_u64(&mut targets);
                // Between = our ray toward b, minus b's own onward ray and b itself
                between[a][b] = ray & !RAYS[d][b] & !(1u64 << b);
            }
        }
    }
    between
});

/// `DISTANCE[a][b]` = Chebyshev (king-move) distance between two squares.
pub(crate) static DISTANCE: Lazy<[[u8; 64]; 64]> = Lazy::new(|| {
    let mut dist = [[0u8; 64]; 64];
    for a in 0..64 {
        for b in 0..64 {
            let dr = ((a / 8) as isize - (b / 8) as isize).unsigned_abs();
            let df = ((a % 8) as isize - (b % 8) as isize).unsigned_abs();
            dist[a][b] = dr.max(df) as u8;
        }
    }
    dist
});

fn is_increasing_dir(dir: usize) -> bool {
    matches!(dir, DIR_N | DIR_E | DIR_NE | DIR_NW)
}

fn nearest_blocker_idx(dir: usize, blockers: u64) -> usize {
    if is_increasing_dir(dir) {
        blockers.trailing_zeros() as usize
    } else {
        63 - blockers.leading_zeros() as usize
    }
}

fn ray_attacks(from_idx: usize, dir: usize, occupancy: u64) -> u64 {
    let ray = RAYS[dir][from_idx];
    let blockers = ray & occupancy;
    if blockers == 0 {
        return ray;
    }
    let blocker_idx = nearest_blocker_idx(dir, blockers);
    // Keep the blocker square itself; the caller masks off friendly pieces
    ray ^ RAYS[dir][blocker_idx]
}

/// Attack set of a sliding piece on `from_idx` given `occupancy`, stopping
/// at (and including) the first blocker on each ray.
pub(crate) fn slider_attacks(from_idx: usize, occupancy: u64, bishop: bool) -> u64 {
    let dirs: &[usize] = if bishop {
        &[DIR_NE, DIR_NW, DIR_SE, DIR_SW]
    } else {
        &[DIR_N, DIR_S, DIR_E, DIR_W]
    };
    let mut attacks = 0u64;
    for &dir in dirs {
        attacks |= ray_attacks(from_idx, dir, occupancy);
    }
    attacks
}
