//! Bucketed transposition table.
//!
//! The table is indexed by the low bits of the zobrist hash; each bucket
//! holds four entries tagged with the high 32 bits so unrelated positions
//! sharing an index are told apart. Entries carry a search generation;
//! replacement favors keeping entries from the current search, exact
//! bounds, and deeper searches. The table is owned by a single search
//! context, so no atomics are involved; concurrent searches each get
//! their own table.

use crate::board::types::Move;

const BUCKET_SIZE: usize = 4;

/// How a stored score relates to the true value of the position.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Bound {
    /// Score is exact: the search completed inside the window.
    Exact,
    /// Score is a lower bound: the search failed high (score >= beta).
    Lower,
    /// Score is an upper bound: the search failed low (score <= alpha).
    Upper,
}

#[derive(Clone, Copy)]
struct Entry {
    tag: u32,
    mv: Move,
    score: i32,
    depth: i32,
    bound: Bound,
    generation: u8,
    used: bool,
}

const EMPTY_ENTRY: Entry = Entry {
    tag: 0,
    mv: Move::null(),
    score: 0,
    depth: 0,
    bound: Bound::Exact,
    generation: 0,
    used: false,
};

/// Outcome of a table probe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProbeResult {
    /// Entry is deep enough and its bound resolves the current window;
    /// the score can be returned directly.
    Usable { score: i32, mv: Move },
    /// Entry exists but cannot cut off; its move is still worth trying
    /// first.
    MoveOnly { mv: Move },
    /// No entry for this position.
    Miss,
}

pub struct TranspositionTable {
    buckets: Vec<[Entry; BUCKET_SIZE]>,
    mask: usize,
    generation: u8,
    hits: u64,
    probes: u64,
}

impl TranspositionTable {
    /// Allocate a table of roughly `size_mb` megabytes (bucket count is
    /// rounded down to a power of two).
    #[must_use]
    pub fn new(size_mb: usize) -> Self {
        let bytes = size_mb.max(1) * 1024 * 1024;
        let mut num_buckets = (bytes / std::mem::size_of::<[Entry; BUCKET_SIZE]>()).max(1);
        num_buckets = num_buckets.next_power_of_two();
        if num_buckets * std::mem::size_of::<[Entry; BUCKET_SIZE]>() > bytes {
            num_buckets /= 2;
        }
        let num_buckets = num_buckets.max(1);
        TranspositionTable {
            buckets: vec![[EMPTY_ENTRY; BUCKET_SIZE]; num_buckets],
            mask: num_buckets - 1,
            generation: 0,
            hits: 0,
            probes: 0,
        }
    }

    /// Drop all entries and reset statistics.
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            *bucket = [EMPTY_ENTRY; BUCKET_SIZE];
        }
        self.generation = 0;
        self.hits = 0;
        self.probes = 0;
    }

    /// Start a new search: older entries become preferred eviction
    /// candidates without being dropped.
    pub fn new_search(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    #[inline]
    fn index(&self, hash: u64) -> usize {
        hash as usize & self.mask
    }

    #[inline]
    fn tag(hash: u64) -> u32 {
        (hash >> 32) as u32
    }

    /// Look up `hash` against the window `(alpha, beta)` at `depth`.
    pub fn probe(&mut self, hash: u64, depth: i32, alpha: i32, beta: i32) -> ProbeResult {
        self.probes += 1;
        let idx = self.index(hash);
        let tag = Self::tag(hash);
        for entry in &self.buckets[idx] {
            if !entry.used || entry.tag != tag {
                continue;
            }
            self.hits += 1;
            let usable = entry.depth >= depth
                && match entry.bound {
                    Bound::Exact => true,
                    Bound::Lower => entry.score >= beta,
                    Bound::Upper => entry.score <= alpha,
                };
            if usable {
                return ProbeResult::Usable {
                    score: entry.score,
                    mv: entry.mv,
                };
            }
            if entry.mv != Move::null() {
                return ProbeResult::MoveOnly { mv: entry.mv };
            }
            return ProbeResult::Miss;
        }
        ProbeResult::Miss
    }

    /// Store a search result. An existing entry for the same position is
    /// overwritten (keeping its move when the new result has none);
    /// otherwise the least relevant slot in the bucket is evicted.
    pub fn store(&mut self, hash: u64, depth: i32, score: i32, bound: Bound, mv: Move) {
        let idx = self.index(hash);
        let tag = Self::tag(hash);
        let generation = self.generation;
        let bucket = &mut self.buckets[idx];

        if let Some(entry) = bucket.iter_mut().find(|e| e.used && e.tag == tag) {
            let mv = if mv == Move::null() { entry.mv } else { mv };
            *entry = Entry {
                tag,
                mv,
                score,
                depth,
                bound,
                generation,
                used: true,
            };
            return;
        }

        let victim = bucket
            .iter_mut()
            .min_by_key(|e| Self::relevance(e, generation))
            .expect("bucket is never empty");
        *victim = Entry {
            tag,
            mv,
            score,
            depth,
            bound,
            generation,
            used: true,
        };
    }

    fn relevance(entry: &Entry, generation: u8) -> i64 {
        if !entry.used {
            return i64::MIN;
        }
        let mut score = i64::from(entry.depth);
        if entry.generation == generation {
            score += 1 << 16;
        }
        if entry.bound == Bound::Exact {
            score += 1 << 8;
        }
        score
    }

    /// Fraction of probes that found a matching entry, for logging.
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        if self.probes == 0 {
            0.0
        } else {
            self.hits as f64 / self.probes as f64
        }
    }
}
