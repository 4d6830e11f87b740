//! Alpha-beta search.
//!
//! All mutable search state (transposition table, killer moves, history
//! counters, statistics, cancellation flag) lives in a `SearchContext`
//! owned by the caller; nothing is global. Two searches run concurrently
//! by giving each its own context and a clone of the board.

mod alphabeta;
mod driver;
mod order;

pub use driver::SearchReport;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::board::types::{Move, MAX_PLY};
use crate::tt::TranspositionTable;

/// Score for delivering checkmate at the root. Mate scores are reported
/// relative to the root: mate in N plies scores `MATE_VALUE - N`.
pub const MATE_VALUE: i32 = 30_000;
/// Scores beyond this are mate scores and get ply adjustment in the
/// transposition table.
pub(crate) const MATE_THRESHOLD: i32 = MATE_VALUE - MAX_PLY as i32 * 2;
/// Larger than any achievable score; used as the unbounded window edge.
pub const INFINITY: i32 = 32_000;

const DEFAULT_TT_MB: usize = 32;

/// Killer moves: quiet moves that caused a beta cutoff at a ply, tried
/// early when the same ply is searched again. Two slots per ply; the
/// killers from two plies up (the same side's previous turn) also earn a
/// smaller bonus.
pub(crate) struct KillerTable {
    slots: [[Move; 2]; MAX_PLY],
}

impl KillerTable {
    fn new() -> Self {
        KillerTable {
            slots: [[Move::null(); 2]; MAX_PLY],
        }
    }

    fn clear(&mut self) {
        self.slots = [[Move::null(); 2]; MAX_PLY];
    }

    pub(crate) fn record(&mut self, ply: usize, mv: Move) {
        if ply >= MAX_PLY || !mv.is_quiet() {
            return;
        }
        if self.slots[ply][0] != mv {
            self.slots[ply][1] = self.slots[ply][0];
            self.slots[ply][0] = mv;
        }
    }

    pub(crate) fn bonus(&self, ply: usize, mv: Move) -> i32 {
        if ply >= MAX_PLY {
            return 0;
        }
        if self.slots[ply][0] == mv {
            return 10;
        }
        if self.slots[ply][1] == mv {
            return 8;
        }
        if ply >= 2 {
            if self.slots[ply - 2][0] == mv {
                return 6;
            }
            if self.slots[ply - 2][1] == mv {
                return 4;
            }
        }
        0
    }
}

/// Butterfly history: per (from, to) counters for quiet moves that raised
/// alpha, used to order quiet moves behind captures and killers.
///
/// Counters are halved across the board whenever one reaches
/// `HISTORY_MAX`, so scores keep their relative order but never climb
/// into the killer or capture ordering tiers.
pub(crate) struct HistoryTable {
    counters: Box<[i32; 4096]>,
}

const HISTORY_MAX: i32 = 1 << 14;

impl HistoryTable {
    fn new() -> Self {
        HistoryTable {
            counters: Box::new([0; 4096]),
        }
    }

    fn clear(&mut self) {
        self.counters.fill(0);
    }

    #[inline]
    fn index(mv: Move) -> usize {
        mv.from().as_index() * 64 + mv.to().as_index()
    }

    pub(crate) fn record(&mut self, mv: Move, depth: i32) {
        let slot = &mut self.counters[Self::index(mv)];
        *slot = slot.saturating_add(depth * depth);
        if *slot >= HISTORY_MAX {
            for counter in self.counters.iter_mut() {
                *counter >>= 1;
            }
        }
    }

    pub(crate) fn bonus(&self, mv: Move) -> i32 {
        self.counters[Self::index(mv)]
    }
}

/// Node counters for one search.
#[derive(Clone, Copy, Debug, Default)]
pub struct SearchStats {
    /// Interior and leaf nodes visited by the main search.
    pub nodes: u64,
    /// Nodes visited by quiescence search.
    pub qnodes: u64,
    /// Cutoffs taken directly from the transposition table.
    pub tt_cutoffs: u64,
}

/// Owns every piece of mutable search state.
pub struct SearchContext {
    pub(crate) tt: TranspositionTable,
    pub(crate) killers: KillerTable,
    pub(crate) history: HistoryTable,
    alive: Arc<AtomicBool>,
    pub(crate) stats: SearchStats,
}

impl SearchContext {
    /// Context with a transposition table of the default size and a fresh
    /// cancellation flag.
    #[must_use]
    pub fn new() -> Self {
        Self::with_table_size(DEFAULT_TT_MB)
    }

    #[must_use]
    pub fn with_table_size(tt_mb: usize) -> Self {
        SearchContext {
            tt: TranspositionTable::new(tt_mb),
            killers: KillerTable::new(),
            history: HistoryTable::new(),
            alive: Arc::new(AtomicBool::new(true)),
            stats: SearchStats::default(),
        }
    }

    /// Share the cancellation flag, e.g. with a timer thread or a UI
    /// stop button. Setting it to false aborts the search at the next
    /// node; the driver keeps the last completed iteration's result.
    #[must_use]
    pub fn alive_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.alive)
    }

    /// Abort the current search.
    pub fn stop(&self) {
        self.alive.store(false, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Relaxed)
    }

    /// Prepare for a new search: rearm the flag, age the transposition
    /// table, reset per-search state.
    pub(crate) fn begin_search(&mut self) {
        self.alive.store(true, Ordering::Relaxed);
        self.tt.new_search();
        self.killers.clear();
        self.history.clear();
        self.stats = SearchStats::default();
    }

    /// Statistics from the most recent search.
    #[must_use]
    pub fn stats(&self) -> SearchStats {
        self.stats
    }

    /// Forget all cached search state, e.g. when switching to an
    /// unrelated game.
    pub fn reset(&mut self) {
        self.tt.clear();
        self.killers.clear();
        self.history.clear();
        self.stats = SearchStats::default();
    }
}

impl Default for SearchContext {
    fn default() -> Self {
        SearchContext::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::types::Square;

    #[test]
    fn test_killer_slots_shift() {
        let mut killers = KillerTable::new();
        let a = Move::quiet(Square(0, 1), Square(2, 2));
        let b = Move::quiet(Square(0, 6), Square(2, 5));
        killers.record(3, a);
        assert_eq!(killers.bonus(3, a), 10);
        killers.record(3, b);
        assert_eq!(killers.bonus(3, b), 10);
        assert_eq!(killers.bonus(3, a), 8);
        // Same side two plies deeper sees a reduced bonus
        assert_eq!(killers.bonus(5, b), 6);
        assert_eq!(killers.bonus(5, a), 4);
        assert_eq!(killers.bonus(4, a), 0);
    }

    #[test]
    fn test_killers_ignore_captures() {
        let mut killers = KillerTable::new();
        let cap = Move::capture(Square(0, 1), Square(2, 2));
        killers.record(0, cap);
        assert_eq!(killers.bonus(0, cap), 0);
    }

    #[test]
    fn test_history_accumulates() {
        let mut history = HistoryTable::new();
        let mv = Move::quiet(Square(1, 4), Square(3, 4));
        history.record(mv, 3);
        history.record(mv, 2);
        assert_eq!(history.bonus(mv), 13);
        history.clear();
        assert_eq!(history.bonus(mv), 0);
    }

    #[test]
    fn test_history_counters_stay_bounded() {
        let mut history = HistoryTable::new();
        let hot = Move::quiet(Square(1, 4), Square(3, 4));
        let cold = Move::quiet(Square(1, 0), Square(2, 0));
        history.record(cold, 4);
        for _ in 0..10_000 {
            history.record(hot, 20);
        }
        // Bounded below the killer tier, relative order preserved
        assert!(history.bonus(hot) < HISTORY_MAX);
        assert!(history.bonus(hot) > history.bonus(cold));
    }

    #[test]
    fn test_stop_flag_shared() {
        let ctx = SearchContext::new();
        let handle = ctx.alive_handle();
        assert!(ctx.is_alive());
        handle.store(false, Ordering::Relaxed);
        assert!(!ctx.is_alive());
    }
}
