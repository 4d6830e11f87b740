//! Iterative deepening driver.

use std::time::{Duration, Instant};

use log::debug;

use crate::board::types::Move;
use crate::board::Board;

use super::{SearchContext, INFINITY, MATE_THRESHOLD};

/// Result of one completed search iteration.
#[derive(Clone, Debug)]
pub struct SearchReport {
    /// Nominal depth of the completed iteration.
    pub depth: i32,
    /// Score in centipawns from the side to move's perspective; mate
    /// scores are `MATE_VALUE - plies`.
    pub score: i32,
    /// Principal variation, best move first.
    pub pv: Vec<Move>,
    /// Main and quiescence nodes searched so far.
    pub nodes: u64,
    /// Wall-clock time since the search started.
    pub elapsed: Duration,
}

impl SearchReport {
    /// The move the engine would play.
    #[must_use]
    pub fn best_move(&self) -> Option<Move> {
        self.pv.first().copied()
    }

    pub(crate) fn pv_string(&self) -> String {
        self.pv
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl SearchContext {
    /// Search with iterative deepening up to `max_depth`, optionally
    /// bounded by a wall-clock budget checked between iterations. Returns
    /// the last completed iteration, or `None` when there are no legal
    /// moves. Cancelling via the alive flag keeps the last completed
    /// depth.
    pub fn find_best_move(
        &mut self,
        board: &mut Board,
        max_depth: i32,
        budget: Option<Duration>,
    ) -> Option<SearchReport> {
        self.iterate(board, max_depth, budget, |_| {})
    }

    /// Like `find_best_move`, invoking `on_depth` after every completed
    /// iteration (for analysis output).
    pub fn iterate<F>(
        &mut self,
        board: &mut Board,
        max_depth: i32,
        budget: Option<Duration>,
        mut on_depth: F,
    ) -> Option<SearchReport>
    where
        F: FnMut(&SearchReport),
    {
        self.begin_search();
        let start = Instant::now();
        let mut best: Option<SearchReport> = None;
        let mut previous_iteration = Duration::ZERO;

        for depth in 1..=max_depth.max(1) {
            if let Some(budget) = budget {
                let elapsed = start.elapsed();
                if elapsed >= budget {
                    break;
                }
                // Each iteration costs a few times the previous one; don't
                // start one the remaining budget cannot finish
                if budget > Duration::from_secs(1)
                    && budget - elapsed <= previous_iteration * 4
                {
                    break;
                }
            }

            let iteration_start = Instant::now();
            let (pv, score) = self.alpha_beta(board, depth, -INFINITY, INFINITY, 0);
            if !self.is_alive() {
                // Partial iteration, results are unreliable
                break;
            }
            previous_iteration = iteration_start.elapsed();

            if pv.is_empty() {
                // No legal moves at the root
                break;
            }

            let report = SearchReport {
                depth,
                score,
                pv,
                nodes: self.stats.nodes + self.stats.qnodes,
                elapsed: start.elapsed(),
            };
            debug!(
                "depth {} score {} nodes {} time {:?} pv {}",
                report.depth,
                report.score,
                report.nodes,
                report.elapsed,
                report.pv_string()
            );
            on_depth(&report);
            let mate_found = report.score.abs() > MATE_THRESHOLD;
            best = Some(report);
            if mate_found {
                break;
            }
        }

        debug!(
            "search done: nodes {} qnodes {} tt hit rate {:.2}",
            self.stats.nodes,
            self.stats.qnodes,
            self.tt.hit_rate()
        );
        best
    }
}
