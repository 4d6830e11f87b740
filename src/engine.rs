//! Engine front end: position management, time control, and search
//! lifecycle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::debug;
use parking_lot::Mutex;

use crate::board::error::{FenError, MoveParseError};
use crate::board::{Board, Variant};
use crate::search::{SearchContext, SearchReport};

/// Playing strengths selectable by a front end.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strength {
    Easy,
    Intermediate,
    Expert,
}

impl Strength {
    /// Search depth for the level. Expert relies on the clock as well.
    const fn depth(self) -> i32 {
        match self {
            Strength::Easy => 2,
            Strength::Intermediate => 4,
            Strength::Expert => 10,
        }
    }
}

/// A search running on its own thread.
struct SearchJob {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl SearchJob {
    /// Stop the search and wait for its thread to deliver the result.
    /// The flag is re-signalled while waiting because a search that has
    /// not reached its first node yet rearms it on startup.
    fn stop_and_wait(self) {
        while !self.handle.is_finished() {
            self.stop.store(false, Ordering::Relaxed);
            thread::sleep(Duration::from_millis(1));
        }
        let _ = self.handle.join();
    }
}

/// A playable engine: owns a board, a search context, and the time
/// control, and hands out one move per `go` call.
pub struct Engine {
    board: Board,
    context: Arc<Mutex<SearchContext>>,
    stop: Arc<AtomicBool>,
    current_job: Option<SearchJob>,
    max_depth: i32,
    base_time: Duration,
    increment: Duration,
    remaining: Duration,
    move_time: Option<Duration>,
}

impl Engine {
    #[must_use]
    pub fn new() -> Self {
        let context = SearchContext::new();
        let stop = context.alive_handle();
        Engine {
            board: Board::new(),
            context: Arc::new(Mutex::new(context)),
            stop,
            current_job: None,
            max_depth: Strength::Expert.depth(),
            base_time: Duration::ZERO,
            increment: Duration::ZERO,
            remaining: Duration::ZERO,
            move_time: None,
        }
    }

    /// Reset to the starting position and forget cached search state.
    pub fn new_game(&mut self) {
        self.stop_search();
        self.board = Board::new();
        self.context.lock().reset();
        self.remaining = self.base_time;
    }

    /// Load a position from FEN, standard rules.
    pub fn set_position(&mut self, fen: &str) -> Result<(), FenError> {
        self.set_position_variant(fen, Variant::Standard)
    }

    /// Load a position from FEN under a variant rule set.
    pub fn set_position_variant(&mut self, fen: &str, variant: Variant) -> Result<(), FenError> {
        self.stop_search();
        self.board = Board::from_fen_variant(fen, variant)?;
        Ok(())
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Apply a move in long algebraic notation, rejecting illegal ones.
    pub fn play_move(&mut self, notation: &str) -> Result<(), MoveParseError> {
        let mv = self.board.parse_move(notation)?;
        if !self.board.is_legal(mv) {
            return Err(MoveParseError::IllegalMove {
                notation: notation.to_string(),
            });
        }
        self.board.apply_move(mv);
        Ok(())
    }

    pub fn set_strength(&mut self, strength: Strength) {
        self.max_depth = strength.depth();
    }

    /// Fixed maximum search depth.
    pub fn set_depth(&mut self, depth: i32) {
        self.max_depth = depth.max(1);
    }

    /// Game clock: base time for the game plus a per-move increment.
    pub fn set_time(&mut self, base: Duration, increment: Duration) {
        self.base_time = base;
        self.increment = increment;
        self.remaining = base;
    }

    /// Exact time per move, overriding the game clock.
    pub fn set_move_time(&mut self, per_move: Duration) {
        self.move_time = Some(per_move);
    }

    /// Stop the running search; it returns its last completed iteration.
    pub fn stop(&self) {
        self.stop.store(false, Ordering::Relaxed);
    }

    /// Flag a front end can drop to abort the search from another thread.
    #[must_use]
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Stop any background search and wait for it to finish.
    pub fn stop_search(&mut self) {
        if let Some(job) = self.current_job.take() {
            job.stop_and_wait();
        }
    }

    /// Whether a background search is still running.
    #[must_use]
    pub fn is_searching(&self) -> bool {
        self.current_job
            .as_ref()
            .is_some_and(|job| !job.handle.is_finished())
    }

    /// Time to spend on the next move: the fixed move time if set,
    /// otherwise a slice of the remaining clock based on how many moves
    /// the game is still expected to last.
    fn allot_time(&self) -> Option<Duration> {
        if let Some(per_move) = self.move_time {
            return Some(per_move);
        }
        if self.remaining.is_zero() {
            return None;
        }
        let estimate = remaining_moves_estimate(self.board.ply());
        let mut allotment = self.remaining.as_secs_f64() / estimate;
        if self.remaining > Duration::from_secs(10) {
            // With time on the clock, budget for 40 moves rather than 80
            allotment *= 2.0;
        }
        allotment += self.increment.as_secs_f64();
        Some(Duration::from_secs_f64(allotment))
    }

    /// Search the current position and return the chosen move with its
    /// line. The board is unchanged; feed the move back via `play_move`
    /// once it is actually played. Returns `None` when there are no legal
    /// moves (mate or stalemate).
    pub fn go(&mut self) -> Option<SearchReport> {
        self.stop_search();
        let budget = self.allot_time();
        if let Some(budget) = budget {
            debug!("thinking for up to {budget:?} of {:?} left", self.remaining);
        }
        let report = self
            .context
            .lock()
            .find_best_move(&mut self.board, self.max_depth, budget);
        if let Some(report) = &report {
            self.remaining = self
                .remaining
                .saturating_sub(report.elapsed)
                .saturating_add(self.increment);
        }
        report
    }

    /// Like `go`, but on a dedicated thread. `on_complete` receives the
    /// result when the search ends on its own, hits the clock, or is
    /// cancelled via `stop`. The board stays at the searched position;
    /// play the chosen move from the callback via `play_move`.
    pub fn go_background<F>(&mut self, on_complete: F)
    where
        F: FnOnce(Option<SearchReport>) + Send + 'static,
    {
        self.stop_search();
        let budget = self.allot_time();
        let max_depth = self.max_depth;
        let mut board = self.board.clone();
        let context = Arc::clone(&self.context);
        let handle = thread::Builder::new()
            .name("search".to_string())
            .spawn(move || {
                let report = context.lock().find_best_move(&mut board, max_depth, budget);
                on_complete(report);
            })
            .expect("failed to spawn search thread");
        self.current_job = Some(SearchJob {
            stop: Arc::clone(&self.stop),
            handle,
        });
    }

    /// Analyze the current position on a scratch copy of the board,
    /// reporting each completed depth. Runs until `max_depth`, the time
    /// budget, or a `stop` call ends it.
    pub fn analyze<F>(&mut self, max_depth: i32, on_depth: F) -> Option<SearchReport>
    where
        F: FnMut(&SearchReport),
    {
        self.stop_search();
        let mut scratch = self.board.clone();
        self.context
            .lock()
            .iterate(&mut scratch, max_depth, self.move_time, on_depth)
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.stop_search();
    }
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new()
    }
}

/// Expected number of remaining moves at a given game ply. Regression
/// polynomial fitted against a large game database; floored so the
/// allotment never divides by less than one move.
fn remaining_moves_estimate(ply: u32) -> f64 {
    let x = f64::from(ply);
    let estimate = -1.71086e-12 * x.powi(6) + 1.69103e-9 * x.powi(5) - 6.00801e-7 * x.powi(4)
        + 8.17741e-5 * x.powi(3)
        + 2.91858e-4 * x.powi(2)
        - 0.94497 * x
        + 78.8979;
    estimate.max(1.0)
}
