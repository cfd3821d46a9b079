//! Solver engine integrating the line checks and proof-number search
//!
//! Solving a position follows a fixed order:
//!
//! 1. **Existing line**: a grid that already holds a winning line is
//!    decided without searching
//! 2. **Proof-number search**: prove a win for the selected player, who
//!    moves first from the given grid
//! 3. **Draw detection**: when no win exists, tell a draw from a loss
//!
//! # Example
//!
//! ```
//! use nmk::{Board, Mark, Solver, Verdict};
//!
//! let mut board = Board::new(3, 3);
//! let result = Solver::new().solve(&mut board, 3, Mark::First);
//! assert_eq!(result.verdict, Verdict::Tie);
//! ```

use std::fmt;
use std::time::Instant;

use log::info;

use crate::board::{Board, Mark};
use crate::rules::find_winner;
use crate::search::{initial_threats, ProofNumberSearch, SearchOutcome, SearchStats};

/// Final answer for a position, in first/second-player terms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    FirstPlayerWins,
    SecondPlayerWins,
    Tie,
}

impl Verdict {
    /// Verdict for a game won by `mark`
    #[inline]
    pub fn win_for(mark: Mark) -> Verdict {
        match mark {
            Mark::First => Verdict::FirstPlayerWins,
            Mark::Second => Verdict::SecondPlayerWins,
            Mark::Empty => Verdict::Tie,
        }
    }

    /// Translate a search outcome for `player` into a verdict
    #[inline]
    pub fn from_outcome(outcome: SearchOutcome, player: Mark) -> Verdict {
        match outcome {
            SearchOutcome::Win => Verdict::win_for(player),
            SearchOutcome::Loss => Verdict::win_for(player.opponent()),
            SearchOutcome::Draw => Verdict::Tie,
        }
    }

    /// Protocol message for this verdict
    pub fn message(self) -> &'static str {
        match self {
            Verdict::FirstPlayerWins => "FIRST_PLAYER_WINS",
            Verdict::SecondPlayerWins => "SECOND_PLAYER_WINS",
            Verdict::Tie => "BOTH_PLAYERS_TIE",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Which stage of the solver decided the verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveMethod {
    /// The grid already held a winning line
    ExistingLine,
    /// Decided by the proof-number search itself
    ProofNumber,
    /// Decided by the draw-detection pass after the search
    DrawDetection,
}

/// Result of solving a position, with statistics
#[derive(Debug, Clone)]
pub struct SolveResult {
    pub verdict: Verdict,
    pub method: SolveMethod,
    /// Search statistics (all zero for `ExistingLine`)
    pub stats: SearchStats,
    /// Time taken in milliseconds
    pub time_ms: u64,
}

/// Exact solver for m,n,k positions.
#[derive(Debug, Clone, Default)]
pub struct Solver;

impl Solver {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Solve `board` with `player` to move and `k` marks needed to win.
    ///
    /// The board is mutated during the search and restored before
    /// returning.
    pub fn solve(&self, board: &mut Board, k: usize, player: Mark) -> SolveResult {
        let start = Instant::now();

        if let Some(winner) = find_winner(board, k) {
            let result = SolveResult {
                verdict: Verdict::win_for(winner),
                method: SolveMethod::ExistingLine,
                stats: SearchStats::default(),
                time_ms: start.elapsed().as_millis() as u64,
            };
            log_result(board, k, &result);
            return result;
        }

        let threats = initial_threats(board, k);
        let mut search = ProofNumberSearch::new(board, k, player, threats);
        let outcome = search.run();
        let stats = search.stats().clone();

        let method = if stats.draw_pass {
            SolveMethod::DrawDetection
        } else {
            SolveMethod::ProofNumber
        };
        let result = SolveResult {
            verdict: Verdict::from_outcome(outcome, player),
            method,
            stats,
            time_ms: start.elapsed().as_millis() as u64,
        };
        log_result(board, k, &result);
        result
    }
}

fn log_result(board: &Board, k: usize, result: &SolveResult) {
    info!(
        "{}x{} k={}: {} via {:?} ({} nodes, {} expanded, {}ms)",
        board.width(),
        board.height(),
        k,
        result.verdict,
        result.method,
        result.stats.nodes_created,
        result.stats.nodes_expanded,
        result.time_ms
    );
}
