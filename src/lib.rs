//! Exact solver for m,n,k connection games
//!
//! Two players alternately mark cells of a `width x height` grid; the first
//! to own `k` cells in an unbroken horizontal, vertical or diagonal line
//! wins. The solver decides a position exactly: first player wins, second
//! player wins, or a tie.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//! - [`board`]: Grid representation with apply/undo
//! - [`rules`]: Winning-line checks
//! - [`search`]: Threat ledger and proof-number search
//! - [`engine`]: Solver facade producing verdicts
//! - [`protocol`]: Text request reader and session loop
//!
//! # Quick Start
//!
//! ```
//! use nmk::{Board, Mark, Move, Pos, Solver, Verdict};
//!
//! let mut board = Board::new(3, 3);
//! board.apply(&Move::new(Mark::First, Pos::new(0, 0)));
//! board.apply(&Move::new(Mark::First, Pos::new(0, 1)));
//! board.apply(&Move::new(Mark::Second, Pos::new(1, 0)));
//!
//! let result = Solver::new().solve(&mut board, 3, Mark::First);
//! assert_eq!(result.verdict, Verdict::FirstPlayerWins);
//! ```
//!
//! # Search
//!
//! The proof-number search grows an AND/OR tree over a single shared
//! board. Each node keeps its own copy of the threats on its path; once a
//! side owns a threat, only the threat cells are considered as replies,
//! which keeps the tree small.

pub mod board;
pub mod engine;
pub mod error;
pub mod protocol;
pub mod rules;
pub mod search;

// Re-export commonly used types for convenience
pub use board::{Board, Mark, Move, Pos};
pub use engine::{SolveMethod, SolveResult, Solver, Verdict};
pub use error::{Error, Result};
