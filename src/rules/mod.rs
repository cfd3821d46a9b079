//! Game rules for m,n,k games
//!
//! This module implements the win condition: `k` marks in an unbroken
//! line through any of the four directions.

pub mod win;

// Re-exports for convenient access
pub use win::{count_in_direction, find_winner, is_winning_at, run_length};
