//! Win condition checking for m,n,k games
//!
//! A player wins with `k` or more marks in an unbroken horizontal,
//! vertical or diagonal line.

use crate::board::{Board, Mark, Pos, DIRECTIONS};

/// Count consecutive cells past `pos` along `dir` owned by the mark at `pos`
#[inline]
pub fn count_in_direction(board: &Board, pos: Pos, dir: (isize, isize)) -> usize {
    let mark = board.get(pos);
    let mut count = 0;
    let mut distance = 1;
    while let Some(p) = board.step(pos, dir, distance) {
        if board.get(p) != mark {
            break;
        }
        count += 1;
        distance += 1;
    }
    count
}

/// Length of the same-mark run through `pos` along `dir` (both ways)
#[inline]
pub fn run_length(board: &Board, pos: Pos, dir: (isize, isize)) -> usize {
    let (dx, dy) = dir;
    1 + count_in_direction(board, pos, dir) + count_in_direction(board, pos, (-dx, -dy))
}

/// Check whether the mark at `pos` lies on a line of `k` or more.
///
/// Only checks the 4 directions through `pos`. Empty cells never win.
#[inline]
pub fn is_winning_at(board: &Board, pos: Pos, k: usize) -> bool {
    if board.is_empty(pos) {
        return false;
    }
    DIRECTIONS
        .iter()
        .any(|&dir| run_length(board, pos, dir) >= k)
}

/// Check for a winner
///
/// Scans occupied cells in row-major order and returns the owner of the
/// first cell found on a winning line.
pub fn find_winner(board: &Board, k: usize) -> Option<Mark> {
    board
        .positions()
        .find(|&pos| is_winning_at(board, pos, k))
        .map(|pos| board.get(pos))
}
