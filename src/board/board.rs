//! Board structure with apply/undo tracking

use super::{Mark, Move, Pos};
use crate::error::{Error, Result};

/// Rectangular game board.
///
/// The search mutates a single board in place: every `apply` made while
/// descending the tree is paired with an `undo` on the way back up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    /// Row-major cells
    cells: Vec<Mark>,
    /// Number of cells currently `Mark::Empty`
    empty: usize,
}

impl Board {
    /// Create an empty board
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Mark::Empty; width * height],
            empty: width * height,
        }
    }

    /// Create a board from row-major cells
    pub fn from_cells(width: usize, height: usize, cells: Vec<Mark>) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }
        if cells.len() != width * height {
            return Err(Error::CellCountMismatch {
                expected: width * height,
                got: cells.len(),
            });
        }
        let empty = cells.iter().filter(|&&m| m == Mark::Empty).count();
        Ok(Self {
            width,
            height,
            cells,
            empty,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn index(&self, pos: Pos) -> usize {
        debug_assert!(pos.x < self.width && pos.y < self.height);
        pos.y * self.width + pos.x
    }

    /// Get mark at position
    #[inline]
    pub fn get(&self, pos: Pos) -> Mark {
        self.cells[self.index(pos)]
    }

    /// Check if position is empty
    #[inline]
    pub fn is_empty(&self, pos: Pos) -> bool {
        self.get(pos) == Mark::Empty
    }

    /// Check signed coordinates against the board dimensions
    #[inline]
    pub fn in_bounds(&self, x: isize, y: isize) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Position `distance` steps from `pos` along `(dx, dy)`, if on the board
    #[inline]
    pub fn step(&self, pos: Pos, (dx, dy): (isize, isize), distance: isize) -> Option<Pos> {
        let x = pos.x as isize + dx * distance;
        let y = pos.y as isize + dy * distance;
        if self.in_bounds(x, y) {
            Some(Pos::new(x as usize, y as usize))
        } else {
            None
        }
    }

    /// Place the move's mark. The "no move yet" sentinel is a no-op.
    #[inline]
    pub fn apply(&mut self, mv: &Move) {
        if let Some(pos) = mv.pos {
            let idx = self.index(pos);
            debug_assert_eq!(self.cells[idx], Mark::Empty, "apply on occupied cell");
            self.cells[idx] = mv.mark;
            self.empty -= 1;
        }
    }

    /// Revert a move made with `apply`
    #[inline]
    pub fn undo(&mut self, mv: &Move) {
        if let Some(pos) = mv.pos {
            let idx = self.index(pos);
            debug_assert_eq!(self.cells[idx], mv.mark, "undo of a move not on the board");
            self.cells[idx] = Mark::Empty;
            self.empty += 1;
        }
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.empty == 0
    }

    /// Number of empty cells
    #[inline]
    pub fn empty_count(&self) -> usize {
        self.empty
    }

    /// All positions in row-major order
    pub fn positions(&self) -> impl Iterator<Item = Pos> {
        let width = self.width;
        (0..self.height).flat_map(move |y| (0..width).map(move |x| Pos::new(x, y)))
    }

    /// Empty positions in row-major order
    pub fn empty_positions(&self) -> impl Iterator<Item = Pos> + '_ {
        self.positions().filter(move |&pos| self.is_empty(pos))
    }
}
