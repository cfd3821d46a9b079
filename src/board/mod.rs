//! Board representation for m,n,k games

pub mod board;


// Re-exports
pub use board::Board;

/// Line directions as (dx, dy): horizontal, vertical and both diagonals
pub const DIRECTIONS: [(isize, isize); 4] = [
    (1, 0),  // Horizontal
    (0, 1),  // Vertical
    (1, 1),  // Diagonal SE
    (1, -1), // Diagonal NE
];

/// Cell ownership
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mark {
    #[default]
    Empty,
    First,
    Second,
}

impl Mark {
    /// Get opponent mark
    #[inline]
    pub fn opponent(self) -> Mark {
        match self {
            Mark::First => Mark::Second,
            Mark::Second => Mark::First,
            Mark::Empty => Mark::Empty,
        }
    }

    /// Map a player selector (`1` or `2`) to its mark
    #[inline]
    pub fn from_player_number(number: u32) -> Option<Mark> {
        match number {
            1 => Some(Mark::First),
            2 => Some(Mark::Second),
            _ => None,
        }
    }

    /// Map a cell code (`0`, `1` or `2`) to its mark
    #[inline]
    pub fn from_code(code: u32) -> Option<Mark> {
        match code {
            0 => Some(Mark::Empty),
            other => Mark::from_player_number(other),
        }
    }
}

/// Position on the board: `x` is the column, `y` the row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

impl Pos {
    #[inline]
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl PartialOrd for Pos {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Row-major order
impl Ord for Pos {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.y, self.x).cmp(&(other.y, other.x))
    }
}

/// A mark placed at a position.
///
/// The tree root carries a move without a position: it stands for
/// "no move yet" and only records which side moved last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub mark: Mark,
    pub pos: Option<Pos>,
}

impl Move {
    #[inline]
    pub fn new(mark: Mark, pos: Pos) -> Self {
        Self {
            mark,
            pos: Some(pos),
        }
    }

    /// The "no move yet" sentinel, attributed to `mark`
    #[inline]
    pub fn unknown(mark: Mark) -> Self {
        Self { mark, pos: None }
    }

    #[inline]
    pub fn is_known(&self) -> bool {
        self.pos.is_some()
    }
}
