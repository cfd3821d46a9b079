//! Threat tracking for the proof-number search
//!
//! A threat is an empty cell which, if its owner played there, would
//! complete a line of `k`. Every search node carries its own
//! [`ThreatLedger`], inherited from its parent and updated by the move
//! that created the node:
//! - threats of the opponent at the played cell are removed (blocked)
//! - new threats created by the move are added, including the one-gap
//!   "skip" pattern `X _ X`
//!
//! The ledger drives both node evaluation and move generation: once a side
//! owns a threat, the other side's replies are restricted to the threat
//! cells.

use crate::board::{Board, Mark, Move, Pos, DIRECTIONS};

/// A cell that completes a winning line for `owner`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Threat {
    pub owner: Mark,
    pub pos: Pos,
}

impl Threat {
    #[inline]
    pub fn new(owner: Mark, pos: Pos) -> Self {
        Self { owner, pos }
    }
}

/// Ordered, duplicate-free collection of threats.
///
/// Cloning produces an independent deep copy, which is how child nodes
/// inherit their parent's threats.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThreatLedger {
    entries: Vec<Threat>,
}

impl ThreatLedger {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Threat> {
        self.entries.iter()
    }

    #[inline]
    pub fn contains(&self, owner: Mark, pos: Pos) -> bool {
        self.entries.iter().any(|t| t.owner == owner && t.pos == pos)
    }

    /// Append a threat unless already present. Returns true if added.
    pub fn push(&mut self, threat: Threat) -> bool {
        if self.contains(threat.owner, threat.pos) {
            return false;
        }
        self.entries.push(threat);
        true
    }

    /// Number of threats owned by `owner`
    #[inline]
    pub fn count_for(&self, owner: Mark) -> usize {
        self.entries.iter().filter(|t| t.owner == owner).count()
    }

    /// Keep only the threats matching `keep`, preserving order
    pub fn retain<F: FnMut(&Threat) -> bool>(&mut self, keep: F) {
        self.entries.retain(keep);
    }
}

impl<'a> IntoIterator for &'a ThreatLedger {
    type Item = &'a Threat;
    type IntoIter = std::slice::Iter<'a, Threat>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Result of scanning one side of a move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunScan {
    /// Own marks directly adjacent to the move in this direction
    pub count: usize,
    /// Empty cell followed by more own marks, if the run continues past a gap
    pub skip: Option<Pos>,
    /// Own marks directly after the skip cell
    pub beyond_skip: usize,
}

/// Scan outward from `pos` along `dir` for marks of `mark`.
///
/// Stops at the board edge or an opponent mark. An empty cell ends the run
/// unless the next cell holds `mark`, in which case the empty cell becomes
/// the skip candidate and the own marks past it are counted.
pub fn scan_with_skip(board: &Board, pos: Pos, mark: Mark, dir: (isize, isize)) -> RunScan {
    let mut scan = RunScan::default();
    let mut distance = 1;

    while let Some(p) = board.step(pos, dir, distance) {
        match board.get(p) {
            m if m == mark => scan.count += 1,
            Mark::Empty => {
                let continues = board
                    .step(pos, dir, distance + 1)
                    .is_some_and(|next| board.get(next) == mark);
                if continues {
                    scan.skip = Some(p);
                    let mut beyond = distance + 1;
                    while let Some(q) = board.step(pos, dir, beyond) {
                        if board.get(q) != mark {
                            break;
                        }
                        scan.beyond_skip += 1;
                        beyond += 1;
                    }
                }
                break;
            }
            _ => break, // Opponent mark blocks
        }
        distance += 1;
    }

    scan
}

/// Add the threats created by `mv` (already applied to `board`).
///
/// A cell becomes a threat for the mover when filling it would bring the
/// line to at least `k`. The root sentinel move creates no threats.
pub fn derive_threats(board: &Board, mv: &Move, k: usize, ledger: &mut ThreatLedger) {
    let Some(pos) = mv.pos else {
        return;
    };
    for &dir in &DIRECTIONS {
        derive_in_direction(board, pos, mv.mark, dir, k, ledger);
    }
}

fn derive_in_direction(
    board: &Board,
    pos: Pos,
    mark: Mark,
    dir: (isize, isize),
    k: usize,
    ledger: &mut ThreatLedger,
) {
    let (dx, dy) = dir;
    let normal = scan_with_skip(board, pos, mark, dir);
    let reversed = scan_with_skip(board, pos, mark, (-dx, -dy));
    let counter = normal.count + reversed.count;

    for side in [&normal, &reversed] {
        if let Some(skip) = side.skip {
            if counter + side.beyond_skip + 2 >= k {
                ledger.push(Threat::new(mark, skip));
            }
        }
    }

    if counter + 2 >= k {
        let ends = [
            board.step(pos, dir, normal.count as isize + 1),
            board.step(pos, dir, -(reversed.count as isize + 1)),
        ];
        for end in ends.into_iter().flatten() {
            if board.is_empty(end) {
                ledger.push(Threat::new(mark, end));
            }
        }
    }
}

/// Drop the opponent's threats at the cell `mv` just filled
pub fn remove_blocked_threats(mv: &Move, ledger: &mut ThreatLedger) {
    let Some(pos) = mv.pos else {
        return;
    };
    ledger.retain(|t| !(t.pos == pos && t.owner != mv.mark));
}

/// Build the ledger for a starting position.
///
/// Every occupied cell is treated as if it had just been played. With
/// `k == 1` any single mark completes a line, so every empty cell is a
/// threat for both players.
pub fn initial_threats(board: &Board, k: usize) -> ThreatLedger {
    let mut ledger = ThreatLedger::new();
    for pos in board.positions() {
        let mark = board.get(pos);
        if mark != Mark::Empty {
            derive_threats(board, &Move::new(mark, pos), k, &mut ledger);
        }
    }
    if k == 1 {
        for pos in board.empty_positions() {
            ledger.push(Threat::new(Mark::First, pos));
            ledger.push(Threat::new(Mark::Second, pos));
        }
    }
    ledger
}
