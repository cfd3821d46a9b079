//! Proof-number search over an explicit AND/OR tree
//!
//! The tree is an arena of nodes addressed by index. Nodes store only the
//! move that led to them and derived bookkeeping; the single shared
//! [`Board`] is updated in place while walking the tree (apply on the way
//! down, undo on the way up), so at any time it reflects the path from the
//! root to the node being visited.
//!
//! # Algorithm
//!
//! 1. Evaluate and score the root
//! 2. Until the root is proven or disproven:
//!    - select the most-proving node starting from the current node
//!    - expand it (generate, evaluate and score children)
//!    - update ancestors until their numbers stop changing
//! 3. A disproven root is either a loss or a draw; a dedicated pass over
//!    the tree tells them apart
//!
//! # Example
//!
//! ```
//! use nmk::board::{Board, Mark};
//! use nmk::search::{initial_threats, ProofNumberSearch, SearchOutcome};
//!
//! let mut board = Board::new(3, 1);
//! let threats = initial_threats(&board, 2);
//! let mut search = ProofNumberSearch::new(&mut board, 2, Mark::First, threats);
//! assert_eq!(search.run(), SearchOutcome::Win);
//! ```

use log::{debug, trace};

use crate::board::{Board, Mark, Move};

use super::proof::ProofNumber;
use super::threat::{derive_threats, remove_blocked_threats, ThreatLedger};

/// Index of a node in the search arena
pub type NodeId = usize;

const ROOT: NodeId = 0;

/// AND nodes are where the opponent chooses, OR nodes where the engine's
/// player chooses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    And,
    Or,
}

impl NodeKind {
    #[inline]
    pub fn opposite(self) -> NodeKind {
        match self {
            NodeKind::And => NodeKind::Or,
            NodeKind::Or => NodeKind::And,
        }
    }
}

/// Game-theoretic value assigned by evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeValue {
    Unknown,
    /// Win for the engine's player
    Proven,
    /// Win for the opponent
    Disproven,
    Drawn,
}

/// Result of the search, from the engine's player's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    Win,
    Draw,
    Loss,
}

/// Search statistics for diagnostics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Nodes allocated, root included
    pub nodes_created: u64,
    /// Nodes expanded by the main loop
    pub nodes_expanded: u64,
    /// Main loop iterations
    pub iterations: u64,
    /// Whether the draw-detection pass decided the outcome
    pub draw_pass: bool,
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
    proof: ProofNumber,
    disproof: ProofNumber,
    expanded: bool,
    evaluated: bool,
    mv: Move,
    value: NodeValue,
    threats: ThreatLedger,
}

impl Node {
    fn new(parent: Option<NodeId>, mv: Move, kind: NodeKind, threats: ThreatLedger) -> Self {
        Self {
            parent,
            children: Vec::new(),
            kind,
            proof: ProofNumber::ONE,
            disproof: ProofNumber::ONE,
            expanded: false,
            evaluated: false,
            mv,
            value: NodeValue::Unknown,
            threats,
        }
    }
}

/// Value of a node whose game is decided in favour of `winner`
#[inline]
fn value_for(winner: Mark, player: Mark) -> NodeValue {
    if winner == player {
        NodeValue::Proven
    } else {
        NodeValue::Disproven
    }
}

/// Moves available to `to_move` given the threats on the path.
///
/// Once the opponent owns a threat only the threat cells are worth
/// playing: completing our own threats or blocking theirs. Otherwise every
/// empty cell is a candidate, in row-major order.
pub fn candidate_moves(board: &Board, to_move: Mark, threats: &ThreatLedger) -> Vec<Move> {
    if threats.count_for(to_move.opponent()) > 0 {
        return threats
            .iter()
            .filter(|t| t.owner != to_move)
            .map(|t| Move::new(to_move, t.pos))
            .collect();
    }
    board
        .empty_positions()
        .map(|pos| Move::new(to_move, pos))
        .collect()
}

/// Proof-number searcher for one position.
///
/// The engine's `player` is the side to move at the root.
pub struct ProofNumberSearch<'a> {
    board: &'a mut Board,
    k: usize,
    player: Mark,
    nodes: Vec<Node>,
    stats: SearchStats,
}

impl<'a> ProofNumberSearch<'a> {
    /// Create a searcher whose root carries `threats`
    pub fn new(board: &'a mut Board, k: usize, player: Mark, threats: ThreatLedger) -> Self {
        let root = Node::new(None, Move::unknown(player.opponent()), NodeKind::Or, threats);
        Self {
            board,
            k,
            player,
            nodes: vec![root],
            stats: SearchStats {
                nodes_created: 1,
                ..SearchStats::default()
            },
        }
    }

    /// Run the search to completion.
    ///
    /// The board is back in its starting state when this returns.
    pub fn run(&mut self) -> SearchOutcome {
        self.evaluate(ROOT);
        self.set_numbers(ROOT);

        let mut current = ROOT;
        while !self.is_solved() {
            current = self.step(current);
        }
        debug_assert_eq!(current, ROOT);

        let outcome = self.conclude();
        debug!(
            "search finished: {:?} (created={}, expanded={}, iterations={}, draw_pass={})",
            outcome,
            self.stats.nodes_created,
            self.stats.nodes_expanded,
            self.stats.iterations,
            self.stats.draw_pass
        );
        outcome
    }

    #[inline]
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Root proof and disproof numbers
    #[inline]
    pub fn root_numbers(&self) -> (ProofNumber, ProofNumber) {
        (self.nodes[ROOT].proof, self.nodes[ROOT].disproof)
    }

    #[inline]
    fn is_solved(&self) -> bool {
        let root = &self.nodes[ROOT];
        root.proof.is_zero() || root.disproof.is_zero()
    }

    /// One main-loop iteration starting from `current`; returns the next
    /// current node
    fn step(&mut self, current: NodeId) -> NodeId {
        self.stats.iterations += 1;
        let most_proving = self.select_most_proving(current);
        self.expand(most_proving);
        self.update_ancestors(most_proving)
    }

    fn conclude(&mut self) -> SearchOutcome {
        let root = &self.nodes[ROOT];
        let (proof, value) = (root.proof, root.value);
        if proof.is_zero() {
            return SearchOutcome::Win;
        }
        match value {
            NodeValue::Drawn => SearchOutcome::Draw,
            NodeValue::Disproven => SearchOutcome::Loss,
            NodeValue::Proven => SearchOutcome::Win,
            NodeValue::Unknown => {
                self.stats.draw_pass = true;
                if self.detect_draw(ROOT) {
                    SearchOutcome::Draw
                } else {
                    SearchOutcome::Loss
                }
            }
        }
    }

    /// Assign a value to a node whose move is on the board
    fn evaluate(&mut self, id: NodeId) {
        let board: &Board = &*self.board;
        let player = self.player;
        let k = self.k;
        let node = &mut self.nodes[id];
        node.evaluated = true;

        let mv = node.mv;
        let mover = mv.mark;
        let to_move = mover.opponent();

        // Filled one of our own threats: line completed
        if mv.pos.is_some_and(|pos| node.threats.contains(mover, pos)) {
            node.value = value_for(mover, player);
            return;
        }
        remove_blocked_threats(&mv, &mut node.threats);
        if board.is_full() {
            node.value = NodeValue::Drawn;
            return;
        }
        // The side to move completes its threat next turn
        if node.threats.count_for(to_move) >= 1 {
            node.value = value_for(to_move, player);
            return;
        }
        derive_threats(board, &mv, k, &mut node.threats);
        // Two threats cannot both be blocked
        if node.threats.count_for(mover) >= 2 {
            node.value = value_for(mover, player);
        }
    }

    fn set_numbers(&mut self, id: NodeId) {
        let node = &self.nodes[id];
        let (proof, disproof) = if !node.expanded {
            match node.value {
                NodeValue::Proven => (ProofNumber::ZERO, ProofNumber::Infinite),
                NodeValue::Disproven | NodeValue::Drawn => {
                    (ProofNumber::Infinite, ProofNumber::ZERO)
                }
                NodeValue::Unknown => (ProofNumber::ONE, ProofNumber::ONE),
            }
        } else {
            let proofs = node.children.iter().map(|&c| self.nodes[c].proof);
            let disproofs = node.children.iter().map(|&c| self.nodes[c].disproof);
            match node.kind {
                NodeKind::And => (ProofNumber::sum(proofs), ProofNumber::min_of(disproofs)),
                NodeKind::Or => (ProofNumber::min_of(proofs), ProofNumber::sum(disproofs)),
            }
        };
        let node = &mut self.nodes[id];
        node.proof = proof;
        node.disproof = disproof;
    }

    /// Child responsible for the node's current numbers
    fn proving_child(&self, id: NodeId) -> Option<NodeId> {
        let node = &self.nodes[id];
        if !node.expanded {
            return None;
        }
        node.children.iter().copied().find(|&c| {
            let child = &self.nodes[c];
            match node.kind {
                NodeKind::Or => child.proof == node.proof,
                NodeKind::And => child.disproof == node.disproof,
            }
        })
    }

    fn select_most_proving(&mut self, from: NodeId) -> NodeId {
        let mut id = from;
        while let Some(child) = self.proving_child(id) {
            let mv = self.nodes[child].mv;
            self.board.apply(&mv);
            id = child;
        }
        id
    }

    /// Create the children of a node whose move is on the board
    fn generate_children(&mut self, id: NodeId) {
        if self.board.is_full() {
            return;
        }
        let node = &self.nodes[id];
        let kind = node.kind.opposite();
        let moves = candidate_moves(self.board, node.mv.mark.opponent(), &node.threats);

        for mv in moves {
            let child = Node::new(Some(id), mv, kind, self.nodes[id].threats.clone());
            let child_id = self.nodes.len();
            self.nodes.push(child);
            self.nodes[id].children.push(child_id);
            self.stats.nodes_created += 1;
        }
    }

    fn expand(&mut self, id: NodeId) {
        self.generate_children(id);
        let kind = self.nodes[id].kind;

        for i in 0..self.nodes[id].children.len() {
            let child = self.nodes[id].children[i];
            let mv = self.nodes[child].mv;
            self.board.apply(&mv);
            self.evaluate(child);
            self.set_numbers(child);
            self.board.undo(&mv);

            let child = &self.nodes[child];
            let refuted = match kind {
                NodeKind::And => child.disproof.is_zero(),
                NodeKind::Or => child.proof.is_zero(),
            };
            if refuted {
                break;
            }
        }

        self.nodes[id].expanded = true;
        self.stats.nodes_expanded += 1;
        trace!(
            "expanded node {} ({:?}, move {:?}) into {} children",
            id,
            kind,
            self.nodes[id].mv,
            self.nodes[id].children.len()
        );
    }

    /// Recompute numbers from `id` upward, undoing moves on the way.
    ///
    /// Stops at the first node whose numbers did not change, or at the root.
    fn update_ancestors(&mut self, id: NodeId) -> NodeId {
        let mut id = id;
        loop {
            let before = (self.nodes[id].proof, self.nodes[id].disproof);
            self.set_numbers(id);
            let node = &self.nodes[id];
            if (node.proof, node.disproof) == before {
                return id;
            }
            let Some(parent) = node.parent else {
                return id;
            };
            let mv = node.mv;
            self.board.undo(&mv);
            id = parent;
        }
    }

    /// Whether the engine's player can force at least a draw from `id`.
    ///
    /// Walks the existing tree, evaluating and generating children on
    /// demand where the main loop stopped early.
    fn detect_draw(&mut self, id: NodeId) -> bool {
        if self.nodes[id].children.is_empty() {
            if !self.nodes[id].evaluated {
                self.evaluate(id);
            }
            match self.nodes[id].value {
                NodeValue::Unknown => {
                    self.generate_children(id);
                    self.nodes[id].expanded = true;
                }
                value => return matches!(value, NodeValue::Drawn | NodeValue::Proven),
            }
        }

        let kind = self.nodes[id].kind;
        for i in 0..self.nodes[id].children.len() {
            let child = self.nodes[id].children[i];
            let mv = self.nodes[child].mv;
            self.board.apply(&mv);
            let drawable = self.detect_draw(child);
            self.board.undo(&mv);

            match kind {
                NodeKind::And if !drawable => return false,
                NodeKind::Or if drawable => return true,
                _ => {}
            }
        }
        kind == NodeKind::And
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Pos;
    use crate::search::threat::{initial_threats, Threat};

    fn board_with(width: usize, height: usize, marks: &[(Mark, usize, usize)]) -> Board {
        let mut board = Board::new(width, height);
        for &(mark, x, y) in marks {
            board.apply(&Move::new(mark, Pos::new(x, y)));
        }
        board
    }

    fn solve(board: &mut Board, k: usize, player: Mark) -> (SearchOutcome, SearchStats) {
        let threats = initial_threats(board, k);
        let mut search = ProofNumberSearch::new(board, k, player, threats);
        let outcome = search.run();
        (outcome, search.stats().clone())
    }

    impl ProofNumberSearch<'_> {
        /// Expanded nodes must match the AND/OR rules for their children
        fn assert_numbers_consistent(&self) {
            for (id, node) in self.nodes.iter().enumerate() {
                if !node.expanded {
                    assert!(node.children.is_empty(), "unexpanded node {} has children", id);
                    continue;
                }
                let proofs = node.children.iter().map(|&c| self.nodes[c].proof);
                let disproofs = node.children.iter().map(|&c| self.nodes[c].disproof);
                let expected = match node.kind {
                    NodeKind::And => (ProofNumber::sum(proofs), ProofNumber::min_of(disproofs)),
                    NodeKind::Or => (ProofNumber::min_of(proofs), ProofNumber::sum(disproofs)),
                };
                assert_eq!((node.proof, node.disproof), expected, "node {}", id);
                for &c in &node.children {
                    assert_eq!(self.nodes[c].kind, node.kind.opposite());
                    assert_eq!(self.nodes[c].parent, Some(id));
                }
            }
        }

        fn path_moves(&self, id: NodeId) -> Vec<Move> {
            let mut moves = Vec::new();
            let mut id = id;
            while let Some(parent) = self.nodes[id].parent {
                moves.push(self.nodes[id].mv);
                id = parent;
            }
            moves.reverse();
            moves
        }
    }

    #[test]
    fn test_candidate_moves_all_empty_cells() {
        let board = board_with(2, 2, &[(Mark::First, 1, 0)]);
        let moves = candidate_moves(&board, Mark::Second, &ThreatLedger::new());
        let cells: Vec<Pos> = moves.iter().filter_map(|m| m.pos).collect();
        assert_eq!(cells, vec![Pos::new(0, 0), Pos::new(0, 1), Pos::new(1, 1)]);
        assert!(moves.iter().all(|m| m.mark == Mark::Second));
    }

    #[test]
    fn test_candidate_moves_forced_by_threat() {
        let board = Board::new(3, 3);
        let mut threats = ThreatLedger::new();
        threats.push(Threat::new(Mark::Second, Pos::new(2, 2)));
        threats.push(Threat::new(Mark::First, Pos::new(0, 2)));
        let moves = candidate_moves(&board, Mark::First, &threats);
        assert_eq!(moves, vec![Move::new(Mark::First, Pos::new(2, 2))]);
    }

    #[test]
    fn test_candidate_moves_ignore_own_threats_without_pressure() {
        let board = Board::new(2, 1);
        let mut threats = ThreatLedger::new();
        threats.push(Threat::new(Mark::First, Pos::new(1, 0)));
        let moves = candidate_moves(&board, Mark::First, &threats);
        assert_eq!(moves.len(), 2);
    }

    #[test]
    fn test_root_threat_wins_without_expansion() {
        let mut board = board_with(
            3,
            3,
            &[(Mark::First, 0, 0), (Mark::First, 0, 1), (Mark::Second, 1, 0)],
        );
        let (outcome, stats) = solve(&mut board, 3, Mark::First);
        assert_eq!(outcome, SearchOutcome::Win);
        assert_eq!(stats.nodes_expanded, 0);
        assert_eq!(stats.nodes_created, 1);
    }

    #[test]
    fn test_opponent_double_threat_loses() {
        let mut board = board_with(
            3,
            3,
            &[
                (Mark::Second, 0, 0),
                (Mark::Second, 0, 1),
                (Mark::Second, 1, 0),
                (Mark::First, 1, 1),
                (Mark::First, 2, 1),
            ],
        );
        let (outcome, stats) = solve(&mut board, 3, Mark::First);
        assert_eq!(outcome, SearchOutcome::Loss);
        assert_eq!(stats.nodes_expanded, 0);
    }

    #[test]
    fn test_full_board_is_draw() {
        let mut board = board_with(
            2,
            2,
            &[
                (Mark::First, 0, 0),
                (Mark::Second, 1, 0),
                (Mark::Second, 0, 1),
                (Mark::First, 1, 1),
            ],
        );
        for player in [Mark::First, Mark::Second] {
            let (outcome, _) = solve(&mut board, 3, player);
            assert_eq!(outcome, SearchOutcome::Draw);
        }
    }

    #[test]
    fn test_center_of_short_row_wins() {
        let mut board = Board::new(3, 1);
        let (outcome, stats) = solve(&mut board, 2, Mark::First);
        assert_eq!(outcome, SearchOutcome::Win);
        assert_eq!(stats.nodes_expanded, 1);
        assert_eq!(board, Board::new(3, 1));
    }

    #[test]
    fn test_two_by_two_first_mover_wins() {
        let mut board = Board::new(2, 2);
        let (outcome, _) = solve(&mut board, 2, Mark::Second);
        assert_eq!(outcome, SearchOutcome::Win);
    }

    #[test]
    fn test_single_cell_k1_wins() {
        let mut board = Board::new(1, 1);
        let (outcome, _) = solve(&mut board, 1, Mark::First);
        assert_eq!(outcome, SearchOutcome::Win);
    }

    #[test]
    fn test_tic_tac_toe_is_draw() {
        let mut board = Board::new(3, 3);
        let (outcome, stats) = solve(&mut board, 3, Mark::First);
        assert_eq!(outcome, SearchOutcome::Draw);
        assert!(stats.nodes_expanded > 0);
        assert_eq!(board, Board::new(3, 3));
    }

    #[test]
    fn test_numbers_and_board_track_every_step() {
        let mut board = Board::new(3, 3);
        let initial = board.clone();
        let threats = initial_threats(&board, 3);
        let mut search = ProofNumberSearch::new(&mut board, 3, Mark::First, threats);

        search.evaluate(ROOT);
        search.set_numbers(ROOT);
        let mut current = ROOT;
        while !search.is_solved() {
            current = search.step(current);
            search.assert_numbers_consistent();

            let mut expected = initial.clone();
            for mv in search.path_moves(current) {
                expected.apply(&mv);
            }
            assert_eq!(*search.board, expected);
        }
        assert_eq!(current, ROOT);
        assert_eq!(*search.board, initial);

        let (proof, disproof) = search.root_numbers();
        assert!(proof.is_infinite());
        assert!(disproof.is_zero());
    }

    #[test]
    fn test_draw_pass_marks_generated_nodes_expanded() {
        let mut board = Board::new(3, 3);
        let threats = initial_threats(&board, 3);
        let mut search = ProofNumberSearch::new(&mut board, 3, Mark::First, threats);
        assert_eq!(search.run(), SearchOutcome::Draw);
        assert!(search.stats().draw_pass);

        for (id, node) in search.nodes.iter().enumerate() {
            assert!(
                node.expanded || node.children.is_empty(),
                "node {} has children but is not expanded",
                id
            );
        }
    }
}
