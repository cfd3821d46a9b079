//! Search module for the m,n,k solver
//!
//! Contains:
//! - Proof and disproof numbers with an explicit infinity
//! - Threat ledger and threat derivation
//! - Proof-number search over an AND/OR tree

pub mod pns;
pub mod proof;
pub mod threat;

pub use pns::{candidate_moves, NodeKind, NodeValue, ProofNumberSearch, SearchOutcome, SearchStats};
pub use proof::ProofNumber;
pub use threat::{
    derive_threats, initial_threats, remove_blocked_threats, scan_with_skip, RunScan, Threat,
    ThreatLedger,
};
