//! Proof and disproof numbers
//!
//! Numbers are either finite or `Infinite`. Addition saturates to
//! `Infinite`, so summing children can never wrap around.

use std::fmt;

/// A proof or disproof number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ProofNumber {
    Finite(u64),
    /// The node can never be (dis)proven
    Infinite,
}

impl ProofNumber {
    pub const ZERO: ProofNumber = ProofNumber::Finite(0);
    pub const ONE: ProofNumber = ProofNumber::Finite(1);

    #[inline]
    pub fn is_zero(self) -> bool {
        self == Self::ZERO
    }

    #[inline]
    pub fn is_infinite(self) -> bool {
        self == ProofNumber::Infinite
    }

    /// Sum that clamps to `Infinite` on overflow or an infinite operand
    #[inline]
    pub fn saturating_add(self, other: ProofNumber) -> ProofNumber {
        match (self, other) {
            (ProofNumber::Finite(a), ProofNumber::Finite(b)) => a
                .checked_add(b)
                .map_or(ProofNumber::Infinite, ProofNumber::Finite),
            _ => ProofNumber::Infinite,
        }
    }

    /// Saturating sum; zero for an empty iterator
    pub fn sum<I: IntoIterator<Item = ProofNumber>>(numbers: I) -> ProofNumber {
        numbers
            .into_iter()
            .fold(Self::ZERO, ProofNumber::saturating_add)
    }

    /// Minimum; `Infinite` for an empty iterator
    pub fn min_of<I: IntoIterator<Item = ProofNumber>>(numbers: I) -> ProofNumber {
        numbers.into_iter().min().unwrap_or(ProofNumber::Infinite)
    }
}

impl fmt::Display for ProofNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProofNumber::Finite(n) => write!(f, "{}", n),
            ProofNumber::Infinite => write!(f, "inf"),
        }
    }
}
