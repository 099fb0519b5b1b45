use std::{fmt, ops::Add};

pub use elector_common::types::NodeId;

pub type LogIndex = u64;

/// Logical clock of the cluster. Each term has at most one leader.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Eq, Ord, Hash)]
pub struct Term(u64);

impl Term {
    pub fn new(term: u64) -> Self {
        Self(term)
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

impl Add<u64> for Term {
    type Output = Self;

    fn add(self, rhs: u64) -> Self::Output {
        Term::new(self.0 + rhs)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
