pub mod store;
pub(crate) mod timer;

use crate::types::{NodeId, Term};

/// The part of a node's state which must survive restarts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Election {
    pub term: Term,
    /// The candidate this node voted for in `term`.
    pub voted_for: Option<NodeId>,
}

impl Election {
    pub fn new(term: Term, voted_for: Option<NodeId>) -> Self {
        Self { term, voted_for }
    }

    /// Moves to `term`, forgetting the vote cast in the previous term.
    pub fn advance(&self, term: Term) -> Self {
        debug_assert!(term >= self.term, "term must not decrease");
        Self {
            term,
            voted_for: None,
        }
    }

    /// Records a vote for `candidate_id` in the current term.
    pub fn vote(&self, candidate_id: NodeId) -> Self {
        debug_assert!(
            self.can_vote_for(candidate_id),
            "already voted for {:?} in term {}",
            self.voted_for,
            self.term,
        );
        Self {
            term: self.term,
            voted_for: Some(candidate_id),
        }
    }

    pub fn can_vote_for(&self, candidate_id: NodeId) -> bool {
        match self.voted_for {
            None => true,
            Some(id) => id == candidate_id,
        }
    }
}

/// Number of votes needed to win an election in a cluster of `cluster_size` nodes.
pub fn quorum(cluster_size: usize) -> usize {
    cluster_size / 2 + 1
}
