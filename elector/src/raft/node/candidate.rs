use crate::pb::raft::RequestVoteResponse;
use crate::raft::election::quorum;
use crate::types::{NodeId, Term};
use std::collections::{BTreeSet, HashSet};

#[derive(Debug, PartialEq, Eq)]
pub enum Tally {
    Pending,
    /// Got a majority of the cluster.
    Won,
    /// Every peer has answered and there is no majority.
    Lost,
}

/// Vote count of one candidacy.
pub struct Candidate {
    id: NodeId,
    term: Term,
    peers: BTreeSet<NodeId>,
    votes: HashSet<NodeId>,
    responded: HashSet<NodeId>,
    quorum: usize,
}

impl Candidate {
    pub fn new(id: NodeId, term: Term, peers: BTreeSet<NodeId>) -> Self {
        let quorum = quorum(peers.len() + 1);
        let mut votes = HashSet::new();
        votes.insert(id);

        Candidate {
            id,
            term,
            peers,
            votes,
            responded: HashSet::new(),
            quorum,
        }
    }

    pub fn tally(&self) -> Tally {
        if self.votes.len() >= self.quorum {
            Tally::Won
        } else if self.responded.len() == self.peers.len() {
            Tally::Lost
        } else {
            Tally::Pending
        }
    }

    pub fn votes(&self) -> usize {
        self.votes.len()
    }

    pub fn handle_request_vote_response(&mut self, res: &RequestVoteResponse, id: NodeId) -> Tally {
        if !self.peers.contains(&id) {
            tracing::debug!(
                id = self.id,
                term = self.term.get(),
                target_id = id,
                "ignored vote from {}, which is not a member of the cluster",
                id,
            );
            return self.tally();
        }

        if self.term.get() != res.term {
            tracing::debug!(
                id = self.id,
                term = self.term.get(),
                target_id = id,
                "ignored vote from {}, which belongs to the different term: {}",
                id,
                res.term,
            );
            return self.tally();
        }

        if !self.responded.insert(id) {
            tracing::debug!(
                id = self.id,
                term = self.term.get(),
                target_id = id,
                "ignored a second response from {} in the current term",
                id,
            );
            return self.tally();
        }

        if res.vote_granted {
            self.votes.insert(id);
            tracing::debug!(
                id = self.id,
                term = self.term.get(),
                target_id = id,
                "received valid vote from {}",
                id
            );
        } else {
            tracing::debug!(
                id = self.id,
                term = self.term.get(),
                target_id = id,
                "vote requested to {} was refused",
                id
            );
        }

        self.tally()
    }

    /// Counts a peer that could not be reached as not granting its vote.
    pub fn handle_request_vote_failure(&mut self, id: NodeId) -> Tally {
        if self.peers.contains(&id) {
            self.responded.insert(id);
        }
        self.tally()
    }
}
