use crate::pb::raft::RequestVoteRequest;
use crate::raft::election::Election;
use crate::raft::log::Log;
use crate::types::{NodeId, Term};

#[derive(Debug, PartialEq, Eq)]
pub enum VoteDecision {
    Grant,
    StaleTerm,
    AlreadyVoted(NodeId),
    OutdatedLog,
}

/// Decides whether a vote can be granted to the candidate of `req`.
///
/// The caller must have adopted the request term beforehand if it was higher,
/// so `req.term <= election.term` holds here.
pub fn decide_vote<L: Log>(election: &Election, req: &RequestVoteRequest, log: &L) -> VoteDecision {
    if req.term < election.term.get() {
        return VoteDecision::StaleTerm;
    }
    debug_assert_eq!(req.term, election.term.get());

    if let Some(id) = election.voted_for {
        if id != req.candidate_id {
            return VoteDecision::AlreadyVoted(id);
        }
    }

    if !log.is_up_to_date(Term::new(req.last_log_term), req.last_log_index) {
        return VoteDecision::OutdatedLog;
    }

    VoteDecision::Grant
}
