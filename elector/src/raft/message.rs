use crate::pb::raft::{RequestVoteRequest, RequestVoteResponse};
use crate::raft::peer::PeerError;
use crate::types::{NodeId, Term};
use tokio::sync::oneshot;

pub enum Message {
    RPCRequestVoteRequest {
        req: RequestVoteRequest,
        tx: oneshot::Sender<RequestVoteResponse>,
    },

    /// Response to a RequestVote this node sent as a candidate in `term`.
    RPCRequestVoteResponse {
        res: RequestVoteResponse,
        id: NodeId,
        term: Term,
    },

    RPCRequestVoteFailure {
        error: PeerError,
        id: NodeId,
        term: Term,
    },

    /// Valid traffic from the leader of `term` was observed.
    LeaderObserved {
        leader_id: NodeId,
        term: Term,
        tx: oneshot::Sender<Term>,
    },

    ElectionTimeout,

    Shutdown,
}
