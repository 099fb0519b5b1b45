pub mod error;
pub mod grpc;
pub mod local;

pub use self::error::{ConnectionError, PeerError};

use crate::pb::raft::{RequestVoteRequest, RequestVoteResponse};
use crate::types::NodeId;

/// Channel which carries RequestVote calls to other members of the cluster.
///
/// An implementation should bound every call with its own timeout;
/// failures are reported as [`PeerError`] and never retried by the caller.
#[tonic::async_trait]
pub trait Transport: Clone + Send + Sync + 'static {
    async fn request_vote(
        &self,
        target_id: NodeId,
        req: RequestVoteRequest,
    ) -> Result<RequestVoteResponse, PeerError>;
}
