use super::{PeerError, Transport};
use crate::pb::raft::{RequestVoteRequest, RequestVoteResponse};
use crate::raft::node::NodeHandle;
use crate::types::NodeId;
use std::collections::HashMap;

/// Delivers RequestVote calls to nodes running in the same process.
#[derive(Clone, Default)]
pub struct LocalTransport {
    nodes: HashMap<NodeId, NodeHandle>,
}

impl LocalTransport {
    pub fn new<I: IntoIterator<Item = NodeHandle>>(nodes: I) -> Self {
        Self {
            nodes: nodes.into_iter().map(|h| (h.id(), h)).collect(),
        }
    }
}

#[tonic::async_trait]
impl Transport for LocalTransport {
    async fn request_vote(
        &self,
        target_id: NodeId,
        req: RequestVoteRequest,
    ) -> Result<RequestVoteResponse, PeerError> {
        let node = self
            .nodes
            .get(&target_id)
            .ok_or_else(|| PeerError::Unreachable(format!("unknown node {}", target_id)))?;

        node.request_vote(req)
            .await
            .map_err(|e| PeerError::Unreachable(e.to_string()))
    }
}
