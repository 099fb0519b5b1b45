use super::error::ConnectionError;
use super::{PeerError, Transport};
use crate::pb::raft::{raft_client::RaftClient, RequestVoteRequest, RequestVoteResponse};
use crate::registry::ClusterRegistry;
use crate::types::NodeId;
use std::collections::HashMap;
use std::time::Duration;
use tonic::transport::{Channel, Endpoint};
use tonic::Code;

/// Sends RequestVote calls over gRPC.
///
/// Connections are established lazily, so a peer which is down at startup
/// only makes its own calls fail.
#[derive(Clone, Default)]
pub struct GrpcTransport {
    clients: HashMap<NodeId, RaftClient<Channel>>,
}

impl GrpcTransport {
    pub fn connect<R: ClusterRegistry>(
        id: NodeId,
        registry: &R,
        timeout: Duration,
    ) -> Result<Self, ConnectionError> {
        let mut clients = HashMap::new();
        for target_id in registry.peers_of(id) {
            let addr = match registry.endpoint(target_id) {
                Some(addr) => addr,
                None => {
                    tracing::warn!(id, target_id, "no endpoint is registered for {}", target_id);
                    continue;
                }
            };
            let channel = Endpoint::from_shared(format!("http://{}", addr))?
                .timeout(timeout)
                .connect_lazy()?;
            clients.insert(target_id, RaftClient::new(channel));
        }

        Ok(GrpcTransport { clients })
    }
}

#[tonic::async_trait]
impl Transport for GrpcTransport {
    async fn request_vote(
        &self,
        target_id: NodeId,
        req: RequestVoteRequest,
    ) -> Result<RequestVoteResponse, PeerError> {
        let mut client = self
            .clients
            .get(&target_id)
            .cloned()
            .ok_or_else(|| PeerError::Unreachable(format!("unknown node {}", target_id)))?;

        client
            .request_vote(req)
            .await
            .map(|r| r.into_inner())
            .map_err(|status| match status.code() {
                Code::DeadlineExceeded | Code::Cancelled => PeerError::TimedOut,
                _ => PeerError::Unreachable(status.to_string()),
            })
    }
}
