use crate::pb::raft::raft_server::Raft;
use crate::pb::raft::{RequestVoteRequest, RequestVoteResponse};
use crate::raft::node::NodeHandle;
use tonic::{Request, Response, Status};

#[derive(Clone)]
pub struct RaftService {
    node: NodeHandle,
}

impl RaftService {
    pub fn new(node: NodeHandle) -> Self {
        Self { node }
    }
}

#[tonic::async_trait]
impl Raft for RaftService {
    async fn request_vote(
        &self,
        request: Request<RequestVoteRequest>,
    ) -> Result<Response<RequestVoteResponse>, Status> {
        self.node
            .request_vote(request.into_inner())
            .await
            .map(Response::new)
            .map_err(|e| e.into_status())
    }
}
