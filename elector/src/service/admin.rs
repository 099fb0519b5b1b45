use crate::pb::admin::{
    admin_server::Admin, ForceElectionTimeoutRequest, ForceElectionTimeoutResponse,
    StatusRequest, StatusResponse,
};
use crate::raft::node::NodeHandle;
use tonic::{Request, Response, Status};

/// Operator interface of a node.
#[derive(Clone)]
pub struct AdminService {
    node: NodeHandle,
}

impl AdminService {
    pub fn new(node: NodeHandle) -> Self {
        Self { node }
    }
}

#[tonic::async_trait]
impl Admin for AdminService {
    async fn force_election_timeout(
        &self,
        _request: Request<ForceElectionTimeoutRequest>,
    ) -> Result<Response<ForceElectionTimeoutResponse>, Status> {
        self.node
            .force_election_timeout()
            .await
            .map(|_| Response::new(ForceElectionTimeoutResponse {}))
            .map_err(|e| e.into_status())
    }

    async fn status(
        &self,
        _request: Request<StatusRequest>,
    ) -> Result<Response<StatusResponse>, Status> {
        Ok(Response::new(StatusResponse::from(&self.node.status())))
    }
}
