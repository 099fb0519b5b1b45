use super::error::GroupError;
use crate::configuration::Configuration;
use crate::pb::admin::admin_server::AdminServer;
use crate::pb::raft::raft_server::RaftServer;
use crate::raft::election::store::ElectionStore;
use crate::raft::node::Node;
use crate::raft::peer::grpc::GrpcTransport;
use crate::raft::service::RaftService;
use crate::registry::StaticRegistry;
use crate::service::admin::AdminService;
use crate::types::NodeId;
use std::sync::Arc;
use tonic::transport::Server;

/// A node of a group whose members talk over gRPC.
pub struct GrpcElectionGroup<S> {
    id: NodeId,
    conf: Configuration,
    store: S,
}

impl<S> GrpcElectionGroup<S>
where
    S: ElectionStore,
{
    pub fn new(id: NodeId, conf: Configuration, store: S) -> Self {
        GrpcElectionGroup { id, conf, store }
    }

    pub async fn run(self) -> Result<(), GroupError> {
        let id = self.id;
        let conf = Arc::new(self.conf);
        let conf_node = conf
            .group
            .nodes
            .get(&id)
            .ok_or(GroupError::UnknownNode(id))?;
        let raft_addr = conf_node.raft_addr();
        let admin_addr = conf_node.admin_addr();

        let registry = StaticRegistry::from(&conf.group);
        let transport =
            GrpcTransport::connect(id, &registry, conf.election.request_vote_timeout())?;
        let node = Node::open(id, conf.clone(), self.store, registry).await;

        let server =
            Server::builder().add_service(RaftServer::new(RaftService::new(node.handle())));
        tracing::info!(
            id,
            "start serving gRPC Raft interface on {} for inter-cluster communication",
            raft_addr
        );
        tokio::spawn(async move {
            if let Err(e) = server.serve(raft_addr).await {
                tracing::error!(id, "gRPC Raft interface stopped: {}", e);
            }
        });

        let server =
            Server::builder().add_service(AdminServer::new(AdminService::new(node.handle())));
        tracing::info!(id, "start serving gRPC Admin interface on {}", admin_addr);
        tokio::spawn(async move {
            if let Err(e) = server.serve(admin_addr).await {
                tracing::error!(id, "gRPC Admin interface stopped: {}", e);
            }
        });

        node.run(transport).await;
        Ok(())
    }
}
