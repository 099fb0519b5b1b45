use super::error::HandleError;
use super::transport::{partition, Handle, PartitionedTransport, ResponseHandle};
use crate::configuration::Configuration;
use crate::pb::admin::{
    admin_server::Admin, ForceElectionTimeoutRequest, ForceElectionTimeoutResponse,
};
use crate::pb::raft::RequestVoteRequest;
use crate::raft::election::store::ElectionStore;
use crate::raft::node::{Node, NodeHandle};
use crate::registry::StaticRegistry;
use crate::service::admin::AdminService;
use crate::types::NodeId;
use std::collections::HashMap;
use std::sync::Arc;

/// Builds a group of in-process nodes whose every RequestVote is held
/// until the test passes or blocks it. Nodes are numbered from 1.
pub struct PartitionedLocalElectionGroupBuilder<S> {
    confs: Vec<Configuration>,
    stores: Vec<S>,
}

impl<S> PartitionedLocalElectionGroupBuilder<S> {
    pub fn new() -> Self {
        Self {
            confs: vec![],
            stores: vec![],
        }
    }

    pub fn stores(self, stores: Vec<S>) -> Self {
        Self { stores, ..self }
    }

    pub fn confs(self, confs: Vec<Configuration>) -> Self {
        Self { confs, ..self }
    }

    pub fn build(self) -> PartitionedLocalElectionGroup<S> {
        debug_assert_eq!(self.confs.len(), self.stores.len());
        PartitionedLocalElectionGroup {
            confs: self.confs,
            stores: self.stores,
        }
    }
}

impl<S> Default for PartitionedLocalElectionGroupBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}

pub struct PartitionedLocalElectionGroup<S> {
    confs: Vec<Configuration>,
    stores: Vec<S>,
}

impl<S> PartitionedLocalElectionGroup<S>
where
    S: ElectionStore,
{
    pub async fn spawn(self) -> PartitionedLocalElectionGroupHandle {
        const BUFFER: usize = 10;

        let ids: Vec<NodeId> = (1..=self.confs.len() as NodeId).collect();
        let registry = StaticRegistry::new(ids.clone());

        let mut nodes = HashMap::new();
        let members = self.confs.into_iter().zip(self.stores);
        for (&id, (conf, store)) in ids.iter().zip(members) {
            let node = Node::open(id, Arc::new(conf), store, registry.clone()).await;
            nodes.insert(id, node);
        }

        let node_handles: HashMap<NodeId, NodeHandle> = nodes
            .iter()
            .map(|(&id, node)| (id, node.handle()))
            .collect();

        let mut transports = HashMap::new();
        let mut raft_handles = HashMap::new();
        for &src_id in &ids {
            let mut transport = PartitionedTransport::default();
            let mut handles = HashMap::new();
            for (&dst_id, node) in &node_handles {
                if src_id == dst_id {
                    continue;
                }
                let (route, handle) = partition(node.clone(), BUFFER);
                transport = transport.route(dst_id, route);
                handles.insert(dst_id, handle);
            }
            transports.insert(src_id, transport);
            raft_handles.insert(src_id, handles);
        }

        let admin_services: HashMap<NodeId, _> = node_handles
            .iter()
            .map(|(&id, node)| (id, AdminService::new(node.clone())))
            .collect();

        for (id, node) in nodes {
            if let Some(transport) = transports.remove(&id) {
                tokio::spawn(node.run(transport));
            }
        }

        PartitionedLocalElectionGroupHandle {
            handles: raft_handles,
            nodes: node_handles,
            admin_services,
        }
    }
}

pub struct PartitionedLocalElectionGroupHandle {
    handles: HashMap<NodeId, HashMap<NodeId, Handle>>,
    nodes: HashMap<NodeId, NodeHandle>,
    admin_services: HashMap<NodeId, AdminService>,
}

impl PartitionedLocalElectionGroupHandle {
    /// Returns the handle of the link from node `i` to node `j`.
    pub fn raft_handle(&self, i: NodeId, j: NodeId) -> Result<&Handle, HandleError> {
        self.handles
            .get(&i)
            .and_then(|h| h.get(&j))
            .ok_or(HandleError::UnknownRoute)
    }

    pub fn node(&self, i: NodeId) -> &NodeHandle {
        &self.nodes[&i]
    }

    pub fn admin_service(&self, i: NodeId) -> &AdminService {
        &self.admin_services[&i]
    }

    pub async fn force_election_timeout(
        &self,
        i: NodeId,
    ) -> Result<tonic::Response<ForceElectionTimeoutResponse>, tonic::Status> {
        self.admin_service(i)
            .force_election_timeout(tonic::Request::new(ForceElectionTimeoutRequest {}))
            .await
    }

    pub async fn pass_request_vote_request(
        &self,
        i: NodeId,
        j: NodeId,
    ) -> Result<(RequestVoteRequest, ResponseHandle), HandleError> {
        self.raft_handle(i, j)?.pass_request_vote_request().await
    }

    pub async fn block_request_vote_request(
        &self,
        i: NodeId,
        j: NodeId,
    ) -> Result<RequestVoteRequest, HandleError> {
        self.raft_handle(i, j)?.block_request_vote_request().await
    }

    pub async fn expect_request_vote_success(&self, i: NodeId, j: NodeId) {
        self.raft_handle(i, j)
            .expect("route must exist")
            .expect_request_vote_success()
            .await;
    }

    pub async fn shutdown(&self) {
        for node in self.nodes.values() {
            let _ = node.shutdown().await;
        }
    }
}
