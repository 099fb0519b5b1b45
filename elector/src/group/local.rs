use super::error::GroupError;
use crate::configuration::Configuration;
use crate::raft::election::store::ElectionStore;
use crate::raft::node::{Node, NodeHandle, NodeStatus, RoleKind};
use crate::raft::peer::local::LocalTransport;
use crate::registry::StaticRegistry;
use crate::types::NodeId;
use futures::future;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Builds a group of nodes which run in this process. Nodes are numbered from 1.
pub struct LocalElectionGroupBuilder<S> {
    confs: Vec<Configuration>,
    stores: Vec<S>,
}

impl<S> LocalElectionGroupBuilder<S> {
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

    pub fn build(self) -> LocalElectionGroup<S> {
        debug_assert_eq!(self.confs.len(), self.stores.len());
        LocalElectionGroup {
            confs: self.confs,
            stores: self.stores,
        }
    }
}

impl<S> Default for LocalElectionGroupBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}

pub struct LocalElectionGroup<S> {
    confs: Vec<Configuration>,
    stores: Vec<S>,
}

impl<S> LocalElectionGroup<S>
where
    S: ElectionStore,
{
    pub async fn spawn(self) -> LocalElectionGroupHandle {
        let ids: Vec<NodeId> = (1..=self.confs.len() as NodeId).collect();
        let registry = StaticRegistry::new(ids.clone());

        let mut nodes = Vec::new();
        let members = self.confs.into_iter().zip(self.stores);
        for (id, (conf, store)) in ids.into_iter().zip(members) {
            nodes.push(Node::open(id, Arc::new(conf), store, registry.clone()).await);
        }

        let handles: BTreeMap<NodeId, NodeHandle> =
            nodes.iter().map(|node| (node.id(), node.handle())).collect();
        let transport = LocalTransport::new(handles.values().cloned());
        for node in nodes {
            tokio::spawn(node.run(transport.clone()));
        }

        LocalElectionGroupHandle { nodes: handles }
    }
}

pub struct LocalElectionGroupHandle {
    nodes: BTreeMap<NodeId, NodeHandle>,
}

impl LocalElectionGroupHandle {
    pub fn node(&self, id: NodeId) -> Result<&NodeHandle, GroupError> {
        self.nodes.get(&id).ok_or(GroupError::UnknownNode(id))
    }

    pub fn nodes(&self) -> impl Iterator<Item = &NodeHandle> {
        self.nodes.values()
    }

    /// Waits until some node wins an election.
    pub async fn wait_for_leader(&self) -> Result<NodeStatus, GroupError> {
        if self.nodes.is_empty() {
            return Err(GroupError::EmptyGroup);
        }
        let waits = self
            .nodes
            .values()
            .map(|node| Box::pin(node.wait_for(|s| s.role == RoleKind::Leader)));
        let (status, _, _) = future::select_all(waits).await;
        Ok(status?)
    }

    /// Tells every other node about `leader`, standing in for the leader's first heartbeat.
    pub async fn announce_leader(&self, leader: &NodeStatus) -> Result<(), GroupError> {
        for node in self.nodes.values() {
            if node.id() != leader.id {
                node.observe_leader(leader.id, leader.term).await?;
            }
        }
        Ok(())
    }

    pub async fn shutdown(&self) {
        for node in self.nodes.values() {
            let _ = node.shutdown().await;
        }
    }
}
