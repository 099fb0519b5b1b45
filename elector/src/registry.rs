use crate::configuration::GroupConfiguration;
use crate::types::NodeId;
use std::collections::{BTreeMap, BTreeSet};
use std::net::SocketAddr;

/// Directory of the cluster members.
///
/// The member set is assumed to be fixed for the duration of an election round.
pub trait ClusterRegistry: Send + Sync + 'static {
    fn members(&self) -> BTreeSet<NodeId>;

    fn endpoint(&self, id: NodeId) -> Option<SocketAddr>;

    fn cluster_size(&self) -> usize {
        self.members().len()
    }

    /// Returns every member except `id`.
    fn peers_of(&self, id: NodeId) -> BTreeSet<NodeId> {
        self.members().into_iter().filter(|&p| p != id).collect()
    }
}

#[derive(Clone, Debug, Default)]
pub struct StaticRegistry {
    nodes: BTreeMap<NodeId, Option<SocketAddr>>,
}

impl StaticRegistry {
    /// Creates a registry of members which are not reachable over the network,
    /// e.g. nodes of an in-process group.
    pub fn new<I: IntoIterator<Item = NodeId>>(ids: I) -> Self {
        Self {
            nodes: ids.into_iter().map(|id| (id, None)).collect(),
        }
    }

    pub fn with_endpoint(mut self, id: NodeId, addr: SocketAddr) -> Self {
        self.nodes.insert(id, Some(addr));
        self
    }
}

impl From<&GroupConfiguration> for StaticRegistry {
    fn from(conf: &GroupConfiguration) -> Self {
        Self {
            nodes: conf
                .nodes
                .iter()
                .map(|(&id, node)| (id, Some(node.raft_addr())))
                .collect(),
        }
    }
}

impl ClusterRegistry for StaticRegistry {
    fn members(&self) -> BTreeSet<NodeId> {
        self.nodes.keys().copied().collect()
    }

    fn endpoint(&self, id: NodeId) -> Option<SocketAddr> {
        self.nodes.get(&id).copied().flatten()
    }
}
