use crate::types::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

const ELECTION_TIMEOUT_MILLIS: u64 = 150;
const ELECTION_TIMEOUT_JITTER_MILLIS: u64 = 150;
const REQUEST_VOTE_TIMEOUT_MILLIS: u64 = 100;
const REQUIRE_DURABILITY: bool = true;

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Configuration {
    #[serde(default)]
    pub group: GroupConfiguration,
    #[serde(default)]
    pub election: ElectionConfiguration,
    #[serde(default)]
    pub persistence: PersistenceConfiguration,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct GroupConfiguration {
    #[serde(default)]
    pub nodes: HashMap<NodeId, NodeConfiguration>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NodeConfiguration {
    pub ip: IpAddr,
    pub raft_port: u16,
    pub admin_port: u16,
}

impl NodeConfiguration {
    pub fn new<I: Into<IpAddr>>(ip: I, raft_port: u16, admin_port: u16) -> Self {
        Self {
            ip: ip.into(),
            raft_port,
            admin_port,
        }
    }

    pub fn raft_addr(&self) -> SocketAddr {
        SocketAddr::new(self.ip, self.raft_port)
    }

    pub fn admin_addr(&self) -> SocketAddr {
        SocketAddr::new(self.ip, self.admin_port)
    }
}

/// Timing of the election protocol.
///
/// The election timeout is drawn uniformly from
/// `[election_timeout_millis, election_timeout_millis + election_timeout_jitter_millis]`.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct ElectionConfiguration {
    pub election_timeout_millis: u64,
    pub election_timeout_jitter_millis: u64,
    /// Upper bound on a single RequestVote round trip.
    /// A peer that does not answer in time is counted as not granting its vote.
    pub request_vote_timeout_millis: u64,
}

impl ElectionConfiguration {
    pub fn request_vote_timeout(&self) -> Duration {
        Duration::from_millis(self.request_vote_timeout_millis)
    }
}

impl Default for ElectionConfiguration {
    fn default() -> Self {
        Self {
            election_timeout_millis: ELECTION_TIMEOUT_MILLIS,
            election_timeout_jitter_millis: ELECTION_TIMEOUT_JITTER_MILLIS,
            request_vote_timeout_millis: REQUEST_VOTE_TIMEOUT_MILLIS,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct PersistenceConfiguration {
    /// If set, a node refuses to grant votes or to start elections
    /// while its election state cannot be written to the store.
    pub require_durability: bool,
    pub data_dir: Option<PathBuf>,
}

impl Default for PersistenceConfiguration {
    fn default() -> Self {
        Self {
            require_durability: REQUIRE_DURABILITY,
            data_dir: None,
        }
    }
}
