use crate::pb::admin;
use crate::types::{NodeId, Term};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoleKind {
    Follower,
    Candidate,
    Leader,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Persistence {
    Available,
    /// The last write to the election store failed.
    Unavailable,
}

/// Read-only snapshot of a node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeStatus {
    pub id: NodeId,
    pub term: Term,
    pub voted_for: Option<NodeId>,
    pub role: RoleKind,
    /// The leader of `term`, if this node knows one.
    pub leader: Option<NodeId>,
    pub persistence: Persistence,
}

impl From<&NodeStatus> for admin::StatusResponse {
    fn from(status: &NodeStatus) -> Self {
        let role = match status.role {
            RoleKind::Follower => admin::Role::Follower,
            RoleKind::Candidate => admin::Role::Candidate,
            RoleKind::Leader => admin::Role::Leader,
        };
        let persistence = match status.persistence {
            Persistence::Available => admin::Persistence::Available,
            Persistence::Unavailable => admin::Persistence::Unavailable,
        };
        admin::StatusResponse {
            id: status.id,
            term: status.term.get(),
            voted_for: status.voted_for.map(|id| admin::NodeRef { id }),
            role: role as i32,
            leader: status.leader.map(|id| admin::NodeRef { id }),
            persistence: persistence as i32,
        }
    }
}
