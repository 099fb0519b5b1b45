use crate::raft::node::NodeError;
use crate::raft::peer::ConnectionError;
use crate::types::NodeId;
use std::fmt;

#[derive(Debug)]
pub enum GroupError {
    UnknownNode(NodeId),
    EmptyGroup,
    ConnectionError(ConnectionError),
    NodeError(NodeError),
}

impl fmt::Display for GroupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupError::UnknownNode(id) => write!(f, "node {} is not a member of the group", id),
            GroupError::EmptyGroup => write!(f, "group has no members"),
            GroupError::ConnectionError(e) => e.fmt(f),
            GroupError::NodeError(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for GroupError {}

impl From<ConnectionError> for GroupError {
    fn from(e: ConnectionError) -> Self {
        GroupError::ConnectionError(e)
    }
}

impl From<NodeError> for GroupError {
    fn from(e: NodeError) -> Self {
        GroupError::NodeError(e)
    }
}
