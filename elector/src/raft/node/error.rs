use std::error;
use std::fmt;
use tonic::Status;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeError {
    NodeTerminated,
    NodeCrashed,
}

impl fmt::Display for NodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeError::NodeTerminated => write!(
                f,
                "request could not be handled because the node has been terminated"
            ),
            NodeError::NodeCrashed => write!(f, "node failed to respond to the request"),
        }
    }
}

impl error::Error for NodeError {}

impl NodeError {
    pub fn into_status(self) -> Status {
        Status::unavailable(self.to_string())
    }
}
