use std::error;
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PeerError {
    Unreachable(String),
    TimedOut,
}

impl fmt::Display for PeerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeerError::Unreachable(e) => write!(f, "peer is unreachable: {}", e),
            PeerError::TimedOut => write!(f, "peer did not respond in time"),
        }
    }
}

impl error::Error for PeerError {}

#[derive(Debug)]
pub enum ConnectionError {
    InvalidUri(http::uri::InvalidUri),
    TransportError(tonic::transport::Error),
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionError::InvalidUri(e) => write!(f, "failed to parse: {}", e),
            ConnectionError::TransportError(e) => write!(f, "failed to connect: {}", e),
        }
    }
}

impl error::Error for ConnectionError {}

impl From<http::uri::InvalidUri> for ConnectionError {
    fn from(e: http::uri::InvalidUri) -> Self {
        ConnectionError::InvalidUri(e)
    }
}

impl From<tonic::transport::Error> for ConnectionError {
    fn from(e: tonic::transport::Error) -> Self {
        ConnectionError::TransportError(e)
    }
}
