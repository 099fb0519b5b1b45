use std::error;
use std::fmt;
use std::io;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreError {
    /// The backing store could not be reached or written.
    Unavailable(String),
    /// A record exists but cannot be decoded.
    Corrupted(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Unavailable(e) => write!(f, "election store is unavailable: {}", e),
            StoreError::Corrupted(e) => write!(f, "election record is corrupted: {}", e),
        }
    }
}

impl error::Error for StoreError {}

impl From<io::Error> for StoreError {
    fn from(e: io::Error) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}
