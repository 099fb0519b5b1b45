pub mod partitioned;

pub mod pb {
    pub use crate::pb::raft::{RequestVoteRequest, RequestVoteResponse};
}
