pub mod configuration;
pub mod group;
pub mod raft;
pub mod registry;
pub mod service;
pub mod test_util;
pub mod types;

pub mod pb {
    pub mod raft {
        tonic::include_proto!("elector.raft");
    }

    pub use elector_common::admin::pb as admin;
}
