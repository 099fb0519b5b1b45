pub mod configuration;

use elector::raft::election::store::{ElectionStore, InMemoryStore};
use elector::test_util::partitioned::group::{
    PartitionedLocalElectionGroup, PartitionedLocalElectionGroupBuilder,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt::format::DefaultFields, EnvFilter};

pub fn init() {
    let formatter = DefaultFields::new().delimited(",");
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .fmt_fields(formatter)
        .try_init();
}

/// A group of `n` nodes which start elections only when told to.
pub fn partitioned_group(n: usize) -> PartitionedLocalElectionGroup<InMemoryStore> {
    partitioned_group_with_stores((0..n).map(|_| InMemoryStore::default()).collect())
}

pub fn partitioned_group_with_stores<S: ElectionStore>(
    stores: Vec<S>,
) -> PartitionedLocalElectionGroup<S> {
    let confs = stores
        .iter()
        .map(|_| configuration::never_election_timeout())
        .collect();
    PartitionedLocalElectionGroupBuilder::new()
        .confs(confs)
        .stores(stores)
        .build()
}
