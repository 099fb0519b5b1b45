/// Identity of a cluster member. Stable for the lifetime of the cluster.
pub type NodeId = u32;
