pub mod election;
pub mod log;
pub(crate) mod message;
pub mod node;
pub mod peer;
pub mod service;
