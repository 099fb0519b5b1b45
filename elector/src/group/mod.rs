pub mod error;
pub mod grpc;
pub mod local;

pub use self::error::GroupError;
