mod error;
pub mod file;
pub mod in_memory;

pub use self::error::StoreError;
pub use self::file::FileStore;
pub use self::in_memory::InMemoryStore;

use super::Election;
use crate::pb::raft::{HardState, NodeVote};
use crate::types::{NodeId, Term};

/// Durable storage of a node's [`Election`].
///
/// A successful `set` must survive a crash that happens right after it returns.
/// Failures are reported as they are; a store never answers with made-up defaults.
#[tonic::async_trait]
pub trait ElectionStore: Send + 'static {
    async fn get(&mut self) -> Result<Election, StoreError>;

    /// Writes both the term and the vote at once.
    async fn set(&mut self, election: &Election) -> Result<(), StoreError>;

    async fn set_term(&mut self, term: Term) -> Result<(), StoreError> {
        let election = self.get().await?;
        self.set(&Election::new(term, election.voted_for)).await
    }

    async fn set_voted_for(&mut self, voted_for: Option<NodeId>) -> Result<(), StoreError> {
        let election = self.get().await?;
        self.set(&Election::new(election.term, voted_for)).await
    }
}

impl From<&Election> for HardState {
    fn from(election: &Election) -> Self {
        HardState {
            term: election.term.get(),
            voted_for: election.voted_for.map(|id| NodeVote { id }),
        }
    }
}

impl From<HardState> for Election {
    fn from(state: HardState) -> Self {
        Election {
            term: Term::new(state.term),
            voted_for: state.voted_for.map(|v| v.id),
        }
    }
}
