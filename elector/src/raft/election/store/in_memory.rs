use super::{ElectionStore, StoreError};
use crate::raft::election::Election;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// A store that lives as long as any of its clones.
///
/// Handing a clone to a new node simulates a restart against the same record.
/// The store can be switched off to simulate an unreachable backend.
#[derive(Clone, Debug)]
pub struct InMemoryStore {
    election: Arc<Mutex<Election>>,
    available: Arc<AtomicBool>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new(Election::default())
    }
}

impl InMemoryStore {
    pub fn new(election: Election) -> Self {
        Self {
            election: Arc::new(Mutex::new(election)),
            available: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Returns the stored record regardless of availability.
    pub fn snapshot(&self) -> Election {
        self.election.lock().map(|e| *e).unwrap_or_default()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("store is switched off".to_owned()))
        }
    }
}

#[tonic::async_trait]
impl ElectionStore for InMemoryStore {
    async fn get(&mut self) -> Result<Election, StoreError> {
        self.check_available()?;
        self.election
            .lock()
            .map(|e| *e)
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }

    async fn set(&mut self, election: &Election) -> Result<(), StoreError> {
        self.check_available()?;
        let mut e = self
            .election
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        *e = *election;
        Ok(())
    }
}
