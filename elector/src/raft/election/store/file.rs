use super::{ElectionStore, StoreError};
use crate::pb::raft::HardState;
use crate::raft::election::Election;
use crate::types::NodeId;
use bytes::BytesMut;
use prost::Message;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Keeps the election state of one node in a file.
///
/// The record is a protobuf-encoded `HardState`. It is replaced by writing a temporary
/// file, syncing it and renaming it over the previous record, so a reader sees either
/// the old or the new record and never a torn one.
#[derive(Clone, Debug)]
pub struct FileStore {
    path: PathBuf,
    tmp_path: PathBuf,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(dir: P, id: NodeId) -> Self {
        let dir = dir.as_ref();
        Self {
            path: dir.join(format!("node-{}.election", id)),
            tmp_path: dir.join(format!("node-{}.election.tmp", id)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[tonic::async_trait]
impl ElectionStore for FileStore {
    async fn get(&mut self) -> Result<Election, StoreError> {
        match fs::read(&self.path).await {
            Ok(buf) => HardState::decode(buf.as_slice())
                .map(Election::from)
                .map_err(|e| StoreError::Corrupted(e.to_string())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Election::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&mut self, election: &Election) -> Result<(), StoreError> {
        let state = HardState::from(election);
        let mut buf = BytesMut::with_capacity(state.encoded_len());
        state
            .encode(&mut buf)
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let mut file = fs::File::create(&self.tmp_path).await?;
        file.write_all(&buf).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&self.tmp_path, &self.path).await?;

        // the rename itself is durable only once the directory is synced
        #[cfg(unix)]
        {
            if let Some(dir) = self.path.parent() {
                fs::File::open(dir).await?.sync_all().await?;
            }
        }

        tracing::trace!(
            path = %self.path.display(),
            term = election.term.get(),
            voted_for = ?election.voted_for,
            "persisted election state"
        );
        Ok(())
    }
}
