use crate::util::{init, partitioned_group_with_stores};
use elector::raft::election::store::{ElectionStore, FileStore, InMemoryStore};
use elector::raft::election::Election;
use elector::raft::node::{Persistence, RoleKind};
use elector::test_util::pb::RequestVoteResponse;
use elector::types::Term;

fn file_stores(dir: &std::path::Path, n: u32) -> Vec<FileStore> {
    (1..=n).map(|id| FileStore::new(dir, id)).collect()
}

#[tokio::test]
async fn election_survives_restart() {
    init();
    let dir = tempfile::tempdir().unwrap();

    let handle = partitioned_group_with_stores(file_stores(dir.path(), 3))
        .spawn()
        .await;
    handle.force_election_timeout(1).await.unwrap();
    handle.expect_request_vote_success(1, 2).await;
    handle.block_request_vote_request(1, 3).await.unwrap();
    handle
        .node(1)
        .wait_for(|s| s.role == RoleKind::Leader)
        .await
        .unwrap();
    handle.shutdown().await;

    let mut store = FileStore::new(dir.path(), 2);
    assert_eq!(
        store.get().await.unwrap(),
        Election::new(Term::new(1), Some(1))
    );

    // restart every node from its file
    let handle = partitioned_group_with_stores(file_stores(dir.path(), 3))
        .spawn()
        .await;
    let status = handle.node(2).status();
    assert_eq!(status.term, Term::new(1));
    assert_eq!(status.voted_for, Some(1));
    assert_eq!(status.role, RoleKind::Follower);

    // node 2 must not vote twice in term 1
    handle.force_election_timeout(3).await.unwrap();
    let (req, h32) = handle.pass_request_vote_request(3, 2).await.unwrap();
    assert_eq!(req.term, 1);
    assert!(matches!(
        h32.pass_response().unwrap().unwrap(),
        RequestVoteResponse {
            term: 1,
            vote_granted: false,
        }
    ));
}

#[tokio::test]
async fn unavailable_store_blocks_vote() {
    init();
    let stores = vec![
        InMemoryStore::default(),
        InMemoryStore::default(),
        InMemoryStore::default(),
    ];
    let handle = partitioned_group_with_stores(stores.clone()).spawn().await;
    stores[1].set_available(false);

    handle.force_election_timeout(1).await.unwrap();
    let (_, h12) = handle.pass_request_vote_request(1, 2).await.unwrap();
    assert!(matches!(
        h12.pass_response().unwrap().unwrap(),
        RequestVoteResponse {
            term: 1,
            vote_granted: false,
        }
    ));
    assert_eq!(handle.node(2).status().persistence, Persistence::Unavailable);

    handle.expect_request_vote_success(1, 3).await;
    handle
        .node(1)
        .wait_for(|s| s.role == RoleKind::Leader)
        .await
        .unwrap();
    assert_eq!(stores[1].snapshot(), Election::default());
}
