use crate::util::{init, partitioned_group};
use elector::raft::node::RoleKind;
use elector::types::Term;

#[tokio::test]
async fn candidate_steps_down_for_leader_of_same_term() {
    init();
    let handle = partitioned_group(3).spawn().await;

    handle.force_election_timeout(1).await.unwrap();
    handle.force_election_timeout(2).await.unwrap();

    handle.expect_request_vote_success(1, 3).await;
    let status = handle
        .node(1)
        .wait_for(|s| s.role == RoleKind::Leader)
        .await
        .unwrap();

    // the first heartbeat of node 1 reaches node 2
    let term = handle.node(2).observe_leader(1, status.term).await.unwrap();
    assert_eq!(term, Term::new(1));

    let status = handle.node(2).status();
    assert_eq!(status.role, RoleKind::Follower);
    assert_eq!(status.leader, Some(1));
    assert_eq!(status.voted_for, Some(2));
}

#[tokio::test]
async fn leader_of_higher_term_deposes_leader() {
    init();
    let handle = partitioned_group(3).spawn().await;

    handle.force_election_timeout(1).await.unwrap();
    handle.expect_request_vote_success(1, 2).await;
    handle
        .node(1)
        .wait_for(|s| s.role == RoleKind::Leader)
        .await
        .unwrap();

    let term = handle.node(1).observe_leader(3, Term::new(7)).await.unwrap();
    assert_eq!(term, Term::new(7));

    let status = handle.node(1).status();
    assert_eq!(status.role, RoleKind::Follower);
    assert_eq!(status.leader, Some(3));
    assert_eq!(status.voted_for, None);
}

#[tokio::test]
async fn stale_leader_is_ignored() {
    init();
    let handle = partitioned_group(3).spawn().await;

    handle.force_election_timeout(2).await.unwrap();
    handle.block_request_vote_request(2, 1).await.unwrap();
    handle.block_request_vote_request(2, 3).await.unwrap();
    handle
        .node(2)
        .wait_for(|s| s.term == Term::new(1) && s.role == RoleKind::Follower)
        .await
        .unwrap();

    let term = handle.node(2).observe_leader(1, Term::new(0)).await.unwrap();
    assert_eq!(term, Term::new(1));
    assert_eq!(handle.node(2).status().leader, None);
}
