use crate::util::{init, partitioned_group};
use elector::raft::node::RoleKind;
use elector::test_util::pb::{RequestVoteRequest, RequestVoteResponse};
use elector::types::Term;

#[tokio::test]
async fn initial_election() {
    init();
    let handle = partitioned_group(3).spawn().await;

    handle.force_election_timeout(1).await.unwrap();

    let (req, h12) = handle.pass_request_vote_request(1, 2).await.unwrap();
    assert!(matches!(
        req,
        RequestVoteRequest {
            term: 1,
            candidate_id: 1,
            last_log_index: 0,
            last_log_term: 0,
        }
    ));
    assert!(matches!(
        h12.pass_response().unwrap().unwrap(),
        RequestVoteResponse {
            term: 1,
            vote_granted: true,
        }
    ));

    assert!(matches!(
        handle.block_request_vote_request(1, 3).await.unwrap(),
        RequestVoteRequest { term: 1, .. }
    ));

    let status = handle
        .node(1)
        .wait_for(|s| s.role == RoleKind::Leader)
        .await
        .unwrap();
    assert_eq!(status.term, Term::new(1));
    assert_eq!(status.voted_for, Some(1));
    assert_eq!(status.leader, Some(1));

    let status = handle.node(2).status();
    assert_eq!(status.term, Term::new(1));
    assert_eq!(status.voted_for, Some(1));
    assert_eq!(status.role, RoleKind::Follower);

    // node 3 never heard of the election
    let status = handle.node(3).status();
    assert_eq!(status.term, Term::new(0));
    assert_eq!(status.voted_for, None);
}

#[tokio::test]
async fn five_nodes_need_three_votes() {
    init();
    let handle = partitioned_group(5).spawn().await;

    handle.force_election_timeout(1).await.unwrap();
    handle.expect_request_vote_success(1, 2).await;
    handle.block_request_vote_request(1, 3).await.unwrap();
    handle.block_request_vote_request(1, 4).await.unwrap();

    // two votes out of five, one peer still pending
    let (_, h15) = handle.pass_request_vote_request(1, 5).await.unwrap();
    handle
        .node(1)
        .wait_for(|s| s.role == RoleKind::Candidate)
        .await
        .unwrap();
    h15.pass_response().unwrap().unwrap();

    let status = handle
        .node(1)
        .wait_for(|s| s.role == RoleKind::Leader)
        .await
        .unwrap();
    assert_eq!(status.term, Term::new(1));
}
