use crate::util::{init, partitioned_group, partitioned_group_with_stores};
use elector::raft::election::store::InMemoryStore;
use elector::raft::election::Election;
use elector::raft::node::RoleKind;
use elector::test_util::partitioned::error::HandleError;
use elector::test_util::pb::{RequestVoteRequest, RequestVoteResponse};
use elector::types::Term;

#[tokio::test]
async fn success_two_candidates() {
    init();
    let handle = partitioned_group(3).spawn().await;

    // Node 1, 2 become candidates
    handle.force_election_timeout(1).await.unwrap();
    handle.force_election_timeout(2).await.unwrap();

    // RequestVote from 1 to 2 must be rejected
    let (req, h12) = handle.pass_request_vote_request(1, 2).await.unwrap();
    assert!(matches!(req, RequestVoteRequest { term: 1, .. }));
    assert!(matches!(
        h12.pass_response().unwrap().unwrap(),
        RequestVoteResponse {
            term: 1,
            vote_granted: false
        }
    ));

    // RequestVote from 1 to 3 must be successful
    let (_, h13) = handle.pass_request_vote_request(1, 3).await.unwrap();
    assert!(matches!(
        h13.pass_response().unwrap().unwrap(),
        RequestVoteResponse {
            term: 1,
            vote_granted: true,
        }
    ));

    // RequestVote from 2 to 1 and 3 must be rejected
    let (_, h21) = handle.pass_request_vote_request(2, 1).await.unwrap();
    assert!(!h21.pass_response().unwrap().unwrap().vote_granted);
    let (_, h23) = handle.pass_request_vote_request(2, 3).await.unwrap();
    assert!(!h23.pass_response().unwrap().unwrap().vote_granted);

    handle
        .node(1)
        .wait_for(|s| s.role == RoleKind::Leader)
        .await
        .unwrap();
    let status = handle
        .node(2)
        .wait_for(|s| s.role == RoleKind::Follower)
        .await
        .unwrap();
    assert_eq!(status.term, Term::new(1));
    assert_eq!(status.voted_for, Some(2));
}

#[tokio::test]
async fn split_vote_then_retry() {
    init();
    let handle = partitioned_group(3).spawn().await;

    handle.force_election_timeout(1).await.unwrap();
    handle.force_election_timeout(2).await.unwrap();

    // every vote is refused or lost, nobody wins term 1
    let (_, h12) = handle.pass_request_vote_request(1, 2).await.unwrap();
    assert!(!h12.pass_response().unwrap().unwrap().vote_granted);
    let (_, h21) = handle.pass_request_vote_request(2, 1).await.unwrap();
    assert!(!h21.pass_response().unwrap().unwrap().vote_granted);
    handle.block_request_vote_request(1, 3).await.unwrap();
    handle.block_request_vote_request(2, 3).await.unwrap();

    for i in 1..=2 {
        let status = handle
            .node(i)
            .wait_for(|s| s.role == RoleKind::Follower)
            .await
            .unwrap();
        assert_eq!(status.term, Term::new(1));
        assert_eq!(status.voted_for, Some(i));
        assert_eq!(status.leader, None);
    }

    // the next timeout starts a new election at a higher term
    handle.force_election_timeout(1).await.unwrap();
    let (req, h12) = handle.pass_request_vote_request(1, 2).await.unwrap();
    assert_eq!(req.term, 2);
    assert!(h12.pass_response().unwrap().unwrap().vote_granted);
    handle.block_request_vote_request(1, 3).await.unwrap();

    let status = handle
        .node(1)
        .wait_for(|s| s.role == RoleKind::Leader)
        .await
        .unwrap();
    assert_eq!(status.term, Term::new(2));
}

#[tokio::test]
async fn step_down_on_higher_term_response() {
    init();
    let stores = vec![
        InMemoryStore::default(),
        InMemoryStore::default(),
        InMemoryStore::new(Election::new(Term::new(5), None)),
    ];
    let handle = partitioned_group_with_stores(stores.clone()).spawn().await;

    handle.force_election_timeout(1).await.unwrap();

    let (_, h13) = handle.pass_request_vote_request(1, 3).await.unwrap();
    assert!(matches!(
        h13.pass_response().unwrap().unwrap(),
        RequestVoteResponse {
            term: 5,
            vote_granted: false,
        }
    ));
    let status = handle
        .node(1)
        .wait_for(|s| s.term == Term::new(5))
        .await
        .unwrap();
    assert_eq!(status.role, RoleKind::Follower);
    assert_eq!(status.voted_for, None);
    assert_eq!(stores[0].snapshot(), Election::new(Term::new(5), None));

    // a late grant for the abandoned term changes nothing
    handle.expect_request_vote_success(1, 2).await;
    let status = handle.node(1).status();
    assert_eq!(status.term, Term::new(5));
    assert_eq!(status.role, RoleKind::Follower);
}

#[tokio::test]
async fn candidate_votes_for_candidate_of_higher_term() {
    init();
    let stores = vec![
        InMemoryStore::default(),
        InMemoryStore::default(),
        InMemoryStore::new(Election::new(Term::new(3), None)),
    ];
    let handle = partitioned_group_with_stores(stores).spawn().await;

    handle.force_election_timeout(1).await.unwrap();
    handle
        .node(1)
        .wait_for(|s| s.role == RoleKind::Candidate)
        .await
        .unwrap();

    handle.force_election_timeout(3).await.unwrap();
    let (req, h31) = handle.pass_request_vote_request(3, 1).await.unwrap();
    assert_eq!(req.term, 4);
    assert!(matches!(
        h31.pass_response().unwrap().unwrap(),
        RequestVoteResponse {
            term: 4,
            vote_granted: true,
        }
    ));

    let status = handle.node(1).status();
    assert_eq!(status.role, RoleKind::Follower);
    assert_eq!(status.voted_for, Some(3));

    handle
        .node(3)
        .wait_for(|s| s.role == RoleKind::Leader)
        .await
        .unwrap();
}

#[tokio::test]
async fn lost_response_counts_as_no_vote() {
    init();
    let handle = partitioned_group(3).spawn().await;

    handle.force_election_timeout(1).await.unwrap();

    // node 2 grants, but its answer never arrives
    let (_, h12) = handle.pass_request_vote_request(1, 2).await.unwrap();
    assert!(h12.block_response().unwrap().unwrap().vote_granted);
    handle.block_request_vote_request(1, 3).await.unwrap();

    let status = handle
        .node(1)
        .wait_for(|s| s.role == RoleKind::Follower)
        .await
        .unwrap();
    assert_eq!(status.term, Term::new(1));
    assert_eq!(handle.node(2).voted_for(), Some(1));
}

#[tokio::test]
async fn retry_after_lost_response() {
    init();
    let handle = partitioned_group(2).spawn().await;

    handle.force_election_timeout(2).await.unwrap();
    let (_, h21) = handle.pass_request_vote_request(2, 1).await.unwrap();
    h21.block_response().unwrap().unwrap();
    handle
        .node(2)
        .wait_for(|s| s.term == Term::new(1) && s.role == RoleKind::Follower)
        .await
        .unwrap();

    // the next term starts with a fresh vote
    handle.force_election_timeout(2).await.unwrap();
    let (_, h21) = handle.pass_request_vote_request(2, 1).await.unwrap();
    assert!(matches!(
        h21.pass_response(),
        Ok(Ok(RequestVoteResponse {
            term: 2,
            vote_granted: true
        }))
    ));
    handle
        .node(2)
        .wait_for(|s| s.role == RoleKind::Leader)
        .await
        .unwrap();

    assert!(matches!(
        handle.raft_handle(1, 1),
        Err(HandleError::UnknownRoute)
    ));
}
