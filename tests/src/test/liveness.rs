use crate::util::{configuration::fast_election_timeout, init};
use elector::group::local::LocalElectionGroupBuilder;
use elector::raft::election::store::InMemoryStore;
use elector::raft::node::RoleKind;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

#[tokio::test]
async fn leader_is_elected_with_real_timers() {
    init();
    let n = 5;
    let group = LocalElectionGroupBuilder::new()
        .confs((0..n).map(|_| fast_election_timeout()).collect())
        .stores((0..n).map(|_| InMemoryStore::default()).collect())
        .build()
        .spawn()
        .await;

    // every (term, id) that reaches Leader while the group runs
    let recorders: Vec<_> = group
        .nodes()
        .map(|node| {
            let mut status = node.subscribe();
            tokio::spawn(async move {
                let mut leaders = Vec::new();
                loop {
                    {
                        let current = status.borrow();
                        if current.role == RoleKind::Leader {
                            leaders.push((current.term, current.id));
                        }
                    }
                    if status.changed().await.is_err() {
                        return leaders;
                    }
                }
            })
        })
        .collect();

    let leader = tokio::time::timeout(Duration::from_secs(10), group.wait_for_leader())
        .await
        .unwrap()
        .unwrap();
    group.announce_leader(&leader).await.unwrap();

    // nobody sends heartbeats, so followers keep starting new elections
    tokio::time::sleep(Duration::from_secs(1)).await;
    group.shutdown().await;

    let mut leaders: HashMap<_, HashSet<_>> = HashMap::new();
    for recorder in recorders {
        let recorded = tokio::time::timeout(Duration::from_secs(10), recorder)
            .await
            .unwrap()
            .unwrap();
        for (term, id) in recorded {
            leaders.entry(term).or_default().insert(id);
        }
    }

    for (term, ids) in leaders {
        assert_eq!(ids.len(), 1, "multiple leaders {:?} in term {}", ids, term);
    }
}
