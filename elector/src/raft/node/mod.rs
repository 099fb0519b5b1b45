mod candidate;
pub mod error;
mod follower;
mod role;
mod status;

pub use self::error::NodeError;
pub use self::status::{NodeStatus, Persistence, RoleKind};

use self::candidate::{Candidate, Tally};
use self::follower::VoteDecision;
use self::role::Role;
use crate::configuration::Configuration;
use crate::pb::raft::{RequestVoteRequest, RequestVoteResponse};
use crate::raft::election::store::ElectionStore;
use crate::raft::election::timer::{ElectionTimeout, ElectionTimer};
use crate::raft::election::Election;
use crate::raft::log::{Log, NoLog};
use crate::raft::message::Message;
use crate::raft::peer::{PeerError, Transport};
use crate::registry::ClusterRegistry;
use crate::types::{NodeId, Term};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time;
use tracing_futures::Instrument;

const MAILBOX_SIZE: usize = 100;

/// A member of the cluster which takes part in leader elections.
///
/// The election state is loaded once by [`Node::open`] and is owned by the
/// node task afterwards. Other tasks talk to the node through a [`NodeHandle`].
pub struct Node<S, R, L = NoLog> {
    id: NodeId,
    conf: Arc<Configuration>,
    election: Election,
    persistence: Persistence,
    store: S,
    registry: R,
    log: L,
    tx: mpsc::Sender<Message>,
    rx: mpsc::Receiver<Message>,
    status_tx: watch::Sender<NodeStatus>,
    status_rx: watch::Receiver<NodeStatus>,
}

impl<S, R> Node<S, R>
where
    S: ElectionStore,
    R: ClusterRegistry,
{
    pub async fn open(id: NodeId, conf: Arc<Configuration>, mut store: S, registry: R) -> Self {
        let (election, persistence) = match store.get().await {
            Ok(election) => (election, Persistence::Available),
            Err(e) => {
                tracing::warn!(
                    id,
                    "failed to load the election state, starting from term 0: {}",
                    e
                );
                (Election::default(), Persistence::Unavailable)
            }
        };
        tracing::debug!(
            id,
            term = election.term.get(),
            voted_for = ?election.voted_for,
            "loaded the election state"
        );

        let (tx, rx) = mpsc::channel(MAILBOX_SIZE);
        let (status_tx, status_rx) = watch::channel(NodeStatus {
            id,
            term: election.term,
            voted_for: election.voted_for,
            role: RoleKind::Follower,
            leader: None,
            persistence,
        });

        Node {
            id,
            conf,
            election,
            persistence,
            store,
            registry,
            log: NoLog,
            tx,
            rx,
            status_tx,
            status_rx,
        }
    }
}

impl<S, R, L> Node<S, R, L>
where
    S: ElectionStore,
    R: ClusterRegistry,
    L: Log,
{
    /// Replaces the log whose position is advertised and compared in elections.
    pub fn log<M: Log>(self, log: M) -> Node<S, R, M> {
        Node {
            id: self.id,
            conf: self.conf,
            election: self.election,
            persistence: self.persistence,
            store: self.store,
            registry: self.registry,
            log,
            tx: self.tx,
            rx: self.rx,
            status_tx: self.status_tx,
            status_rx: self.status_rx,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn handle(&self) -> NodeHandle {
        NodeHandle {
            id: self.id,
            tx: self.tx.clone(),
            status: self.status_rx.clone(),
        }
    }

    /// Runs the node until it is shut down.
    pub async fn run<T: Transport>(self, transport: T) {
        let status = self.status_rx.borrow().clone();
        let timer = ElectionTimer::spawn(ElectionTimeout::from(&self.conf.election));
        let mut process = NodeProcess {
            id: self.id,
            conf: self.conf,
            election: self.election,
            persistence: self.persistence,
            role: Role::Follower,
            leader: None,
            store: self.store,
            registry: self.registry,
            log: self.log,
            transport,
            timer,
            tx: self.tx,
            rx: self.rx,
            status_tx: self.status_tx,
            status,
        };
        tracing::info!(
            id = process.id,
            term = process.election.term.get(),
            "start as a follower"
        );
        process.handle_messages().await
    }
}

struct NodeProcess<S, R, L, T> {
    id: NodeId,
    conf: Arc<Configuration>,

    election: Election,
    persistence: Persistence,
    role: Role,
    leader: Option<NodeId>,

    store: S,
    registry: R,
    log: L,
    transport: T,
    timer: ElectionTimer,

    tx: mpsc::Sender<Message>,
    rx: mpsc::Receiver<Message>,
    status_tx: watch::Sender<NodeStatus>,
    status: NodeStatus,
}

impl<S, R, L, T> NodeProcess<S, R, L, T>
where
    S: ElectionStore,
    R: ClusterRegistry,
    L: Log,
    T: Transport,
{
    async fn handle_messages(&mut self) {
        loop {
            tokio::select! {
                msg = self.rx.recv() => match msg {
                    Some(Message::Shutdown) | None => break,
                    Some(msg) => self.handle_message(msg).await,
                },
                Some(_) = self.timer.elapsed() => self.handle_election_timeout().await,
            }
            self.publish();
        }

        tracing::info!(
            id = self.id,
            term = self.election.term.get(),
            "node is shut down"
        );
    }

    async fn handle_message(&mut self, msg: Message) {
        match msg {
            Message::RPCRequestVoteRequest { req, tx } => {
                self.handle_request_vote_request(req, tx).await
            }

            Message::RPCRequestVoteResponse { res, id, term } => {
                self.handle_request_vote_response(res, id, term).await
            }

            Message::RPCRequestVoteFailure { error, id, term } => {
                self.handle_request_vote_failure(error, id, term)
            }

            Message::LeaderObserved {
                leader_id,
                term,
                tx,
            } => self.handle_leader_observed(leader_id, term, tx).await,

            Message::ElectionTimeout => self.handle_election_timeout().await,

            Message::Shutdown => {}
        }
    }

    /// Writes `election` to the store and tracks whether the store is usable.
    async fn persist(&mut self, election: &Election) -> bool {
        match self.store.set(election).await {
            Ok(()) => {
                if self.persistence == Persistence::Unavailable {
                    tracing::info!(
                        id = self.id,
                        term = self.election.term.get(),
                        "election store is available again"
                    );
                }
                self.persistence = Persistence::Available;
                true
            }
            Err(e) => {
                tracing::warn!(
                    id = self.id,
                    term = self.election.term.get(),
                    "failed to persist the election state: {}",
                    e
                );
                self.persistence = Persistence::Unavailable;
                false
            }
        }
    }

    /// Persists `election` and then applies it.
    ///
    /// Returns false with the state left untouched if the write failed
    /// while durability is required.
    async fn commit(&mut self, election: Election) -> bool {
        if !self.persist(&election).await {
            if self.conf.persistence.require_durability {
                return false;
            }
            tracing::warn!(
                id = self.id,
                term = self.election.term.get(),
                "continue without durability"
            );
        }
        self.election = election;
        true
    }

    /// Adopts a higher `term` and returns to follower, forgetting the vote.
    ///
    /// This never leads to a second vote in a term, so it is applied
    /// even if the write fails.
    async fn step_down(&mut self, term: Term) {
        let election = self.election.advance(term);
        self.persist(&election).await;
        self.election = election;
        self.leader = None;
        self.trans_state_follower();
    }

    async fn handle_request_vote_request(
        &mut self,
        req: RequestVoteRequest,
        tx: oneshot::Sender<RequestVoteResponse>,
    ) {
        let req_term = Term::new(req.term);
        if req_term > self.election.term {
            tracing::debug!(
                id = self.id,
                term = self.election.term.get(),
                target_id = req.candidate_id,
                "receive a request from {} which has higher term: {}",
                req.candidate_id,
                req_term,
            );
            self.step_down(req_term).await;
        }

        let vote_granted = match follower::decide_vote(&self.election, &req, &self.log) {
            VoteDecision::Grant => self.grant_vote(req.candidate_id).await,
            VoteDecision::StaleTerm => {
                tracing::debug!(
                    id = self.id,
                    term = self.election.term.get(),
                    target_id = req.candidate_id,
                    reason = "request term is smaller",
                    "refused RequestVote request",
                );
                false
            }
            VoteDecision::AlreadyVoted(voted_for) => {
                tracing::debug!(
                    id = self.id,
                    term = self.election.term.get(),
                    target_id = req.candidate_id,
                    reason = "already voted for another candidate",
                    voted_for,
                    "refused RequestVote request",
                );
                false
            }
            VoteDecision::OutdatedLog => {
                tracing::debug!(
                    id = self.id,
                    term = self.election.term.get(),
                    target_id = req.candidate_id,
                    reason = "candidate log is not up to date",
                    "refused RequestVote request",
                );
                false
            }
        };

        let res = RequestVoteResponse {
            term: self.election.term.get(),
            vote_granted,
        };
        self.publish();
        if tx.send(res).is_err() {
            tracing::warn!(
                id = self.id,
                term = self.election.term.get(),
                "failed to send a callback for RequestVoteRequest"
            );
        }
    }

    async fn grant_vote(&mut self, candidate_id: NodeId) -> bool {
        if self.election.voted_for != Some(candidate_id)
            && !self.commit(self.election.vote(candidate_id)).await
        {
            tracing::debug!(
                id = self.id,
                term = self.election.term.get(),
                target_id = candidate_id,
                reason = "election store is unavailable",
                "refused RequestVote request",
            );
            return false;
        }

        self.timer.reset();
        tracing::debug!(
            id = self.id,
            term = self.election.term.get(),
            target_id = candidate_id,
            "granted vote to {}",
            candidate_id
        );
        true
    }

    async fn handle_election_timeout(&mut self) {
        if let Role::Leader = self.role {
            tracing::trace!(
                id = self.id,
                term = self.election.term.get(),
                "ignored election timeout as a leader"
            );
            return;
        }
        self.start_election().await
    }

    async fn start_election(&mut self) {
        let election = Election::new(self.election.term + 1, Some(self.id));
        if !self.commit(election).await {
            tracing::warn!(
                id = self.id,
                term = self.election.term.get(),
                "could not start an election since the election store is unavailable"
            );
            return;
        }

        self.timer.reset();
        self.leader = None;
        let peers = self.registry.peers_of(self.id);
        tracing::debug!(
            id = self.id,
            term = self.election.term.get(),
            "start an election among {} nodes",
            self.registry.cluster_size()
        );
        self.trans_state_candidate(Candidate::new(self.id, self.election.term, peers.clone()));

        for target_id in peers {
            self.send_request_vote(target_id);
        }

        let tally = match &self.role {
            Role::Candidate { candidate } => candidate.tally(),
            _ => Tally::Pending,
        };
        self.apply_tally(tally);
    }

    fn send_request_vote(&self, target_id: NodeId) {
        let term = self.election.term;
        let req = RequestVoteRequest {
            term: term.get(),
            candidate_id: self.id,
            last_log_index: self.log.last_index(),
            last_log_term: self.log.last_term().get(),
        };
        let timeout = self.conf.election.request_vote_timeout();
        let transport = self.transport.clone();
        let tx = self.tx.clone();
        let span = tracing::debug_span!(
            target: "candidate",
            "send_request_vote_request",
            id = self.id,
            term = term.get(),
            target_id
        );

        tokio::spawn(
            async move {
                tracing::debug!("sending request vote request");
                let msg = match time::timeout(timeout, transport.request_vote(target_id, req)).await
                {
                    Ok(Ok(res)) => {
                        tracing::debug!("request vote request successful");
                        Message::RPCRequestVoteResponse {
                            res,
                            id: target_id,
                            term,
                        }
                    }
                    Ok(Err(error)) => {
                        tracing::debug!("sending request vote request failed: {}", error);
                        Message::RPCRequestVoteFailure {
                            error,
                            id: target_id,
                            term,
                        }
                    }
                    Err(_) => {
                        tracing::debug!("request vote request timed out");
                        Message::RPCRequestVoteFailure {
                            error: PeerError::TimedOut,
                            id: target_id,
                            term,
                        }
                    }
                };

                if let Err(e) = tx.send(msg).await {
                    tracing::debug!("failed to send message to node: {}", e);
                }
            }
            .instrument(span),
        );
    }

    async fn handle_request_vote_response(
        &mut self,
        res: RequestVoteResponse,
        id: NodeId,
        term: Term,
    ) {
        let res_term = Term::new(res.term);
        if res_term > self.election.term {
            tracing::debug!(
                id = self.id,
                term = self.election.term.get(),
                target_id = id,
                "receive a response from {} which has higher term: {}",
                id,
                res_term,
            );
            self.step_down(res_term).await;
            return;
        }

        if term != self.election.term {
            tracing::debug!(
                id = self.id,
                term = self.election.term.get(),
                target_id = id,
                "ignored a response to the request of term {}",
                term,
            );
            return;
        }

        let tally = match &mut self.role {
            Role::Candidate { candidate } => candidate.handle_request_vote_response(&res, id),
            role => {
                tracing::debug!(
                    id = self.id,
                    term = self.election.term.get(),
                    target_id = id,
                    role = role.to_ident(),
                    "ignored a RequestVote response since the election is over"
                );
                return;
            }
        };
        self.apply_tally(tally);
    }

    fn handle_request_vote_failure(&mut self, error: PeerError, id: NodeId, term: Term) {
        tracing::debug!(
            id = self.id,
            term = self.election.term.get(),
            target_id = id,
            "no vote from {}: {}",
            id,
            error
        );

        if term != self.election.term {
            return;
        }
        let tally = match &mut self.role {
            Role::Candidate { candidate } => candidate.handle_request_vote_failure(id),
            _ => return,
        };
        self.apply_tally(tally);
    }

    fn apply_tally(&mut self, tally: Tally) {
        match tally {
            Tally::Pending => {}
            Tally::Won => self.trans_state_leader(),
            Tally::Lost => {
                tracing::info!(
                    id = self.id,
                    term = self.election.term.get(),
                    "lost the election, no leader in this term"
                );
                self.trans_state_follower();
            }
        }
    }

    async fn handle_leader_observed(
        &mut self,
        leader_id: NodeId,
        term: Term,
        tx: oneshot::Sender<Term>,
    ) {
        if term < self.election.term {
            tracing::debug!(
                id = self.id,
                term = self.election.term.get(),
                target_id = leader_id,
                "ignored leader {} of stale term {}",
                leader_id,
                term,
            );
        } else {
            if term > self.election.term {
                self.step_down(term).await;
            }

            if let Role::Leader = self.role {
                if leader_id != self.id {
                    tracing::warn!(
                        id = self.id,
                        term = self.election.term.get(),
                        target_id = leader_id,
                        "observed another leader {} in the same term",
                        leader_id,
                    );
                }
            } else {
                self.trans_state_follower();
                self.leader = Some(leader_id);
                self.timer.reset();
            }
        }

        self.publish();
        if tx.send(self.election.term).is_err() {
            tracing::warn!(
                id = self.id,
                term = self.election.term.get(),
                "failed to send a callback for LeaderObserved"
            );
        }
    }

    fn trans_state_follower(&mut self) {
        if let Role::Follower = self.role {
            return;
        }
        tracing::info!(
            id = self.id,
            term = self.election.term.get(),
            "become a follower"
        );
        self.role = Role::Follower;
    }

    fn trans_state_candidate(&mut self, candidate: Candidate) {
        tracing::info!(
            id = self.id,
            term = self.election.term.get(),
            "become a candidate"
        );
        self.role = Role::Candidate { candidate };
    }

    fn trans_state_leader(&mut self) {
        if let Role::Candidate { candidate } = &self.role {
            tracing::info!(
                id = self.id,
                term = self.election.term.get(),
                votes = candidate.votes(),
                "got a majority of votes"
            );
        }
        tracing::info!(
            id = self.id,
            term = self.election.term.get(),
            "become a leader"
        );
        self.role = Role::Leader;
        self.leader = Some(self.id);
    }

    /// Publishes the current status if it has changed.
    fn publish(&mut self) {
        let status = NodeStatus {
            id: self.id,
            term: self.election.term,
            voted_for: self.election.voted_for,
            role: self.role.kind(),
            leader: self.leader,
            persistence: self.persistence,
        };
        if status != self.status {
            self.status = status.clone();
            // nobody is watching once every handle is dropped
            let _ = self.status_tx.send(status);
        }
    }
}

/// Cloneable entry point to a running [`Node`].
#[derive(Clone)]
pub struct NodeHandle {
    id: NodeId,
    tx: mpsc::Sender<Message>,
    status: watch::Receiver<NodeStatus>,
}

impl NodeHandle {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn status(&self) -> NodeStatus {
        self.status.borrow().clone()
    }

    pub fn term(&self) -> Term {
        self.status.borrow().term
    }

    pub fn voted_for(&self) -> Option<NodeId> {
        self.status.borrow().voted_for
    }

    pub fn role(&self) -> RoleKind {
        self.status.borrow().role
    }

    /// Returns a receiver notified on every published status change.
    pub fn subscribe(&self) -> watch::Receiver<NodeStatus> {
        self.status.clone()
    }

    pub async fn request_vote(
        &self,
        req: RequestVoteRequest,
    ) -> Result<RequestVoteResponse, NodeError> {
        let (tx, rx) = oneshot::channel();
        self.send(Message::RPCRequestVoteRequest { req, tx }).await?;
        rx.await.map_err(|_| NodeError::NodeCrashed)
    }

    /// Reports traffic from `leader_id`, the leader of `term`.
    /// Returns the term of this node after handling it.
    pub async fn observe_leader(&self, leader_id: NodeId, term: Term) -> Result<Term, NodeError> {
        let (tx, rx) = oneshot::channel();
        self.send(Message::LeaderObserved {
            leader_id,
            term,
            tx,
        })
        .await?;
        rx.await.map_err(|_| NodeError::NodeCrashed)
    }

    /// Makes the node act as if its election timer expired.
    pub async fn force_election_timeout(&self) -> Result<(), NodeError> {
        self.send(Message::ElectionTimeout).await
    }

    pub async fn shutdown(&self) -> Result<(), NodeError> {
        self.send(Message::Shutdown).await
    }

    /// Waits until the status of the node satisfies `predicate`.
    pub async fn wait_for<F>(&self, predicate: F) -> Result<NodeStatus, NodeError>
    where
        F: Fn(&NodeStatus) -> bool,
    {
        let mut status = self.status.clone();
        loop {
            {
                let current = status.borrow();
                if predicate(&current) {
                    return Ok(current.clone());
                }
            }
            status
                .changed()
                .await
                .map_err(|_| NodeError::NodeTerminated)?;
        }
    }

    async fn send(&self, msg: Message) -> Result<(), NodeError> {
        self.tx
            .send(msg)
            .await
            .map_err(|_| NodeError::NodeTerminated)
    }
}
