use super::error::HandleError;
use crate::pb::raft::{RequestVoteRequest, RequestVoteResponse};
use crate::raft::node::NodeHandle;
use crate::raft::peer::{PeerError, Transport};
use crate::types::NodeId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, Mutex};

type ResponseResult = Result<RequestVoteResponse, PeerError>;
type Pending = (RequestVoteRequest, oneshot::Sender<ResponseResult>);

/// Transport whose requests wait until a test decides their fate through a [`Handle`].
#[derive(Clone, Default)]
pub struct PartitionedTransport {
    routes: HashMap<NodeId, mpsc::Sender<Pending>>,
}

impl PartitionedTransport {
    pub fn route(mut self, target_id: NodeId, route: Route) -> Self {
        self.routes.insert(target_id, route.tx);
        self
    }
}

#[tonic::async_trait]
impl Transport for PartitionedTransport {
    async fn request_vote(
        &self,
        target_id: NodeId,
        req: RequestVoteRequest,
    ) -> Result<RequestVoteResponse, PeerError> {
        let route = self
            .routes
            .get(&target_id)
            .ok_or_else(|| PeerError::Unreachable(format!("unknown node {}", target_id)))?;

        let (tx, rx) = oneshot::channel();
        route
            .send((req, tx))
            .await
            .map_err(|e| PeerError::Unreachable(format!("handle dropped: {}", e)))?;

        rx.await
            .unwrap_or_else(|e| Err(PeerError::Unreachable(format!("handle dropped: {}", e))))
    }
}

/// Sending side of a partitioned link to one node.
pub struct Route {
    tx: mpsc::Sender<Pending>,
}

/// Controls the requests sent over one link.
#[derive(Clone)]
pub struct Handle {
    node: NodeHandle,
    rx: Arc<Mutex<mpsc::Receiver<Pending>>>,
}

impl Handle {
    async fn next_request(&self) -> Result<Pending, HandleError> {
        let mut rx = self.rx.lock().await;
        rx.recv().await.ok_or(HandleError::TransportDropped)
    }

    /// Delivers the next request to the target node.
    /// Its response is held until the returned [`ResponseHandle`] decides on it.
    pub async fn pass_request_vote_request(
        &self,
    ) -> Result<(RequestVoteRequest, ResponseHandle), HandleError> {
        let (request, tx) = self.next_request().await?;
        let response = self
            .node
            .request_vote(request.clone())
            .await
            .map_err(|e| PeerError::Unreachable(e.to_string()));
        Ok((request, ResponseHandle { response, tx }))
    }

    /// Drops the next request as if the target node was unreachable.
    pub async fn block_request_vote_request(&self) -> Result<RequestVoteRequest, HandleError> {
        let (request, tx) = self.next_request().await?;
        tx.send(Err(PeerError::Unreachable("request blocked".to_owned())))
            .map_err(|_| HandleError::TransportDropped)?;
        Ok(request)
    }

    pub async fn expect_request_vote_success(&self) {
        self.pass_request_vote_request()
            .await
            .expect("sending a RequestVote request must be successful")
            .1
            .pass_response()
            .expect("receiving a RequestVote response must be successful")
            .expect("RequestVote response should be success");
    }
}

pub struct ResponseHandle {
    response: ResponseResult,
    tx: oneshot::Sender<ResponseResult>,
}

impl ResponseHandle {
    pub fn pass_response(self) -> Result<ResponseResult, HandleError> {
        self.tx
            .send(self.response.clone())
            .map_err(|_| HandleError::TransportDropped)?;
        Ok(self.response)
    }

    /// Drops the response. The sender observes an unreachable node,
    /// though the target node has already handled the request.
    pub fn block_response(self) -> Result<ResponseResult, HandleError> {
        self.tx
            .send(Err(PeerError::Unreachable("response blocked".to_owned())))
            .map_err(|_| HandleError::TransportDropped)?;
        Ok(self.response)
    }
}

pub fn partition(node: NodeHandle, buffer: usize) -> (Route, Handle) {
    let (tx, rx) = mpsc::channel(buffer);
    let handle = Handle {
        node,
        rx: Arc::new(Mutex::new(rx)),
    };
    (Route { tx }, handle)
}
