use abi::{
    Decision, Document, Item, NewRequest, Operation, Request, RequestId, RequestQuery,
    RequestQueryBuilder, RequestQueue, WorkflowError,
};
use reservation::{Catalogue, RequestWorkflow};

use crate::{Actor, StoreService};

impl StoreService {
    /// Lecturer submits a request. The requester is stamped from the actor,
    /// never trusted from the payload.
    pub async fn submit(&self, actor: &Actor, new: NewRequest) -> Result<Request, WorkflowError> {
        self.policy.authorize(actor.role, Operation::SubmitRequest)?;

        let mut new = new;
        new.requester_id = actor.id.clone();
        self.engine.create_request(new).await
    }

    /// Admin approves or declines a pending request.
    pub async fn decide(
        &self,
        actor: &Actor,
        id: RequestId,
        decision: Decision,
        reason: Option<String>,
    ) -> Result<Request, WorkflowError> {
        self.policy.authorize(actor.role, Operation::DecideRequest)?;
        self.engine.decide(id, decision, reason).await
    }

    /// Storekeeper hands the stock over.
    pub async fn issue(&self, actor: &Actor, id: RequestId) -> Result<Request, WorkflowError> {
        self.policy.authorize(actor.role, Operation::IssueItem)?;
        self.engine.issue(id).await
    }

    /// Storekeeper takes the stock back.
    pub async fn mark_returned(
        &self,
        actor: &Actor,
        id: RequestId,
    ) -> Result<Request, WorkflowError> {
        self.policy.authorize(actor.role, Operation::ReturnItem)?;
        self.engine.mark_returned(id).await
    }

    pub async fn my_requests(&self, actor: &Actor) -> Result<Vec<Request>, WorkflowError> {
        self.policy
            .authorize(actor.role, Operation::ListOwnRequests)?;

        let query = RequestQueryBuilder::default()
            .requester_id(actor.id.clone())
            .build()
            .map_err(|_| WorkflowError::Unknown)?;
        self.engine.query_requests(query).await
    }

    pub async fn all_requests(
        &self,
        actor: &Actor,
        query: RequestQuery,
    ) -> Result<Vec<Request>, WorkflowError> {
        self.policy
            .authorize(actor.role, Operation::ListAllRequests)?;
        self.engine.query_requests(query).await
    }

    /// One of the storekeeper's three derived queues.
    pub async fn queue(
        &self,
        actor: &Actor,
        queue: RequestQueue,
    ) -> Result<Vec<Request>, WorkflowError> {
        self.policy.authorize(actor.role, Operation::ListQueue)?;
        self.engine.query_requests(queue.to_query()).await
    }

    pub async fn items(&self, actor: &Actor) -> Result<Vec<Item>, WorkflowError> {
        self.policy
            .authorize(actor.role, Operation::BrowseCatalogue)?;
        self.engine.list_items().await
    }

    pub async fn documents(&self, actor: &Actor) -> Result<Vec<Document>, WorkflowError> {
        self.policy
            .authorize(actor.role, Operation::BrowseCatalogue)?;
        self.engine.list_documents().await
    }
}
