use std::sync::Arc;

use abi::{
    DbConfig, Decision, Document, DocumentId, Item, ItemId, NewDocument, NewItem, NewRequest,
    Request, RequestId, RequestQuery, WorkflowError,
};
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};

mod catalogue;
mod manager;
mod notifier;

pub use notifier::{LogNotifier, Notifier};

/// The reservation engine: loads the request and its catalogue entry,
/// validates the transition preconditions, and commits the status and
/// quantity mutations as one unit.
#[derive(Clone)]
pub struct ReservationEngine {
    pool: PgPool,
    notifier: Arc<dyn Notifier>,
}

#[async_trait]
pub trait RequestWorkflow {
    /// submit a new request; it starts out pending
    async fn create_request(&self, new: NewRequest) -> Result<Request, WorkflowError>;
    /// approve or decline a pending request, optionally recording why
    async fn decide(
        &self,
        id: RequestId,
        decision: Decision,
        reason: Option<String>,
    ) -> Result<Request, WorkflowError>;
    /// hand stock over, decrementing the item quantity
    async fn issue(&self, id: RequestId) -> Result<Request, WorkflowError>;
    /// take stock back, restoring the item quantity
    async fn mark_returned(&self, id: RequestId) -> Result<Request, WorkflowError>;
    /// get a request by id
    async fn get_request(&self, id: RequestId) -> Result<Request, WorkflowError>;
    /// query requests by requester, status, target kind and flags
    async fn query_requests(&self, query: RequestQuery) -> Result<Vec<Request>, WorkflowError>;
}

#[async_trait]
pub trait Catalogue {
    async fn create_item(&self, new: NewItem) -> Result<Item, WorkflowError>;
    async fn get_item(&self, id: ItemId) -> Result<Item, WorkflowError>;
    async fn list_items(&self) -> Result<Vec<Item>, WorkflowError>;
    async fn create_document(&self, new: NewDocument) -> Result<Document, WorkflowError>;
    async fn get_document(&self, id: DocumentId) -> Result<Document, WorkflowError>;
    async fn list_documents(&self) -> Result<Vec<Document>, WorkflowError>;
    /// bump the download counter; the file itself is served elsewhere
    async fn record_download(&self, id: DocumentId) -> Result<Document, WorkflowError>;
}

impl ReservationEngine {
    pub fn new(pool: PgPool, notifier: Arc<dyn Notifier>) -> Self {
        Self { pool, notifier }
    }

    /// engine with the default log-only dispatcher
    pub fn with_pool(pool: PgPool) -> Self {
        Self::new(pool, Arc::new(LogNotifier))
    }

    pub async fn from_config(config: &DbConfig) -> Result<Self, WorkflowError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.to_url())
            .await?;

        Ok(Self::with_pool(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
