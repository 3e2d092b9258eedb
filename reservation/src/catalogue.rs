use abi::{
    Document, DocumentId, Item, ItemId, NewDocument, NewItem, Validator, WorkflowError,
};
use async_trait::async_trait;

use crate::{Catalogue, ReservationEngine};

#[async_trait]
impl Catalogue for ReservationEngine {
    async fn create_item(&self, new: NewItem) -> Result<Item, WorkflowError> {
        new.validate()?;

        let item = sqlx::query_as(
            "INSERT INTO items (name, description, category, quantity) VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.category)
        .bind(new.quantity)
        .fetch_one(&self.pool)
        .await?;

        Ok(item)
    }

    async fn get_item(&self, id: ItemId) -> Result<Item, WorkflowError> {
        sqlx::query_as("SELECT * FROM items WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(WorkflowError::ItemNotFound(id))
    }

    async fn list_items(&self) -> Result<Vec<Item>, WorkflowError> {
        let items = sqlx::query_as("SELECT * FROM items ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    async fn create_document(&self, new: NewDocument) -> Result<Document, WorkflowError> {
        new.validate()?;

        let document = sqlx::query_as(
            "INSERT INTO documents (title, description, file_url, uploaded_by) VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(&new.title)
        .bind(&new.description)
        .bind(&new.file_url)
        .bind(&new.uploaded_by)
        .fetch_one(&self.pool)
        .await?;

        Ok(document)
    }

    async fn get_document(&self, id: DocumentId) -> Result<Document, WorkflowError> {
        sqlx::query_as("SELECT * FROM documents WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(WorkflowError::DocumentNotFound(id))
    }

    async fn list_documents(&self) -> Result<Vec<Document>, WorkflowError> {
        // newest first, the way the catalogue is browsed
        let documents = sqlx::query_as("SELECT * FROM documents ORDER BY created_at DESC, id DESC")
            .fetch_all(&self.pool)
            .await?;

        Ok(documents)
    }

    async fn record_download(&self, id: DocumentId) -> Result<Document, WorkflowError> {
        sqlx::query_as(
            "UPDATE documents SET download_count = download_count + 1, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(WorkflowError::DocumentNotFound(id))
    }
}
