use thiserror::Error;

use crate::{
    DocumentId, ItemId, Operation, RequestId, RequestStatus, Role, TransitionAction,
};

#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("unknown error")]
    Unknown,

    #[error("invalid requester id: {0:?}")]
    InvalidRequester(String),

    #[error("invalid quantity: {0}, must be at least 1")]
    InvalidQuantity(i32),

    #[error("invalid duration: {0:?}")]
    InvalidDuration(String),

    #[error("invalid item: {0}")]
    InvalidItem(String),

    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("request not found: {0}")]
    RequestNotFound(RequestId),

    #[error("item not found: {0}")]
    ItemNotFound(ItemId),

    #[error("document not found: {0}")]
    DocumentNotFound(DocumentId),

    #[error("invalid transition: cannot {action} a {from} request")]
    InvalidTransition {
        from: RequestStatus,
        action: TransitionAction,
    },

    #[error("insufficient stock for item {item_id}: requested {requested}, available {available}")]
    InsufficientStock {
        item_id: ItemId,
        requested: i32,
        available: i32,
    },

    #[error("{role} is not allowed to {operation}")]
    Forbidden { role: Role, operation: Operation },

    #[error("db error: {0}")]
    DbError(#[from] sqlx::Error),
}

impl PartialEq for WorkflowError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            // sqlx errors are not comparable, treat any two as equal
            (Self::DbError(_), Self::DbError(_)) => true,
            (Self::Unknown, Self::Unknown) => true,
            (Self::InvalidRequester(v1), Self::InvalidRequester(v2)) => v1 == v2,
            (Self::InvalidQuantity(v1), Self::InvalidQuantity(v2)) => v1 == v2,
            (Self::InvalidDuration(v1), Self::InvalidDuration(v2)) => v1 == v2,
            (Self::InvalidItem(v1), Self::InvalidItem(v2)) => v1 == v2,
            (Self::InvalidDocument(v1), Self::InvalidDocument(v2)) => v1 == v2,
            (Self::RequestNotFound(v1), Self::RequestNotFound(v2)) => v1 == v2,
            (Self::ItemNotFound(v1), Self::ItemNotFound(v2)) => v1 == v2,
            (Self::DocumentNotFound(v1), Self::DocumentNotFound(v2)) => v1 == v2,
            (
                Self::InvalidTransition { from: f1, action: a1 },
                Self::InvalidTransition { from: f2, action: a2 },
            ) => f1 == f2 && a1 == a2,
            (
                Self::InsufficientStock {
                    item_id: i1,
                    requested: r1,
                    available: a1,
                },
                Self::InsufficientStock {
                    item_id: i2,
                    requested: r2,
                    available: a2,
                },
            ) => i1 == i2 && r1 == r2 && a1 == a2,
            (
                Self::Forbidden { role: r1, operation: o1 },
                Self::Forbidden { role: r2, operation: o2 },
            ) => r1 == r2 && o1 == o2,
            _ => false,
        }
    }
}
