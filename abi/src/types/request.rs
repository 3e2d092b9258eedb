use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgRow, FromRow, Row};

use crate::{
    LoanDuration, RequestId, RequestStatus, RequestTarget, TargetKind, TransitionAction,
    Validator, WorkflowError,
};

/// One request in the lifecycle. Rows are append-only: transitions overwrite
/// `status` and the storekeeper flags, nothing is ever deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub id: RequestId,
    pub requester_id: String,
    pub target: RequestTarget,
    pub status: RequestStatus,
    pub quantity_requested: i32,
    pub quantity_issued: i32,
    pub duration: LoanDuration,
    pub issued: bool,
    pub returned: bool,
    pub decline_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Request {
    /// Apply the transition table: returns the next status, or
    /// `InvalidTransition` when the action does not match the current status.
    ///
    /// Issue and return only exist for item-typed requests; documents carry
    /// no stock to hand over.
    pub fn transition(&self, action: TransitionAction) -> Result<RequestStatus, WorkflowError> {
        if matches!(action, TransitionAction::Issue | TransitionAction::Return)
            && !self.target.is_item()
        {
            return Err(WorkflowError::InvalidTransition {
                from: self.status,
                action,
            });
        }

        match (self.status, action) {
            (RequestStatus::Pending, TransitionAction::Approve) => Ok(RequestStatus::Approved),
            (RequestStatus::Pending, TransitionAction::Decline) => Ok(RequestStatus::Declined),
            (RequestStatus::Approved, TransitionAction::Issue) => Ok(RequestStatus::Issued),
            (RequestStatus::Issued, TransitionAction::Return) => Ok(RequestStatus::Returned),
            (from, action) => Err(WorkflowError::InvalidTransition { from, action }),
        }
    }
}

// target is split over two columns, so the row mapping is written out by hand
impl FromRow<'_, PgRow> for Request {
    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        let kind: TargetKind = row.try_get("target_kind")?;
        let target_id: i64 = row.try_get("target_id")?;

        Ok(Self {
            id: row.try_get("id")?,
            requester_id: row.try_get("requester_id")?,
            target: RequestTarget::from((kind, target_id)),
            status: row.try_get("status")?,
            quantity_requested: row.try_get("quantity_requested")?,
            quantity_issued: row.try_get("quantity_issued")?,
            duration: row.try_get("duration")?,
            issued: row.try_get("issued")?,
            returned: row.try_get("returned")?,
            decline_reason: row.try_get("decline_reason")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Input for creating a request. Validated before anything is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRequest {
    pub requester_id: String,
    pub target: RequestTarget,
    pub quantity_requested: i32,
    pub duration: LoanDuration,
}

impl NewRequest {
    pub fn new(
        requester_id: impl Into<String>,
        target: RequestTarget,
        quantity_requested: i32,
        duration: LoanDuration,
    ) -> Self {
        Self {
            requester_id: requester_id.into(),
            target,
            quantity_requested,
            duration,
        }
    }
}

impl Validator for NewRequest {
    fn validate(&self) -> Result<(), WorkflowError> {
        if self.requester_id.is_empty() {
            return Err(WorkflowError::InvalidRequester(self.requester_id.clone()));
        }

        // quantity only means something for items; document requests carry 1
        if self.target.is_item() && self.quantity_requested < 1 {
            return Err(WorkflowError::InvalidQuantity(self.quantity_requested));
        }

        Ok(())
    }
}
