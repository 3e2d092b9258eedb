use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::WorkflowError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "request_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Declined,
    Issued,
    Returned,
}

impl RequestStatus {
    /// No transition is defined out of a terminal status.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, RequestStatus::Declined | RequestStatus::Returned)
    }
}

/// The four guarded operations of the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionAction {
    Approve,
    Decline,
    Issue,
    Return,
}

/// Admin verdict on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approved,
    Declined,
}

impl Decision {
    pub const fn action(&self) -> TransitionAction {
        match self {
            Decision::Approved => TransitionAction::Approve,
            Decision::Declined => TransitionAction::Decline,
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestStatus::Pending => write!(f, "pending"),
            RequestStatus::Approved => write!(f, "approved"),
            RequestStatus::Declined => write!(f, "declined"),
            RequestStatus::Issued => write!(f, "issued"),
            RequestStatus::Returned => write!(f, "returned"),
        }
    }
}

impl FromStr for RequestStatus {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RequestStatus::Pending),
            "approved" => Ok(RequestStatus::Approved),
            "declined" => Ok(RequestStatus::Declined),
            "issued" => Ok(RequestStatus::Issued),
            "returned" => Ok(RequestStatus::Returned),
            _ => Err(WorkflowError::Unknown),
        }
    }
}

impl fmt::Display for TransitionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionAction::Approve => write!(f, "approve"),
            TransitionAction::Decline => write!(f, "decline"),
            TransitionAction::Issue => write!(f, "issue"),
            TransitionAction::Return => write!(f, "return"),
        }
    }
}
