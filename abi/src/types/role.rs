use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::WorkflowError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Lecturer,
    Admin,
    Storekeeper,
}

/// Operations the access policy gate rules on. One value per caller-facing
/// operation, so denials can name what was attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    SubmitRequest,
    ListOwnRequests,
    ListAllRequests,
    DecideRequest,
    ListQueue,
    IssueItem,
    ReturnItem,
    BrowseCatalogue,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Lecturer => write!(f, "lecturer"),
            Role::Admin => write!(f, "admin"),
            Role::Storekeeper => write!(f, "storekeeper"),
        }
    }
}

impl FromStr for Role {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lecturer" => Ok(Role::Lecturer),
            "admin" => Ok(Role::Admin),
            "storekeeper" => Ok(Role::Storekeeper),
            _ => Err(WorkflowError::Unknown),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::SubmitRequest => "submit a request",
            Operation::ListOwnRequests => "list own requests",
            Operation::ListAllRequests => "list all requests",
            Operation::DecideRequest => "decide a request",
            Operation::ListQueue => "list a storekeeper queue",
            Operation::IssueItem => "issue an item",
            Operation::ReturnItem => "take back an item",
            Operation::BrowseCatalogue => "browse the catalogue",
        };
        write!(f, "{}", name)
    }
}
