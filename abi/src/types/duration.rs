use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::WorkflowError;

/// How long the requester wants to keep the target. Fixed set of values,
/// stored verbatim as a Postgres enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "loan_duration")]
pub enum LoanDuration {
    #[sqlx(rename = "1 day")]
    #[serde(rename = "1 day")]
    OneDay,
    #[sqlx(rename = "2 days")]
    #[serde(rename = "2 days")]
    TwoDays,
    #[sqlx(rename = "3 days")]
    #[serde(rename = "3 days")]
    ThreeDays,
    #[sqlx(rename = "4 days")]
    #[serde(rename = "4 days")]
    FourDays,
    #[sqlx(rename = "5 days")]
    #[serde(rename = "5 days")]
    FiveDays,
    #[sqlx(rename = "1 week")]
    #[serde(rename = "1 week")]
    OneWeek,
}

impl LoanDuration {
    pub const fn days(&self) -> i64 {
        match self {
            LoanDuration::OneDay => 1,
            LoanDuration::TwoDays => 2,
            LoanDuration::ThreeDays => 3,
            LoanDuration::FourDays => 4,
            LoanDuration::FiveDays => 5,
            LoanDuration::OneWeek => 7,
        }
    }
}

impl fmt::Display for LoanDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoanDuration::OneDay => write!(f, "1 day"),
            LoanDuration::TwoDays => write!(f, "2 days"),
            LoanDuration::ThreeDays => write!(f, "3 days"),
            LoanDuration::FourDays => write!(f, "4 days"),
            LoanDuration::FiveDays => write!(f, "5 days"),
            LoanDuration::OneWeek => write!(f, "1 week"),
        }
    }
}

impl FromStr for LoanDuration {
    type Err = WorkflowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "1 day" => Ok(LoanDuration::OneDay),
            "2 days" => Ok(LoanDuration::TwoDays),
            "3 days" => Ok(LoanDuration::ThreeDays),
            "4 days" => Ok(LoanDuration::FourDays),
            "5 days" => Ok(LoanDuration::FiveDays),
            "1 week" => Ok(LoanDuration::OneWeek),
            _ => Err(WorkflowError::InvalidDuration(s.to_string())),
        }
    }
}
