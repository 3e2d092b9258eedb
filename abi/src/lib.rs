mod config;
mod error;
mod types;

pub use config::*;
pub use error::*;
pub use types::*;

pub type RequestId = i64;
pub type ItemId = i64;
pub type DocumentId = i64;

pub trait Validator {
    fn validate(&self) -> Result<(), WorkflowError>;
}
