use abi::{Config, Role, WorkflowError};
use reservation::ReservationEngine;

mod policy;
mod service;

pub use policy::{AccessPolicy, RolePolicy};

/// The caller-facing surface: every operation is checked against the access
/// policy gate before it reaches the engine.
pub struct StoreService {
    engine: ReservationEngine,
    policy: Box<dyn AccessPolicy>,
}

/// Who is calling. Produced by the authentication layer, which lives outside
/// this workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: String,
    pub role: Role,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }
}

impl StoreService {
    pub fn new(engine: ReservationEngine) -> Self {
        Self::with_policy(engine, Box::new(RolePolicy))
    }

    pub fn with_policy(engine: ReservationEngine, policy: Box<dyn AccessPolicy>) -> Self {
        Self { engine, policy }
    }

    pub async fn from_config(config: &Config) -> Result<Self, WorkflowError> {
        let engine = ReservationEngine::from_config(&config.db).await?;
        Ok(Self::new(engine))
    }

    pub fn engine(&self) -> &ReservationEngine {
        &self.engine
    }
}
