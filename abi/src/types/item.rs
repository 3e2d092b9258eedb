use core::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ItemId, Validator, WorkflowError};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "item_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ItemCategory {
    Lab,
    Electronics,
    Books,
    #[default]
    General,
}

/// A catalogue entry with physical stock. `quantity` is the count currently
/// available, mutated only through issue/return transitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub description: String,
    pub category: ItemCategory,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewItem {
    pub name: String,
    pub description: String,
    pub category: ItemCategory,
    pub quantity: i32,
}

impl NewItem {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        category: ItemCategory,
        quantity: i32,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            category,
            quantity,
        }
    }
}

impl Validator for NewItem {
    fn validate(&self) -> Result<(), WorkflowError> {
        if self.name.trim().is_empty() {
            return Err(WorkflowError::InvalidItem("name is required".to_string()));
        }

        if self.quantity < 0 {
            return Err(WorkflowError::InvalidItem(format!(
                "quantity cannot be negative: {}",
                self.quantity
            )));
        }

        Ok(())
    }
}

impl fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemCategory::Lab => write!(f, "lab"),
            ItemCategory::Electronics => write!(f, "electronics"),
            ItemCategory::Books => write!(f, "books"),
            ItemCategory::General => write!(f, "general"),
        }
    }
}
