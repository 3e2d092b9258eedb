use core::fmt;

use serde::{Deserialize, Serialize};

use crate::{DocumentId, ItemId};

/// What a request points at. The engine pattern-matches on this to decide
/// whether quantity bookkeeping applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum RequestTarget {
    Item(ItemId),
    Document(DocumentId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "target_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Item,
    Document,
}

impl RequestTarget {
    pub const fn kind(&self) -> TargetKind {
        match self {
            RequestTarget::Item(_) => TargetKind::Item,
            RequestTarget::Document(_) => TargetKind::Document,
        }
    }

    pub const fn id(&self) -> i64 {
        match self {
            RequestTarget::Item(id) | RequestTarget::Document(id) => *id,
        }
    }

    pub const fn is_item(&self) -> bool {
        matches!(self, RequestTarget::Item(_))
    }
}

impl From<(TargetKind, i64)> for RequestTarget {
    fn from((kind, id): (TargetKind, i64)) -> Self {
        match kind {
            TargetKind::Item => RequestTarget::Item(id),
            TargetKind::Document => RequestTarget::Document(id),
        }
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKind::Item => write!(f, "item"),
            TargetKind::Document => write!(f, "document"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_should_expose_kind_and_id() {
        let target = RequestTarget::Item(42);
        assert_eq!(target.kind(), TargetKind::Item);
        assert_eq!(target.id(), 42);
        assert!(target.is_item());

        let target = RequestTarget::Document(7);
        assert_eq!(target.kind(), TargetKind::Document);
        assert_eq!(target.id(), 7);
        assert!(!target.is_item());
    }

    #[test]
    fn target_should_build_from_kind_and_id() {
        assert_eq!(
            RequestTarget::from((TargetKind::Item, 3)),
            RequestTarget::Item(3)
        );
        assert_eq!(
            RequestTarget::from((TargetKind::Document, 9)),
            RequestTarget::Document(9)
        );
    }
}
