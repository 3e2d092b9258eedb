use derive_builder::Builder;

use crate::{RequestStatus, TargetKind};

/// Filter for listing requests. Build one with [`RequestQueryBuilder`]; unset
/// fields do not constrain the result.
#[derive(Debug, Clone, PartialEq, Builder)]
#[builder(setter(into), default)]
pub struct RequestQuery {
    #[builder(setter(into, strip_option))]
    pub requester_id: Option<String>,
    #[builder(setter(strip_option))]
    pub status: Option<RequestStatus>,
    #[builder(setter(strip_option))]
    pub target_kind: Option<TargetKind>,
    #[builder(setter(strip_option))]
    pub issued: Option<bool>,
    #[builder(setter(strip_option))]
    pub returned: Option<bool>,
    pub page: i32,
    pub page_size: i32,
    pub desc: bool,
}

impl Default for RequestQuery {
    fn default() -> Self {
        Self {
            requester_id: None,
            status: None,
            target_kind: None,
            issued: None,
            returned: None,
            page: 1,
            page_size: 20,
            desc: false,
        }
    }
}

impl RequestQuery {
    pub fn limit(&self) -> i64 {
        i64::from(self.page_size.clamp(1, 100))
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page.max(1) - 1) * self.limit()
    }
}

/// The storekeeper's three work queues, all item-typed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestQueue {
    /// Approved but not yet handed over.
    Approved,
    /// Handed over, still out.
    Issued,
    /// Stock back on the shelf.
    Returned,
}

impl RequestQueue {
    pub fn to_query(self) -> RequestQuery {
        let (status, issued, returned) = match self {
            RequestQueue::Approved => (RequestStatus::Approved, Some(false), None),
            RequestQueue::Issued => (RequestStatus::Issued, Some(true), None),
            RequestQueue::Returned => (RequestStatus::Returned, None, Some(true)),
        };

        RequestQuery {
            status: Some(status),
            target_kind: Some(TargetKind::Item),
            issued,
            returned,
            ..Default::default()
        }
    }
}
