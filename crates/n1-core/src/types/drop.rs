use crate::types::ids::{DropId, RequestId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A time-boxed grouping of Requests promoted together. Membership does
/// not alter a Request's own lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FlashDrop {
    pub id: DropId,
    pub title: String,
    pub ends_at: DateTime<Utc>,
    pub request_ids: Vec<RequestId>,
    pub created_at: DateTime<Utc>,
}

impl FlashDrop {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.ends_at > now
    }
}
