use crate::types::enums::{Category, RequestStatus};
use crate::types::ids::{RequestId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A posted need for help. `version` increments on every successful
/// mutation and guards conditional writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Request {
    pub id: RequestId,
    pub owner_id: UserId,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub budget: i64,
    pub location: Option<String>,
    pub is_remote: bool,
    pub deadline: DateTime<Utc>,
    pub status: RequestStatus,
    pub bid_count: i64,
    pub tags: Vec<String>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Request {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.status,
            RequestStatus::Completed | RequestStatus::Cancelled
        )
    }

    /// Advisory only. Transitions never consult the deadline.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status == RequestStatus::Open && self.deadline < now
    }
}
