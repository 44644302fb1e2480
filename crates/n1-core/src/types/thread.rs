use crate::types::ids::{MessageId, RequestId, ThreadId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A chat conversation scoped to one Request and two participants.
/// Expired threads reject new messages and are removed by the purge loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Thread {
    pub id: ThreadId,
    pub request_id: RequestId,
    pub seeker_id: UserId,
    pub bidder_id: UserId,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Thread {
    pub fn is_participant(&self, user_id: &UserId) -> bool {
        &self.seeker_id == user_id || &self.bidder_id == user_id
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Message {
    pub id: MessageId,
    pub thread_id: ThreadId,
    pub sender_id: UserId,
    pub body: String,
    pub created_at: DateTime<Utc>,
}
