use crate::types::enums::OfferStatus;
use crate::types::ids::{OfferId, RequestId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A bid against a Request. Offers are never deleted once decided.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Offer {
    pub id: OfferId,
    pub request_id: RequestId,
    pub bidder_id: UserId,
    pub amount: i64,
    pub message: String,
    pub status: OfferStatus,
    pub created_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
}

impl Offer {
    pub fn is_decided(&self) -> bool {
        self.status != OfferStatus::Pending
    }
}
