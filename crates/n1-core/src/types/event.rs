use crate::types::{
    FlashDrop, Message, Offer, Request, RequestStatus, Thread, User, UserId,
};
use chrono::{DateTime, Utc};
use n1_events::types::EventSource;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Event {
    pub id: String,
    pub seq: i64,
    pub at: DateTime<Utc>,
    pub correlation_id: Option<String>,
    pub source: EventSource,
    pub body: EventBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", content = "payload")]
pub enum EventBody {
    RequestCreated {
        request: Request,
    },
    RequestStatusChanged {
        request: Request,
        from: RequestStatus,
        to: RequestStatus,
    },
    RequestCompleted {
        request: Request,
    },
    RequestCancelled {
        request: Request,
    },

    OfferSubmitted {
        offer: Offer,
    },
    OfferAccepted {
        offer: Offer,
    },
    OfferDeclined {
        offer: Offer,
    },

    ThreadOpened {
        thread: Thread,
    },
    MessageSent {
        message: Message,
    },
    ThreadsPurged {
        purged: u64,
    },

    UserRegistered {
        user: User,
    },
    ProfileUpdated {
        user: User,
    },
    KarmaAwarded {
        user_id: UserId,
        delta: i64,
        reason: String,
    },

    DropCreated {
        drop: FlashDrop,
    },
}
