use crate::error::OfferError;
use crate::types::{Offer, OfferFilter, OfferId, OfferStatus, RequestId, SubmitOfferInput};
use chrono::{DateTime, Utc};

pub trait OfferRepository {
    fn create(&self, request_id: &RequestId, input: SubmitOfferInput)
    -> Result<Offer, OfferError>;
    fn get(&self, id: &OfferId) -> Result<Option<Offer>, OfferError>;
    fn list(&self, filter: OfferFilter) -> Result<Vec<Offer>, OfferError>;
    fn list_for_request(&self, request_id: &RequestId) -> Result<Vec<Offer>, OfferError>;
    fn set_status(
        &self,
        id: &OfferId,
        status: OfferStatus,
        decided_at: Option<DateTime<Utc>>,
    ) -> Result<Offer, OfferError>;
}
