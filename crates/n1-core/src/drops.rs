use crate::error::DropError;
use crate::types::{CreateDropInput, DropId, FlashDrop};
use chrono::{DateTime, Utc};

pub trait DropRepository {
    fn create(&self, input: CreateDropInput) -> Result<FlashDrop, DropError>;
    fn get(&self, id: &DropId) -> Result<Option<FlashDrop>, DropError>;
    fn list_active(&self, now: DateTime<Utc>) -> Result<Vec<FlashDrop>, DropError>;
    /// Distinct bidders across the drop's requests.
    fn participant_count(&self, id: &DropId) -> Result<i64, DropError>;
}
