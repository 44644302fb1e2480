use crate::error::ThreadError;
use crate::types::{Message, RequestId, Thread, ThreadId, UserId};
use chrono::{DateTime, Utc};

pub trait ThreadRepository {
    fn create(
        &self,
        request_id: &RequestId,
        seeker_id: &UserId,
        bidder_id: &UserId,
        expires_at: DateTime<Utc>,
    ) -> Result<Thread, ThreadError>;
    fn get(&self, id: &ThreadId) -> Result<Option<Thread>, ThreadError>;
    fn find(
        &self,
        request_id: &RequestId,
        bidder_id: &UserId,
    ) -> Result<Option<Thread>, ThreadError>;
    fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Thread>, ThreadError>;
    fn add_message(
        &self,
        thread_id: &ThreadId,
        sender_id: &UserId,
        body: &str,
    ) -> Result<Message, ThreadError>;
    /// Messages in append order, oldest first.
    fn messages(&self, thread_id: &ThreadId) -> Result<Vec<Message>, ThreadError>;
    /// Force-expires every thread attached to the request.
    fn expire_for_request(
        &self,
        request_id: &RequestId,
        at: DateTime<Utc>,
    ) -> Result<u64, ThreadError>;
    /// Deletes expired threads and their messages, returning the thread count.
    fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, ThreadError>;
}
