use crate::error::RequestError;
use crate::types::{CreateRequestInput, Request, RequestFilter, RequestId};

pub trait RequestRepository {
    fn create(&self, input: CreateRequestInput) -> Result<Request, RequestError>;
    fn get(&self, id: &RequestId) -> Result<Option<Request>, RequestError>;
    fn list(&self, filter: RequestFilter) -> Result<Vec<Request>, RequestError>;
    /// Conditional write. Persists `request` only if the stored row still
    /// carries `expected_version`; the stored version is bumped by one.
    /// A missed condition fails with `RequestError::Conflict`.
    fn update(&self, request: &Request, expected_version: i64) -> Result<Request, RequestError>;
}
