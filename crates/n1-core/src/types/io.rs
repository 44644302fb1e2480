use crate::types::enums::{Category, OfferStatus, RequestStatus};
use crate::types::ids::{RequestId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CreateRequestInput {
    pub owner_id: UserId,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub budget: i64,
    pub location: Option<String>,
    pub is_remote: bool,
    pub deadline: DateTime<Utc>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SubmitOfferInput {
    pub bidder_id: UserId,
    pub amount: i64,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema, IntoParams)]
pub struct RequestFilter {
    pub owner_id: Option<UserId>,
    pub status: Option<Vec<RequestStatus>>,
    pub category: Option<Category>,
    pub tag: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema, IntoParams)]
pub struct OfferFilter {
    pub request_id: Option<RequestId>,
    pub bidder_id: Option<UserId>,
    pub status: Option<Vec<OfferStatus>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RegisterUserInput {
    pub name: String,
    pub email: String,
    pub skills: Vec<String>,
    pub major: Option<String>,
    pub graduation_year: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UpdateProfileInput {
    pub name: Option<String>,
    pub skills: Option<Vec<String>>,
    pub major: Option<String>,
    pub graduation_year: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema, IntoParams)]
pub struct UserFilter {
    pub is_verified: Option<bool>,
    pub skill: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SendMessageInput {
    pub sender_id: UserId,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CreateDropInput {
    pub title: String,
    pub ends_at: DateTime<Utc>,
    pub request_ids: Vec<RequestId>,
}
