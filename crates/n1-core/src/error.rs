use crate::types::enums::{OfferStatus, RequestStatus};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("request not found")]
    NotFound,
    #[error("invalid transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: RequestStatus,
        to: RequestStatus,
    },
    #[error("request not open")]
    NotOpen,
    #[error("not the request owner")]
    NotOwner,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("conflict: {message}")]
    Conflict { message: String },
}

#[derive(Debug, Error)]
pub enum OfferError {
    #[error("offer not found")]
    NotFound,
    #[error("invalid transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: OfferStatus,
        to: OfferStatus,
    },
    #[error("offer already decided")]
    AlreadyDecided,
    #[error("offer does not belong to request")]
    WrongRequest,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

#[derive(Debug, Error)]
pub enum UserError {
    #[error("user not found")]
    NotFound,
    #[error("not authorized to edit this profile")]
    NotSelf,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

#[derive(Debug, Error)]
pub enum ThreadError {
    #[error("thread not found")]
    NotFound,
    #[error("not a thread participant")]
    NotParticipant,
    #[error("thread expired")]
    Expired,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

#[derive(Debug, Error)]
pub enum DropError {
    #[error("drop not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

#[derive(Debug, Error)]
pub enum EventError {
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

#[derive(Debug, Error)]
pub enum MarketError {
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error(transparent)]
    Offer(#[from] OfferError),
    #[error(transparent)]
    User(#[from] UserError),
    #[error(transparent)]
    Thread(#[from] ThreadError),
    #[error(transparent)]
    Drop(#[from] DropError),
    #[error(transparent)]
    Event(#[from] EventError),
    #[error("internal error: {message}")]
    Internal { message: String },
}
