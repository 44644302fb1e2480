use axum::Json;
use axum::http::StatusCode;
use n1_core::error::{
    DropError, EventError, MarketError, OfferError, RequestError, ThreadError, UserError,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub code: &'static str,
    pub message: String,
    pub correlation_id: Option<String>,
}

pub fn map_error(
    err: &MarketError,
    correlation_id: Option<String>,
) -> (StatusCode, Json<ErrorEnvelope>) {
    let (status, code, message) = match err {
        MarketError::Request(request) => map_request_error(request),
        MarketError::Offer(offer) => map_offer_error(offer),
        MarketError::User(user) => map_user_error(user),
        MarketError::Thread(thread) => map_thread_error(thread),
        MarketError::Drop(drop) => map_drop_error(drop),
        MarketError::Event(event) => map_event_error(event),
        MarketError::Internal { message } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            message.clone(),
        ),
    };

    (
        status,
        Json(ErrorEnvelope {
            code,
            message,
            correlation_id,
        }),
    )
}

fn map_request_error(err: &RequestError) -> (StatusCode, &'static str, String) {
    match err {
        RequestError::NotFound => (StatusCode::NOT_FOUND, "not_found", err.to_string()),
        RequestError::InvalidTransition { .. } | RequestError::NotOpen => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "invalid_state",
            err.to_string(),
        ),
        RequestError::NotOwner => (StatusCode::FORBIDDEN, "unauthorized", err.to_string()),
        RequestError::InvalidInput { .. } => {
            (StatusCode::BAD_REQUEST, "invalid_input", err.to_string())
        }
        RequestError::Conflict { .. } => (StatusCode::CONFLICT, "conflict", err.to_string()),
    }
}

fn map_offer_error(err: &OfferError) -> (StatusCode, &'static str, String) {
    match err {
        OfferError::NotFound => (StatusCode::NOT_FOUND, "not_found", err.to_string()),
        OfferError::InvalidTransition { .. } | OfferError::AlreadyDecided => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "invalid_state",
            err.to_string(),
        ),
        OfferError::WrongRequest => (StatusCode::CONFLICT, "conflict", err.to_string()),
        OfferError::InvalidInput { .. } => {
            (StatusCode::BAD_REQUEST, "invalid_input", err.to_string())
        }
    }
}

fn map_user_error(err: &UserError) -> (StatusCode, &'static str, String) {
    match err {
        UserError::NotFound => (StatusCode::NOT_FOUND, "not_found", err.to_string()),
        UserError::NotSelf => (StatusCode::FORBIDDEN, "unauthorized", err.to_string()),
        UserError::InvalidInput { .. } => {
            (StatusCode::BAD_REQUEST, "invalid_input", err.to_string())
        }
    }
}

fn map_thread_error(err: &ThreadError) -> (StatusCode, &'static str, String) {
    match err {
        ThreadError::NotFound => (StatusCode::NOT_FOUND, "not_found", err.to_string()),
        ThreadError::NotParticipant => (StatusCode::FORBIDDEN, "unauthorized", err.to_string()),
        ThreadError::Expired => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "invalid_state",
            err.to_string(),
        ),
        ThreadError::InvalidInput { .. } => {
            (StatusCode::BAD_REQUEST, "invalid_input", err.to_string())
        }
    }
}

fn map_drop_error(err: &DropError) -> (StatusCode, &'static str, String) {
    match err {
        DropError::NotFound => (StatusCode::NOT_FOUND, "not_found", err.to_string()),
        DropError::InvalidInput { .. } => {
            (StatusCode::BAD_REQUEST, "invalid_input", err.to_string())
        }
    }
}

fn map_event_error(err: &EventError) -> (StatusCode, &'static str, String) {
    match err {
        EventError::InvalidInput { .. } => {
            (StatusCode::BAD_REQUEST, "invalid_input", err.to_string())
        }
    }
}
