use crate::middleware::correlation::CorrelationId;
use crate::routes::error::map_error;
use crate::{AppState, build_marketplace};
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Json, Router};
use n1_core::error::ThreadError;
use n1_core::types::{Message, SendMessageInput, Thread, ThreadId, UserId};
use n1_events::types::EventSource;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, serde::Deserialize, ToSchema, IntoParams)]
pub struct ThreadListQuery {
    pub user_id: UserId,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/threads", get(list_threads))
        .route("/threads/{id}", get(get_thread))
        .route(
            "/threads/{id}/messages",
            get(list_messages).post(send_message),
        )
        .with_state(state)
}

fn parse_thread_id(id: &str, correlation_id: Option<String>) -> Result<ThreadId, Response> {
    ThreadId::new(id.to_string()).map_err(|err| {
        map_error(
            &n1_core::MarketError::Thread(ThreadError::InvalidInput {
                message: err.to_string(),
            }),
            correlation_id,
        )
        .into_response()
    })
}

#[utoipa::path(
    get,
    path = "/api/threads",
    params(ThreadListQuery),
    responses((status = 200, body = Vec<Thread>))
)]
pub(crate) async fn list_threads(
    State(state): State<AppState>,
    Query(query): Query<ThreadListQuery>,
) -> Response {
    let marketplace = match build_marketplace(&state) {
        Ok(marketplace) => marketplace,
        Err(err) => return map_error(&err, None).into_response(),
    };
    match marketplace.threads().list_for_user(&query.user_id) {
        Ok(threads) => Json(threads).into_response(),
        Err(err) => map_error(&err, None).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/threads/{id}",
    params(("id" = String, Path, description = "Thread ID")),
    responses((status = 200, body = Thread), (status = 404))
)]
pub(crate) async fn get_thread(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let marketplace = match build_marketplace(&state) {
        Ok(marketplace) => marketplace,
        Err(err) => return map_error(&err, None).into_response(),
    };
    let thread_id = match parse_thread_id(&id, None) {
        Ok(value) => value,
        Err(response) => return response,
    };
    match marketplace.threads().get(&thread_id) {
        Ok(Some(thread)) => Json(thread).into_response(),
        Ok(None) => {
            map_error(&n1_core::MarketError::Thread(ThreadError::NotFound), None).into_response()
        }
        Err(err) => map_error(&err, None).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/threads/{id}/messages",
    params(("id" = String, Path, description = "Thread ID")),
    responses((status = 200, body = Vec<Message>))
)]
pub(crate) async fn list_messages(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    let marketplace = match build_marketplace(&state) {
        Ok(marketplace) => marketplace,
        Err(err) => return map_error(&err, None).into_response(),
    };
    let thread_id = match parse_thread_id(&id, None) {
        Ok(value) => value,
        Err(response) => return response,
    };
    match marketplace.threads().messages(&thread_id) {
        Ok(messages) => Json(messages).into_response(),
        Err(err) => map_error(&err, None).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/threads/{id}/messages",
    params(("id" = String, Path, description = "Thread ID")),
    request_body = SendMessageInput,
    responses((status = 200, body = Message))
)]
pub(crate) async fn send_message(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Path(id): Path<String>,
    Json(input): Json<SendMessageInput>,
) -> Response {
    let marketplace = match build_marketplace(&state) {
        Ok(marketplace) => marketplace,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    let thread_id = match parse_thread_id(&id, Some(correlation.0.clone())) {
        Ok(value) => value,
        Err(response) => return response,
    };
    let ctx = n1_core::RequestContext::new(EventSource::Api, Some(correlation.0));
    match marketplace.threads().send_message(&ctx, &thread_id, input) {
        Ok(message) => Json(message).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}
