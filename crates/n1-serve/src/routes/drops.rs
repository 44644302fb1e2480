use crate::middleware::correlation::CorrelationId;
use crate::routes::error::map_error;
use crate::{AppState, build_marketplace};
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::Utc;
use n1_core::error::DropError;
use n1_core::types::{CreateDropInput, DropId, FlashDrop};
use n1_events::types::EventSource;
use utoipa::ToSchema;

#[derive(Debug, serde::Serialize, ToSchema)]
pub struct DropParticipants {
    pub drop_id: DropId,
    pub participant_count: i64,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/drops", post(create_drop).get(list_drops))
        .route("/drops/{id}", get(get_drop))
        .route("/drops/{id}/participants", get(participants))
        .with_state(state)
}

fn parse_drop_id(id: &str, correlation_id: Option<String>) -> Result<DropId, Response> {
    DropId::new(id.to_string()).map_err(|err| {
        map_error(
            &n1_core::MarketError::Drop(DropError::InvalidInput {
                message: err.to_string(),
            }),
            correlation_id,
        )
        .into_response()
    })
}

#[utoipa::path(
    post,
    path = "/api/drops",
    request_body = CreateDropInput,
    responses((status = 200, body = FlashDrop))
)]
pub(crate) async fn create_drop(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Json(input): Json<CreateDropInput>,
) -> Response {
    let marketplace = match build_marketplace(&state) {
        Ok(marketplace) => marketplace,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    let ctx = n1_core::RequestContext::new(EventSource::Api, Some(correlation.0));
    match marketplace.drops().create(&ctx, input) {
        Ok(drop) => Json(drop).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/drops",
    responses((status = 200, body = Vec<FlashDrop>))
)]
pub(crate) async fn list_drops(State(state): State<AppState>) -> Response {
    let marketplace = match build_marketplace(&state) {
        Ok(marketplace) => marketplace,
        Err(err) => return map_error(&err, None).into_response(),
    };
    match marketplace.drops().list_active(Utc::now()) {
        Ok(drops) => Json(drops).into_response(),
        Err(err) => map_error(&err, None).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/drops/{id}",
    params(("id" = String, Path, description = "Drop ID")),
    responses((status = 200, body = FlashDrop), (status = 404))
)]
pub(crate) async fn get_drop(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let marketplace = match build_marketplace(&state) {
        Ok(marketplace) => marketplace,
        Err(err) => return map_error(&err, None).into_response(),
    };
    let drop_id = match parse_drop_id(&id, None) {
        Ok(value) => value,
        Err(response) => return response,
    };
    match marketplace.drops().get(&drop_id) {
        Ok(Some(drop)) => Json(drop).into_response(),
        Ok(None) => {
            map_error(&n1_core::MarketError::Drop(DropError::NotFound), None).into_response()
        }
        Err(err) => map_error(&err, None).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/drops/{id}/participants",
    params(("id" = String, Path, description = "Drop ID")),
    responses((status = 200, body = DropParticipants))
)]
pub(crate) async fn participants(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    let marketplace = match build_marketplace(&state) {
        Ok(marketplace) => marketplace,
        Err(err) => return map_error(&err, None).into_response(),
    };
    let drop_id = match parse_drop_id(&id, None) {
        Ok(value) => value,
        Err(response) => return response,
    };
    match marketplace.drops().participant_count(&drop_id) {
        Ok(participant_count) => Json(DropParticipants {
            drop_id,
            participant_count,
        })
        .into_response(),
        Err(err) => map_error(&err, None).into_response(),
    }
}
