use crate::middleware::correlation::CorrelationId;
use crate::routes::error::map_error;
use crate::{AppState, build_marketplace};
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use n1_core::error::RequestError;
use n1_core::types::{
    CreateRequestInput, Offer, OfferId, Request, RequestFilter, RequestId, SubmitOfferInput,
    UserId,
};
use n1_events::types::EventSource;
use utoipa::ToSchema;

#[derive(Debug, serde::Deserialize, ToSchema)]
pub struct ActorInput {
    pub user_id: UserId,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/requests", post(create_request).get(list_requests))
        .route("/requests/{id}", get(get_request))
        .route(
            "/requests/{id}/offers",
            post(submit_offer).get(list_request_offers),
        )
        .route(
            "/requests/{id}/offers/{offer_id}/accept",
            post(accept_offer),
        )
        .route(
            "/requests/{id}/offers/{offer_id}/decline",
            post(decline_offer),
        )
        .route("/requests/{id}/complete", post(complete_request))
        .route("/requests/{id}/cancel", post(cancel_request))
        .with_state(state)
}

fn parse_request_id(id: &str, correlation_id: Option<String>) -> Result<RequestId, Response> {
    RequestId::new(id.to_string()).map_err(|err| {
        map_error(
            &n1_core::MarketError::Request(RequestError::InvalidInput {
                message: err.to_string(),
            }),
            correlation_id,
        )
        .into_response()
    })
}

fn parse_offer_id(id: &str, correlation_id: Option<String>) -> Result<OfferId, Response> {
    OfferId::new(id.to_string()).map_err(|err| {
        map_error(
            &n1_core::MarketError::Request(RequestError::InvalidInput {
                message: err.to_string(),
            }),
            correlation_id,
        )
        .into_response()
    })
}

#[utoipa::path(
    post,
    path = "/api/requests",
    request_body = CreateRequestInput,
    responses((status = 200, body = Request))
)]
pub(crate) async fn create_request(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Json(input): Json<CreateRequestInput>,
) -> Response {
    let marketplace = match build_marketplace(&state) {
        Ok(marketplace) => marketplace,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    let ctx = n1_core::RequestContext::new(EventSource::Api, Some(correlation.0));
    match marketplace.requests().create(&ctx, input) {
        Ok(request) => Json(request).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/requests",
    params(RequestFilter),
    responses((status = 200, body = Vec<Request>))
)]
pub(crate) async fn list_requests(
    State(state): State<AppState>,
    Query(filter): Query<RequestFilter>,
) -> Response {
    let marketplace = match build_marketplace(&state) {
        Ok(marketplace) => marketplace,
        Err(err) => return map_error(&err, None).into_response(),
    };
    match marketplace.requests().list(filter) {
        Ok(requests) => Json(requests).into_response(),
        Err(err) => map_error(&err, None).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/requests/{id}",
    params(("id" = String, Path, description = "Request ID")),
    responses((status = 200, body = Request), (status = 404))
)]
pub(crate) async fn get_request(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let marketplace = match build_marketplace(&state) {
        Ok(marketplace) => marketplace,
        Err(err) => return map_error(&err, None).into_response(),
    };
    let request_id = match parse_request_id(&id, None) {
        Ok(value) => value,
        Err(response) => return response,
    };
    match marketplace.requests().get(&request_id) {
        Ok(Some(request)) => Json(request).into_response(),
        Ok(None) => {
            map_error(&n1_core::MarketError::Request(RequestError::NotFound), None).into_response()
        }
        Err(err) => map_error(&err, None).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/requests/{id}/offers",
    params(("id" = String, Path, description = "Request ID")),
    responses((status = 200, body = Vec<Offer>))
)]
pub(crate) async fn list_request_offers(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    let marketplace = match build_marketplace(&state) {
        Ok(marketplace) => marketplace,
        Err(err) => return map_error(&err, None).into_response(),
    };
    let request_id = match parse_request_id(&id, None) {
        Ok(value) => value,
        Err(response) => return response,
    };
    match marketplace.requests().offers_for(&request_id) {
        Ok(offers) => Json(offers).into_response(),
        Err(err) => map_error(&err, None).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/requests/{id}/offers",
    params(("id" = String, Path, description = "Request ID")),
    request_body = SubmitOfferInput,
    responses((status = 200, body = Offer))
)]
pub(crate) async fn submit_offer(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Path(id): Path<String>,
    Json(input): Json<SubmitOfferInput>,
) -> Response {
    let marketplace = match build_marketplace(&state) {
        Ok(marketplace) => marketplace,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    let request_id = match parse_request_id(&id, Some(correlation.0.clone())) {
        Ok(value) => value,
        Err(response) => return response,
    };
    let ctx = n1_core::RequestContext::new(EventSource::Api, Some(correlation.0));
    match marketplace.requests().submit_offer(&ctx, &request_id, input) {
        Ok(offer) => Json(offer).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/requests/{id}/offers/{offer_id}/accept",
    params(
        ("id" = String, Path, description = "Request ID"),
        ("offer_id" = String, Path, description = "Offer ID")
    ),
    request_body = ActorInput,
    responses((status = 200, body = Request))
)]
pub(crate) async fn accept_offer(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Path((id, offer_id)): Path<(String, String)>,
    Json(input): Json<ActorInput>,
) -> Response {
    let marketplace = match build_marketplace(&state) {
        Ok(marketplace) => marketplace,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    let request_id = match parse_request_id(&id, Some(correlation.0.clone())) {
        Ok(value) => value,
        Err(response) => return response,
    };
    let offer_id = match parse_offer_id(&offer_id, Some(correlation.0.clone())) {
        Ok(value) => value,
        Err(response) => return response,
    };
    let ctx = n1_core::RequestContext::new(EventSource::Api, Some(correlation.0));
    match marketplace
        .requests()
        .accept_offer(&ctx, &request_id, &offer_id, &input.user_id)
    {
        Ok(request) => Json(request).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/requests/{id}/offers/{offer_id}/decline",
    params(
        ("id" = String, Path, description = "Request ID"),
        ("offer_id" = String, Path, description = "Offer ID")
    ),
    request_body = ActorInput,
    responses((status = 200, body = Offer))
)]
pub(crate) async fn decline_offer(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Path((id, offer_id)): Path<(String, String)>,
    Json(input): Json<ActorInput>,
) -> Response {
    let marketplace = match build_marketplace(&state) {
        Ok(marketplace) => marketplace,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    let request_id = match parse_request_id(&id, Some(correlation.0.clone())) {
        Ok(value) => value,
        Err(response) => return response,
    };
    let offer_id = match parse_offer_id(&offer_id, Some(correlation.0.clone())) {
        Ok(value) => value,
        Err(response) => return response,
    };
    let ctx = n1_core::RequestContext::new(EventSource::Api, Some(correlation.0));
    match marketplace
        .requests()
        .decline_offer(&ctx, &request_id, &offer_id, &input.user_id)
    {
        Ok(offer) => Json(offer).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/requests/{id}/complete",
    params(("id" = String, Path, description = "Request ID")),
    request_body = ActorInput,
    responses((status = 200, body = Request))
)]
pub(crate) async fn complete_request(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Path(id): Path<String>,
    Json(input): Json<ActorInput>,
) -> Response {
    let marketplace = match build_marketplace(&state) {
        Ok(marketplace) => marketplace,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    let request_id = match parse_request_id(&id, Some(correlation.0.clone())) {
        Ok(value) => value,
        Err(response) => return response,
    };
    let ctx = n1_core::RequestContext::new(EventSource::Api, Some(correlation.0));
    match marketplace
        .requests()
        .complete(&ctx, &request_id, &input.user_id)
    {
        Ok(request) => Json(request).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/requests/{id}/cancel",
    params(("id" = String, Path, description = "Request ID")),
    request_body = ActorInput,
    responses((status = 200, body = Request))
)]
pub(crate) async fn cancel_request(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    Path(id): Path<String>,
    Json(input): Json<ActorInput>,
) -> Response {
    let marketplace = match build_marketplace(&state) {
        Ok(marketplace) => marketplace,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    let request_id = match parse_request_id(&id, Some(correlation.0.clone())) {
        Ok(value) => value,
        Err(response) => return response,
    };
    let ctx = n1_core::RequestContext::new(EventSource::Api, Some(correlation.0));
    match marketplace
        .requests()
        .cancel(&ctx, &request_id, &input.user_id)
    {
        Ok(request) => Json(request).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}
