use crate::routes::error::map_error;
use crate::{AppState, build_marketplace};
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use n1_core::error::OfferError;
use n1_core::types::{Offer, OfferFilter, OfferId};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/offers", get(list_offers))
        .route("/offers/{id}", get(get_offer))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/offers",
    params(OfferFilter),
    responses((status = 200, body = Vec<Offer>))
)]
pub(crate) async fn list_offers(
    State(state): State<AppState>,
    Query(filter): Query<OfferFilter>,
) -> Response {
    let marketplace = match build_marketplace(&state) {
        Ok(marketplace) => marketplace,
        Err(err) => return map_error(&err, None).into_response(),
    };
    match marketplace.offers().list(filter) {
        Ok(offers) => Json(offers).into_response(),
        Err(err) => map_error(&err, None).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/offers/{id}",
    params(("id" = String, Path, description = "Offer ID")),
    responses((status = 200, body = Offer), (status = 404))
)]
pub(crate) async fn get_offer(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let marketplace = match build_marketplace(&state) {
        Ok(marketplace) => marketplace,
        Err(err) => return map_error(&err, None).into_response(),
    };
    let offer_id = match OfferId::new(id) {
        Ok(value) => value,
        Err(err) => {
            return map_error(
                &n1_core::MarketError::Offer(OfferError::InvalidInput {
                    message: err.to_string(),
                }),
                None,
            )
            .into_response();
        }
    };
    match marketplace.offers().get(&offer_id) {
        Ok(Some(offer)) => Json(offer).into_response(),
        Ok(None) => {
            map_error(&n1_core::MarketError::Offer(OfferError::NotFound), None).into_response()
        }
        Err(err) => map_error(&err, None).into_response(),
    }
}
