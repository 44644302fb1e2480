pub mod drops;
pub mod error;
pub mod events;
pub mod offers;
pub mod requests;
pub mod threads;
pub mod users;

use crate::middleware::correlation::correlation_middleware;
use crate::middleware::idempotency::IdempotencyLayer;
use crate::{AppState, openapi};
use axum::Router;
use axum::http::Method;
use axum::middleware;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers(Any)
        .allow_origin(Any);

    let api = Router::new()
        .merge(requests::router(state.clone()))
        .merge(offers::router(state.clone()))
        .merge(users::router(state.clone()))
        .merge(threads::router(state.clone()))
        .merge(drops::router(state.clone()))
        .merge(events::router(state.clone()))
        .merge(openapi::router())
        .layer(IdempotencyLayer::new(state.clone()))
        .route_layer(middleware::from_fn(correlation_middleware));

    Router::new()
        .nest("/api", api)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
