pub mod middleware;
pub mod openapi;
pub mod purge;
pub mod routes;
pub mod sse;

use axum::Router;
use axum::http::Request;
use middleware::correlation::CorrelationId;
use n1_core::{MarketError, Marketplace};
use n1_db::schema;
use n1_db::store::DbStore;
use n1_events::bus::EventBus;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{Mutex, Notify};

#[derive(Clone, Default)]
pub struct IdempotencyLocks {
    inner: Arc<Mutex<HashMap<String, Arc<Notify>>>>,
}

impl IdempotencyLocks {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_path: String,
    pub event_bus: EventBus,
    pub idempotency: IdempotencyLocks,
}

pub fn build_marketplace(state: &AppState) -> Result<Marketplace<DbStore>, MarketError> {
    let conn = schema::open_and_migrate(&state.db_path).map_err(|err| MarketError::Internal {
        message: err.to_string(),
    })?;
    let store = DbStore::new(conn);
    Ok(Marketplace::new(store, state.event_bus.clone()))
}

pub fn correlation_id_from_request<B>(request: &Request<B>) -> Option<String> {
    request
        .extensions()
        .get::<CorrelationId>()
        .map(|value| value.0.clone())
}

pub fn app(state: AppState) -> Router {
    routes::router(state)
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> Result<(), std::io::Error> {
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await
}
