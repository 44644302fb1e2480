use crate::{AppState, build_marketplace};
use chrono::Utc;
use n1_core::RequestContext;
use n1_events::types::EventSource;
use std::time::Duration;

const PURGE_INTERVAL_SECS: u64 = 60;

/// Deletes expired message threads on a fixed interval.
pub async fn run(state: AppState) {
    let mut interval = tokio::time::interval(Duration::from_secs(PURGE_INTERVAL_SECS));
    loop {
        interval.tick().await;
        let marketplace = match build_marketplace(&state) {
            Ok(marketplace) => marketplace,
            Err(_) => continue,
        };
        let ctx = RequestContext::new(EventSource::Api, None);
        match marketplace.threads().purge_expired(&ctx, Utc::now()) {
            Ok(purged) if purged > 0 => tracing::info!(purged, "removed expired threads"),
            Ok(_) => {}
            Err(err) => tracing::warn!(error = %err, "thread purge failed"),
        }
    }
}
