use std::sync::Arc;
use tokio::time::Duration;
use crate::api::state::{AppState, TokenView};

// Lands just after expiry so the next lookup actually refreshes. Also the
// shortest pause between two refresh attempts.
const EXPIRY_MARGIN_MS: i64 = 250;

/// How long to sleep before the next refresh attempt. `expires_at_ms` is
/// `None` when the last attempt failed.
fn next_wait_ms(expires_at_ms: Option<i64>, now_ms: i64, ttl_ms: i64) -> i64 {
    match expires_at_ms {
        Some(expires_at) => (expires_at - now_ms).max(0) + EXPIRY_MARGIN_MS,
        None => ttl_ms.max(EXPIRY_MARGIN_MS),
    }
}

/// Keeps one view's cache warm so page loads rarely pay for a pipeline run.
async fn warm_view(view: Arc<TokenView>) {
    loop {
        let expires_at = match view.current().await {
            Ok(entry) => {
                tracing::info!("Warmed {} view: {} tokens", view.kind.as_str(), entry.value.len());
                Some(entry.fetched_at_ms + view.ttl_ms())
            }
            Err(e) => {
                tracing::error!("Failed to warm {} view: {:?}", view.kind.as_str(), e);
                None
            }
        };
        let wait_ms = next_wait_ms(expires_at, view.now_ms(), view.ttl_ms());
        tokio::time::sleep(Duration::from_millis(wait_ms as u64)).await;
    }
}

pub async fn start_warming(state: AppState) {
    tracing::info!("Starting cache warming...");
    let tasks: Vec<_> = state
        .views()
        .into_iter()
        .map(|view| tokio::spawn(warm_view(view.clone())))
        .collect();

    futures::future::join_all(tasks).await;
}
