//! Axum route handlers for the hook daemon.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use rtwire::TransactionEvent;
use rtwire_http::TransactionEvents;
use serde::Serialize;
use tower_http::trace::TraceLayer;

/// Counters of what the daemon has received.
#[derive(Debug, Default)]
pub struct HookStats {
    pushes: AtomicU64,
    settled: AtomicU64,
    pending: AtomicU64,
}

/// Point-in-time copy of [`HookStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Accepted pushes.
    pub pushes: u64,
    /// Settled events across all pushes.
    pub settled: u64,
    /// Pending events across all pushes.
    pub pending: u64,
}

impl HookStats {
    fn record(&self, events: &[TransactionEvent]) {
        self.pushes.fetch_add(1, Ordering::Relaxed);
        for event in events {
            let counter = if event.is_pending() {
                &self.pending
            } else {
                &self.settled
            };
            counter.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Reads the current counters.
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            pushes: self.pushes.load(Ordering::Relaxed),
            settled: self.settled.load(Ordering::Relaxed),
            pending: self.pending.load(Ordering::Relaxed),
        }
    }
}

/// Shared application state for the daemon.
pub type HookdState = Arc<HookStats>;

/// `POST {path}` - receives one push.
///
/// Malformed pushes are rejected by the extractor before this runs.
pub async fn post_events(
    State(stats): State<HookdState>,
    TransactionEvents(events): TransactionEvents,
) -> StatusCode {
    stats.record(&events);
    for event in &events {
        let tx = &event.transaction;
        tracing::info!(
            id = %tx.id,
            kind = ?tx.kind,
            from = %tx.from_account_id,
            to = %tx.to_account_id,
            value = tx.value,
            pending = event.is_pending(),
            "transaction event"
        );
    }
    StatusCode::OK
}

/// `GET /health`
pub async fn health(State(stats): State<HookdState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "received": stats.snapshot(),
    }))
}

/// Creates the daemon [`axum::Router`].
///
/// Endpoints:
/// - `POST {path}` - webhook pushes
/// - `GET /health` - liveness and counters
pub fn hookd_router(state: HookdState, path: &str) -> axum::Router {
    axum::Router::new()
        .route(path, post(post_events))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use axum::http::header::CONTENT_TYPE;
    use tower::ServiceExt;

    const PUSH: &str = r#"{"type":"transactions","next":"","payload":[
        {"id":1,"type":"credit","toAccountID":3,"value":10,"created":"2017-05-01T10:00:00Z","status":"pending"},
        {"id":1,"type":"credit","toAccountID":3,"value":10,"created":"2017-05-01T10:05:00Z"}]}"#;

    fn push(content_type: &str, body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/hook")
            .header(CONTENT_TYPE, content_type)
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_push_is_counted() {
        let stats = HookdState::default();
        let app = hookd_router(Arc::clone(&stats), "/hook");

        let response = app
            .clone()
            .oneshot(push("application/json", PUSH))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            stats.snapshot(),
            StatsSnapshot {
                pushes: 1,
                settled: 1,
                pending: 1
            }
        );

        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let health: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(health["status"], "ok");
        assert_eq!(health["received"]["pushes"], 1);
    }

    #[tokio::test]
    async fn test_wrong_content_type_rejected() {
        let stats = HookdState::default();
        let response = hookd_router(Arc::clone(&stats), "/hook")
            .oneshot(push("text/plain", PUSH))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(stats.snapshot().pushes, 0);
    }

    #[tokio::test]
    async fn test_unknown_object_type_rejected() {
        let response = hookd_router(HookdState::default(), "/hook")
            .oneshot(push("application/json", r#"{"type":"fees","payload":[]}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let error: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(error["error"], "unknown object type fees");
    }
}
