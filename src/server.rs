use crate::core::aggregator::CharacterService;
use crate::domain::model::FetchOptions;
use crate::domain::ports::SnapshotSink;
use axum::{
    extract::{Query, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

pub const FAILED_PROVIDERS_HEADER: &str = "x-failed-providers";

pub struct AppState<S: SnapshotSink> {
    service: Arc<CharacterService<S>>,
    request_timeout: Duration,
}

impl<S: SnapshotSink> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            request_timeout: self.request_timeout,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CharactersQuery {
    #[serde(rename = "limitPerProvider")]
    limit_per_provider: Option<String>,
}

/// Create the router serving `/characters` and `/health`.
pub fn create_router<S: SnapshotSink + 'static>(
    service: Arc<CharacterService<S>>,
    request_timeout: Duration,
) -> Router {
    let state = AppState {
        service,
        request_timeout,
    };

    Router::new()
        .route("/characters", get(list_characters::<S>))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "ok"
}

/// Absent or empty means unbounded; anything but a positive integer is rejected.
pub fn parse_limit(raw: Option<&str>) -> Option<usize> {
    match raw {
        None | Some("") => Some(0),
        Some(value) => value.parse::<usize>().ok().filter(|limit| *limit > 0),
    }
}

async fn list_characters<S: SnapshotSink + 'static>(
    State(state): State<AppState<S>>,
    Query(query): Query<CharactersQuery>,
) -> Response {
    let Some(limit) = parse_limit(query.limit_per_provider.as_deref()) else {
        return (StatusCode::BAD_REQUEST, "invalid limit parameter").into_response();
    };

    // 用戶端中斷連線時 handler 會被 drop，連帶取消所有 provider
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    match state
        .service
        .fetch_all_within(&cancel, FetchOptions::new(limit), state.request_timeout)
        .await
    {
        Ok(report) => {
            let failed = report.failed_providers().join(",");
            let mut response = Json(report.characters).into_response();
            if !failed.is_empty() {
                if let Ok(value) = HeaderValue::from_str(&failed) {
                    response.headers_mut().insert(FAILED_PROVIDERS_HEADER, value);
                }
            }
            response
        }
        Err(e) => {
            tracing::error!("❌ Sync request failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("sync error: {}", e),
            )
                .into_response()
        }
    }
}
