//! HTTP routes of the feed proxy.
//!
//! - `GET /ics` and `GET /.netlify/functions/ics`: the upstream feed, verbatim
//! - `GET /events`: the parsed events as JSON
//! - `GET /health`: liveness probe

use axum::extract::State;
use axum::http::{HeaderValue, Method, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use postercal_core::Event;
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tracing::instrument;

use crate::error::ProxyError;
use crate::state::AppState;

/// Content type of the relayed feed.
pub const CALENDAR_CONTENT_TYPE: &str = "text/calendar; charset=utf-8";

/// Path of the feed endpoint.
pub const ICS_PATH: &str = "/ics";

/// Legacy path kept for deployed pages that still point at it.
pub const LEGACY_ICS_PATH: &str = "/.netlify/functions/ics";

/// Body of `GET /events`.
#[derive(Debug, Serialize)]
pub struct EventsResponse {
    pub events: Vec<Event>,
    /// Field-level parse warnings, human-readable.
    pub warnings: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

/// Builds the proxy router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route(ICS_PATH, get(ics))
        .route(LEGACY_ICS_PATH, get(ics))
        .route("/events", get(events))
        .route("/health", get(health))
        .with_state(state)
        .layer(cors)
}

#[instrument(skip_all)]
async fn ics(State(state): State<AppState>) -> Result<Response, ProxyError> {
    let text = state.feed_text().await?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(CALENDAR_CONTENT_TYPE)),
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*")),
            (header::CACHE_CONTROL, cache_control(&state)),
        ],
        text.to_string(),
    )
        .into_response())
}

#[instrument(skip_all)]
async fn events(State(state): State<AppState>) -> Result<Response, ProxyError> {
    let text = state.feed_text().await?;
    let parsed = state.parser().parse_with_warnings(&text);

    let body = EventsResponse {
        events: parsed.events,
        warnings: parsed.warnings.iter().map(ToString::to_string).collect(),
        generated_at: Utc::now(),
    };

    Ok((
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*")),
            (header::CACHE_CONTROL, cache_control(&state)),
        ],
        Json(body),
    )
        .into_response())
}

async fn health() -> &'static str {
    "ok"
}

fn cache_control(state: &AppState) -> HeaderValue {
    HeaderValue::from_str(state.cache_control())
        .unwrap_or_else(|_| HeaderValue::from_static("no-cache"))
}
