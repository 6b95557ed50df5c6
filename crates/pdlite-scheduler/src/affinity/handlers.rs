//! HTTP control surface of the affinity scheduler.
//!
//! - `GET  /list`: current config as indented JSON
//! - `POST /config`: `{"range": "<json-encoded KeyRange>"}`

use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use serde_json::Value;
use tracing::warn;

use pdlite_core::KeyRange;

use super::AffinityScheduler;

pub(super) fn router(scheduler: Arc<AffinityScheduler>) -> Router {
    Router::new()
        .route("/list", get(list_config))
        .route("/config", post(update_config))
        .with_state(scheduler)
}

async fn list_config(State(scheduler): State<Arc<AffinityScheduler>>) -> Response {
    match serde_json::to_string_pretty(&scheduler.config()) {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json; charset=UTF-8")],
            body,
        )
            .into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, Json(e.to_string())).into_response(),
    }
}

async fn update_config(State(scheduler): State<Arc<AffinityScheduler>>, body: Bytes) -> Response {
    let fields: serde_json::Map<String, Value> = match serde_json::from_slice(&body) {
        Ok(fields) => fields,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };
    let Some(value) = fields.get("range") else {
        return (StatusCode::BAD_REQUEST, "config item not found").into_response();
    };
    let Some(encoded) = value.as_str() else {
        return (StatusCode::BAD_REQUEST, "range must be a JSON-encoded string").into_response();
    };
    let range: KeyRange = match serde_json::from_str(encoded) {
        Ok(range) => range,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };

    match scheduler.update_range(range) {
        Ok(()) => (StatusCode::OK, "success").into_response(),
        Err(e) => {
            warn!(error = %e, "failed to persist affinity config");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(e.to_string())).into_response()
        }
    }
}
