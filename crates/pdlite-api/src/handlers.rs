//! REST API handlers.
//!
//! Each handler reads/writes via the cluster view or the coordinator and
//! returns JSON responses. Scheduler-specific routes answer in their own
//! format and are forwarded untouched.

use axum::Json;
use axum::extract::{Path, Request, State};
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use tower::ServiceExt;
use tracing::{debug, info};

use pdlite_cluster::{Cluster, ClusterOptions};
use pdlite_core::{Region, RegionId, Store};
use pdlite_scheduler::SchedulerError;

use crate::ApiState;

/// Response wrapper for consistent API format.
#[derive(serde::Serialize)]
struct ApiResponse<T: serde::Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T: serde::Serialize> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            error: None,
        })
    }
}

fn error_response(msg: &str, status: StatusCode) -> impl IntoResponse {
    (
        status,
        Json(ApiResponse::<()> {
            success: false,
            data: None,
            error: Some(msg.to_string()),
        }),
    )
}

fn scheduler_error_response(e: &SchedulerError) -> Response {
    let status = match e {
        SchedulerError::Config(_)
        | SchedulerError::Key(_)
        | SchedulerError::Decode(_)
        | SchedulerError::UnknownType(_) => StatusCode::BAD_REQUEST,
        SchedulerError::AlreadyExists(_) => StatusCode::CONFLICT,
        SchedulerError::NotFound(_) => StatusCode::NOT_FOUND,
        SchedulerError::Encode(_) | SchedulerError::State(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(&e.to_string(), status).into_response()
}

// ── Schedulers ─────────────────────────────────────────────────

/// Add-scheduler request body. `name` is the scheduler type.
#[derive(serde::Deserialize)]
pub struct AddSchedulerRequest {
    pub name: String,
    #[serde(default)]
    pub args: Vec<String>,
}

/// GET /pd/api/v1/schedulers
pub async fn list_schedulers(State(state): State<ApiState>) -> impl IntoResponse {
    ApiResponse::ok(state.coordinator.scheduler_names())
}

/// POST /pd/api/v1/schedulers
pub async fn add_scheduler(
    State(state): State<ApiState>,
    Json(req): Json<AddSchedulerRequest>,
) -> impl IntoResponse {
    match state.coordinator.add_scheduler(&req.name, req.args) {
        Ok(name) => (StatusCode::CREATED, ApiResponse::ok(name)).into_response(),
        Err(e) => scheduler_error_response(&e),
    }
}

/// DELETE /pd/api/v1/schedulers/{name}
pub async fn remove_scheduler(
    State(state): State<ApiState>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    match state.coordinator.remove_scheduler(&name) {
        Ok(()) => ApiResponse::ok("removed").into_response(),
        Err(e) => scheduler_error_response(&e),
    }
}

/// ANY /pd/api/v1/scheduler-config/{name}/{*path}
///
/// Forwards the request to the scheduler's own router with the URI
/// rewritten to `/{path}`.
pub async fn scheduler_config(
    State(state): State<ApiState>,
    Path((name, path)): Path<(String, String)>,
    req: Request,
) -> Response {
    let Some(scheduler) = state.coordinator.get_scheduler(&name) else {
        return error_response("scheduler not found", StatusCode::NOT_FOUND).into_response();
    };
    let Some(router) = scheduler.http_router() else {
        return error_response("scheduler has no config routes", StatusCode::NOT_FOUND)
            .into_response();
    };

    let (mut parts, body) = req.into_parts();
    let query = parts
        .uri
        .query()
        .map(|q| format!("?{q}"))
        .unwrap_or_default();
    let target = format!("/{}{query}", path.trim_start_matches('/'));
    parts.uri = match target.parse::<Uri>() {
        Ok(uri) => uri,
        Err(e) => return error_response(&e.to_string(), StatusCode::BAD_REQUEST).into_response(),
    };
    debug!(scheduler = %name, uri = %parts.uri, method = %parts.method, "forwarding scheduler config request");

    match router.oneshot(Request::from_parts(parts, body)).await {
        Ok(resp) => resp,
        Err(never) => match never {},
    }
}

// ── Cluster view ───────────────────────────────────────────────

/// GET /pd/api/v1/regions
pub async fn list_regions(State(state): State<ApiState>) -> impl IntoResponse {
    ApiResponse::ok(state.cluster.regions())
}

/// PUT /pd/api/v1/regions
pub async fn put_region(
    State(state): State<ApiState>,
    Json(region): Json<Region>,
) -> impl IntoResponse {
    let region_id = region.id;
    let evicted = state.cluster.put_region(region);
    ApiResponse::ok(serde_json::json!({
        "region_id": region_id,
        "evicted": evicted,
    }))
}

/// DELETE /pd/api/v1/regions/{region_id}
pub async fn remove_region(
    State(state): State<ApiState>,
    Path(region_id): Path<RegionId>,
) -> impl IntoResponse {
    match state.cluster.remove_region(region_id) {
        Some(region) => ApiResponse::ok(region).into_response(),
        None => error_response("region not found", StatusCode::NOT_FOUND).into_response(),
    }
}

/// GET /pd/api/v1/stores
pub async fn list_stores(State(state): State<ApiState>) -> impl IntoResponse {
    ApiResponse::ok(state.cluster.stores())
}

/// PUT /pd/api/v1/stores
pub async fn put_store(
    State(state): State<ApiState>,
    Json(store): Json<Store>,
) -> impl IntoResponse {
    let store_id = store.id;
    state.cluster.put_store(store);
    ApiResponse::ok(serde_json::json!({ "store_id": store_id }))
}

// ── Operators ──────────────────────────────────────────────────

/// GET /pd/api/v1/operators
pub async fn list_operators(State(state): State<ApiState>) -> impl IntoResponse {
    ApiResponse::ok(state.coordinator.op_controller().operators())
}

/// GET /pd/api/v1/operators/{region_id}
pub async fn get_operator(
    State(state): State<ApiState>,
    Path(region_id): Path<RegionId>,
) -> impl IntoResponse {
    match state.coordinator.op_controller().get_operator(region_id) {
        Some(op) => ApiResponse::ok(op).into_response(),
        None => error_response("operator not found", StatusCode::NOT_FOUND).into_response(),
    }
}

/// DELETE /pd/api/v1/operators/{region_id}
pub async fn finish_operator(
    State(state): State<ApiState>,
    Path(region_id): Path<RegionId>,
) -> impl IntoResponse {
    match state.coordinator.op_controller().remove_operator(region_id) {
        Some(op) => ApiResponse::ok(op).into_response(),
        None => error_response("operator not found", StatusCode::NOT_FOUND).into_response(),
    }
}

// ── Schedule config ────────────────────────────────────────────

/// GET /pd/api/v1/config/schedule
pub async fn get_schedule_config(State(state): State<ApiState>) -> impl IntoResponse {
    ApiResponse::ok(state.cluster.opts())
}

/// PUT /pd/api/v1/config/schedule
///
/// Takes effect at the next admission check.
pub async fn put_schedule_config(
    State(state): State<ApiState>,
    Json(opts): Json<ClusterOptions>,
) -> impl IntoResponse {
    state.cluster.set_opts(opts);
    info!(
        leader_schedule_limit = opts.leader_schedule_limit,
        region_schedule_limit = opts.region_schedule_limit,
        "schedule limits updated"
    );
    ApiResponse::ok(opts)
}

// ── Prometheus ─────────────────────────────────────────────────

/// GET /metrics
pub async fn prometheus_metrics(State(state): State<ApiState>) -> impl IntoResponse {
    let body = pdlite_metrics::render_prometheus(state.coordinator.op_controller().metrics());
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
}
