//! pdlite-api — REST API for pdlite.
//!
//! Provides axum route handlers for managing schedulers, feeding the
//! cluster view and inspecting operators. Each scheduler's own routes are
//! mounted under `/pd/api/v1/scheduler-config/{name}/`.
//!
//! # API Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/pd/api/v1/schedulers` | List scheduler names |
//! | POST | `/pd/api/v1/schedulers` | Add a scheduler |
//! | DELETE | `/pd/api/v1/schedulers/{name}` | Remove a scheduler |
//! | ANY | `/pd/api/v1/scheduler-config/{name}/{*path}` | Scheduler-specific routes |
//! | GET | `/pd/api/v1/regions` | List regions |
//! | PUT | `/pd/api/v1/regions` | Region heartbeat |
//! | DELETE | `/pd/api/v1/regions/{region_id}` | Drop a region from the view |
//! | GET | `/pd/api/v1/stores` | List stores |
//! | PUT | `/pd/api/v1/stores` | Store heartbeat |
//! | GET | `/pd/api/v1/operators` | In-flight operators |
//! | GET | `/pd/api/v1/operators/{region_id}` | In-flight operator of a region |
//! | DELETE | `/pd/api/v1/operators/{region_id}` | Finish an operator |
//! | GET | `/pd/api/v1/config/schedule` | Scheduling limits |
//! | PUT | `/pd/api/v1/config/schedule` | Replace scheduling limits |
//! | GET | `/metrics` | Prometheus exposition |

pub mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::routing::{any, delete, get};

use pdlite_cluster::BasicCluster;
use pdlite_scheduler::Coordinator;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub cluster: Arc<BasicCluster>,
    pub coordinator: Arc<Coordinator>,
}

/// Build the complete API router (REST + metrics).
pub fn build_router(cluster: Arc<BasicCluster>, coordinator: Arc<Coordinator>) -> Router {
    let api_state = ApiState {
        cluster,
        coordinator,
    };

    let api_routes = Router::new()
        .route("/schedulers", get(handlers::list_schedulers).post(handlers::add_scheduler))
        .route("/schedulers/{name}", delete(handlers::remove_scheduler))
        .route("/scheduler-config/{name}/{*path}", any(handlers::scheduler_config))
        .route("/regions", get(handlers::list_regions).put(handlers::put_region))
        .route("/regions/{region_id}", delete(handlers::remove_region))
        .route("/stores", get(handlers::list_stores).put(handlers::put_store))
        .route("/operators", get(handlers::list_operators))
        .route(
            "/operators/{region_id}",
            get(handlers::get_operator).delete(handlers::finish_operator),
        )
        .route(
            "/config/schedule",
            get(handlers::get_schedule_config).put(handlers::put_schedule_config),
        )
        .with_state(api_state.clone());

    Router::new()
        .nest("/pd/api/v1", api_routes)
        .route("/metrics", get(handlers::prometheus_metrics).with_state(api_state))
}
