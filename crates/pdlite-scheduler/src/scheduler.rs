//! The strategy contract shared by every scheduler.

use std::sync::Arc;

use axum::Router;

use pdlite_cluster::Cluster;
use pdlite_operator::Operator;

use crate::error::SchedulerResult;

/// Source of a scheduler's configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigDecoder {
    /// Positional arguments from a fresh registration.
    Args(Vec<String>),
    /// A blob previously produced by [`Scheduler::encode_config`].
    Json(Vec<u8>),
}

/// A scheduling strategy.
///
/// The driver calls [`is_schedule_allowed`](Scheduler::is_schedule_allowed)
/// and, only when it returns true, [`schedule`](Scheduler::schedule). Both
/// may run concurrently with configuration changes arriving over HTTP.
pub trait Scheduler: Send + Sync {
    /// Stable instance name, used for metrics labels and persistence keys.
    fn name(&self) -> &str;

    /// Registry type tag.
    fn scheduler_type(&self) -> &'static str;

    /// Serialize the current configuration.
    fn encode_config(&self) -> SchedulerResult<Vec<u8>>;

    /// Whether admission limits leave room for this scheduler's operators.
    fn is_schedule_allowed(&self, cluster: &dyn Cluster) -> bool;

    /// Propose operators for the current snapshot. May be empty.
    fn schedule(&self, cluster: &dyn Cluster) -> Vec<Operator>;

    /// Routes served under the scheduler's config namespace, if any.
    fn http_router(self: Arc<Self>) -> Option<Router> {
        None
    }
}
