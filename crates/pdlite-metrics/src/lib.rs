//! pdlite-metrics — scheduling counters for pdlite.
//!
//! Counters are plain atomics grouped into labeled vectors. Recording never
//! blocks on anything slower than a short read lock, and never fails.
//!
//! # Architecture
//!
//! ```text
//! Metrics (cheap Clone, shared)
//!   ├── scheduler_events   {type=<scheduler name>, name=<event>}
//!   ├── operator_limit     {type=<scheduler type>, name=<operator kind>}
//!   └── operators          {type=<operator kind>, event=<create|finish>}
//!
//! Prometheus exposition
//!   └── render_prometheus() → text/plain for /metrics endpoint
//! ```

pub mod counter;
pub mod prometheus;

use std::sync::Arc;

pub use counter::{Counter, CounterVec};
pub use prometheus::render_prometheus;

/// Scheduler event emitted on every `schedule` call.
pub const EVENT_SCHEDULE: &str = "schedule";
/// Scheduler event emitted when no eligible region was found.
pub const EVENT_NO_REGION: &str = "no-region";
/// Scheduler event emitted per operator admitted.
pub const EVENT_NEW_OPERATOR: &str = "new-operator";

/// The registry of every counter pdlite exports.
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    scheduler_events: CounterVec,
    operator_limit: CounterVec,
    operators: CounterVec,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner {
                scheduler_events: CounterVec::new(
                    "pd_scheduler_event_count",
                    "Counter of scheduler events.",
                    &["type", "name"],
                ),
                operator_limit: CounterVec::new(
                    "pd_schedule_operator_limit",
                    "Counter of operator meeting limit.",
                    &["type", "name"],
                ),
                operators: CounterVec::new(
                    "pd_schedule_operators_count",
                    "Counter of schedule operators.",
                    &["type", "event"],
                ),
            }),
        }
    }

    /// Counter for `event` of the scheduler named `scheduler`.
    pub fn scheduler_event(&self, scheduler: &str, event: &str) -> Counter {
        self.inner.scheduler_events.with_label_values(&[scheduler, event])
    }

    /// Counter bumped when a scheduler of `scheduler_type` hits the limit for `kind`.
    pub fn operator_limit(&self, scheduler_type: &str, kind: &str) -> Counter {
        self.inner.operator_limit.with_label_values(&[scheduler_type, kind])
    }

    /// Counter for operator lifecycle `event` of operators of `kind`.
    pub fn operator_event(&self, kind: &str, event: &str) -> Counter {
        self.inner.operators.with_label_values(&[kind, event])
    }

    pub(crate) fn vectors(&self) -> [&CounterVec; 3] {
        [
            &self.inner.scheduler_events,
            &self.inner.operator_limit,
            &self.inner.operators,
        ]
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}
