//! pdlite-scheduler — pluggable scheduling strategies.
//!
//! Strategies implement [`Scheduler`]: given a cluster snapshot they propose
//! operators. They are created by type tag through a static [`registry`]
//! from either positional arguments or a persisted config blob, and driven
//! by the [`Coordinator`], which checks admission limits, runs each
//! strategy and hands the proposals to the operator controller.
//!
//! # Architecture
//!
//! ```text
//! Coordinator
//!   ├── Cluster (read-only region/store snapshot)
//!   ├── OperatorController (admission counts, in-flight operators)
//!   ├── StateStore (scheduler records + config blobs)
//!   └── schedulers: name → Arc<dyn Scheduler>
//!         └── AffinityScheduler
//!               ├── range: RwLock<Arc<KeyRange>> (copy-on-write)
//!               └── HTTP: GET /list, POST /config
//! ```

pub mod affinity;
pub mod coordinator;
pub mod error;
pub mod registry;
pub mod scheduler;

#[cfg(test)]
pub(crate) mod test_util;

pub use affinity::{AFFINITY_NAME, AFFINITY_TYPE, AffinityConfig, AffinityScheduler};
pub use coordinator::Coordinator;
pub use error::{SchedulerError, SchedulerResult};
pub use registry::{SchedulerConfig, SchedulerRegistration, create_scheduler};
pub use scheduler::{ConfigDecoder, Scheduler};
