//! Scheduler registry: type tag → decoder and constructor.
//!
//! The set of scheduler types is fixed at compile time. Each entry pairs a
//! decoder (building a typed config from registration arguments or a
//! persisted blob) with a constructor.

use std::sync::Arc;

use tracing::debug;

use pdlite_operator::OperatorController;
use pdlite_state::ConfigStorage;

use crate::affinity::{self, AffinityConfig};
use crate::error::{SchedulerError, SchedulerResult};
use crate::scheduler::{ConfigDecoder, Scheduler};

/// Typed configuration of any registered scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerConfig {
    Affinity(AffinityConfig),
}

type DecodeFn = fn(&ConfigDecoder) -> SchedulerResult<SchedulerConfig>;
type BuildFn = fn(
    SchedulerConfig,
    Arc<OperatorController>,
    Arc<dyn ConfigStorage>,
) -> SchedulerResult<Arc<dyn Scheduler>>;

/// One registered scheduler type.
pub struct SchedulerRegistration {
    pub scheduler_type: &'static str,
    pub decode: DecodeFn,
    pub build: BuildFn,
}

static REGISTRY: &[SchedulerRegistration] = &[SchedulerRegistration {
    scheduler_type: affinity::AFFINITY_TYPE,
    decode: affinity::decode_config,
    build: affinity::build_scheduler,
}];

/// Look up a registered scheduler type.
pub fn lookup(scheduler_type: &str) -> Option<&'static SchedulerRegistration> {
    REGISTRY.iter().find(|r| r.scheduler_type == scheduler_type)
}

/// Create a scheduler of `scheduler_type` from `decoder`.
pub fn create_scheduler(
    scheduler_type: &str,
    op_controller: Arc<OperatorController>,
    storage: Arc<dyn ConfigStorage>,
    decoder: &ConfigDecoder,
) -> SchedulerResult<Arc<dyn Scheduler>> {
    let registration =
        lookup(scheduler_type).ok_or_else(|| SchedulerError::UnknownType(scheduler_type.to_string()))?;
    let config = (registration.decode)(decoder)?;
    debug!(scheduler_type, ?config, "scheduler config decoded");
    (registration.build)(config, op_controller, storage)
}
