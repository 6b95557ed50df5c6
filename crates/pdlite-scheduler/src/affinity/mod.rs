//! Affinity scheduler. Gathers the region leaders of a key range onto one store.
//!
//! Each round counts healthy leaders per store among the regions lying
//! wholly inside the configured range, picks the store holding the most,
//! and proposes a leader transfer to it for every other involved region.
//! Either every transfer is proposed or none is.

mod handlers;

use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use pdlite_cluster::Cluster;
use pdlite_core::{KeyRange, Region, StoreId, get_key_ranges};
use pdlite_metrics::{EVENT_NEW_OPERATOR, EVENT_NO_REGION, EVENT_SCHEDULE};
use pdlite_operator::{Operator, OperatorController, OperatorKind, create_transfer_leader_operator};
use pdlite_state::ConfigStorage;

use crate::error::{SchedulerError, SchedulerResult};
use crate::registry::SchedulerConfig;
use crate::scheduler::{ConfigDecoder, Scheduler};

pub const AFFINITY_NAME: &str = "affinity-scheduler";
pub const AFFINITY_TYPE: &str = "affinity";

/// Persisted configuration. The name is assigned at construction and is
/// not part of the encoded form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffinityConfig {
    #[serde(skip)]
    name: String,
    pub range: KeyRange,
}

impl AffinityConfig {
    pub fn new(range: KeyRange) -> Self {
        Self {
            name: AFFINITY_NAME.to_string(),
            range,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Decode an affinity config from registration args or a stored blob.
///
/// Args are `start end [start end ...]`; only the first range is kept.
pub fn decode_config(decoder: &ConfigDecoder) -> SchedulerResult<SchedulerConfig> {
    let range = match decoder {
        ConfigDecoder::Args(args) => {
            if args.is_empty() {
                return Err(SchedulerError::Config("affinity args".to_string()));
            }
            let mut ranges = get_key_ranges(args)?;
            if ranges.len() > 1 {
                debug!(dropped = ranges.len() - 1, "affinity keeps only the first key range");
            }
            ranges.swap_remove(0)
        }
        ConfigDecoder::Json(data) => {
            let conf: AffinityConfig =
                serde_json::from_slice(data).map_err(|e| SchedulerError::Decode(e.to_string()))?;
            conf.range
        }
    };
    Ok(SchedulerConfig::Affinity(AffinityConfig::new(range)))
}

pub fn build_scheduler(
    config: SchedulerConfig,
    op_controller: Arc<OperatorController>,
    storage: Arc<dyn ConfigStorage>,
) -> SchedulerResult<Arc<dyn Scheduler>> {
    let SchedulerConfig::Affinity(config) = config;
    Ok(Arc::new(AffinityScheduler::new(config, op_controller, storage)))
}

pub struct AffinityScheduler {
    name: String,
    /// Replaced wholesale on update; readers clone the `Arc` and never see
    /// a half-written range.
    range: RwLock<Arc<KeyRange>>,
    /// Held across persist + swap so concurrent updates land in the same
    /// order on disk and in memory.
    update_lock: Mutex<()>,
    op_controller: Arc<OperatorController>,
    storage: Arc<dyn ConfigStorage>,
}

impl AffinityScheduler {
    pub fn new(
        config: AffinityConfig,
        op_controller: Arc<OperatorController>,
        storage: Arc<dyn ConfigStorage>,
    ) -> Self {
        let name = if config.name.is_empty() {
            AFFINITY_NAME.to_string()
        } else {
            config.name
        };
        Self {
            name,
            range: RwLock::new(Arc::new(config.range)),
            update_lock: Mutex::new(()),
            op_controller,
            storage,
        }
    }

    /// Snapshot of the configured range.
    pub fn range(&self) -> Arc<KeyRange> {
        self.range.read().clone()
    }

    /// Snapshot of the full configuration.
    pub fn config(&self) -> AffinityConfig {
        AffinityConfig {
            name: self.name.clone(),
            range: self.range().as_ref().clone(),
        }
    }

    /// Persist `range` and then make it current.
    ///
    /// If persisting fails the in-memory range is left untouched.
    pub fn update_range(&self, range: KeyRange) -> SchedulerResult<()> {
        let _guard = self.update_lock.lock();
        let staged = AffinityConfig {
            name: self.name.clone(),
            range,
        };
        self.save_config(&staged)?;
        info!(
            scheduler = %self.name,
            start = %hex::encode(&staged.range.start_key),
            end = %hex::encode(&staged.range.end_key),
            "affinity range updated"
        );
        *self.range.write() = Arc::new(staged.range);
        Ok(())
    }

    fn save_config(&self, config: &AffinityConfig) -> SchedulerResult<()> {
        let data = serde_json::to_vec(config).map_err(|e| SchedulerError::Encode(e.to_string()))?;
        self.storage.save_schedule_config(&self.name, &data)?;
        Ok(())
    }

    /// Regions scanned from `range` that lie wholly inside it.
    fn involved_regions(&self, range: &KeyRange, regions: Vec<Region>) -> Vec<Region> {
        regions
            .into_iter()
            .filter(|region| {
                let involved = range.involves(&region.start_key, &region.end_key);
                if !involved {
                    debug!(
                        scheduler = %self.name,
                        region_id = region.id,
                        region_start = %hex::encode(&region.start_key),
                        region_end = %hex::encode(&region.end_key),
                        range_start = %hex::encode(&range.start_key),
                        range_end = %hex::encode(&range.end_key),
                        "region not involved in affinity range"
                    );
                }
                involved
            })
            .collect()
    }
}

/// The store with the most leaders; ties go to the lowest store ID.
///
/// # Panics
///
/// Panics if `leader_counts` is empty.
pub(crate) fn target_store(leader_counts: &HashMap<StoreId, u64>) -> StoreId {
    match leader_counts
        .iter()
        .max_by_key(|&(&store_id, &count)| (count, Reverse(store_id)))
    {
        Some((&store_id, _)) => store_id,
        None => panic!("affinity target store requested with no leaders counted"),
    }
}

impl Scheduler for AffinityScheduler {
    fn name(&self) -> &str {
        &self.name
    }

    fn scheduler_type(&self) -> &'static str {
        AFFINITY_TYPE
    }

    fn encode_config(&self) -> SchedulerResult<Vec<u8>> {
        serde_json::to_vec(&self.config()).map_err(|e| SchedulerError::Encode(e.to_string()))
    }

    fn is_schedule_allowed(&self, cluster: &dyn Cluster) -> bool {
        let allowed = self.op_controller.operator_count(OperatorKind::Leader)
            < cluster.opts().leader_schedule_limit();
        if !allowed {
            self.op_controller
                .metrics()
                .operator_limit(AFFINITY_TYPE, OperatorKind::Leader.as_str())
                .inc();
        }
        allowed
    }

    fn schedule(&self, cluster: &dyn Cluster) -> Vec<Operator> {
        let metrics = self.op_controller.metrics();
        metrics.scheduler_event(&self.name, EVENT_SCHEDULE).inc();

        let range = self.range();
        let regions = cluster.scan_regions(&range.start_key, &range.end_key, 0);
        let regions = self.involved_regions(&range, regions);

        let mut leader_counts: HashMap<StoreId, u64> = HashMap::new();
        for region in &regions {
            if let Some(leader) = region.healthy_leader() {
                *leader_counts.entry(leader.store_id).or_default() += 1;
            }
        }
        if leader_counts.is_empty() {
            debug!(scheduler = %self.name, scanned = regions.len(), "no region with a healthy leader in range");
            metrics.scheduler_event(&self.name, EVENT_NO_REGION).inc();
            return Vec::new();
        }

        let target = target_store(&leader_counts);
        let mut ops = Vec::new();
        for region in &regions {
            // Leaders on down peers were not counted but are still moved.
            let Some(leader) = region.leader() else {
                continue;
            };
            if leader.store_id == target {
                continue;
            }
            let brief = format!("from affinity controller, r {} ", region.id);
            match create_transfer_leader_operator(
                &brief,
                cluster,
                region,
                leader.store_id,
                target,
                OperatorKind::Leader,
            ) {
                Ok(op) => ops.push(op),
                Err(e) => {
                    warn!(
                        scheduler = %self.name,
                        region_id = region.id,
                        source_store = leader.store_id,
                        target_store = target,
                        error = %e,
                        "fail to create transfer leader operator, abandoning round"
                    );
                    return Vec::new();
                }
            }
        }

        metrics
            .scheduler_event(&self.name, EVENT_NEW_OPERATOR)
            .inc_by(ops.len() as u64);
        debug!(scheduler = %self.name, target_store = target, operators = ops.len(), "affinity round finished");
        ops
    }

    fn http_router(self: Arc<Self>) -> Option<axum::Router> {
        Some(handlers::router(self))
    }
}
