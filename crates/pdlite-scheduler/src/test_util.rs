//! Fixtures shared by scheduler tests.

use std::sync::Arc;

use pdlite_cluster::{BasicCluster, ClusterOptions};
use pdlite_core::{KeyRange, Peer, Region, RegionId, Store, StoreId};
use pdlite_metrics::Metrics;
use pdlite_operator::OperatorController;
use pdlite_state::{ConfigStorage, StateError, StateResult, StateStore};

use crate::affinity::{AffinityConfig, AffinityScheduler};

/// A cluster with stores 1..=4 up and the given leader limit.
pub fn cluster(leader_schedule_limit: u64) -> BasicCluster {
    let cluster = BasicCluster::new(ClusterOptions {
        leader_schedule_limit,
        region_schedule_limit: 2048,
    });
    for id in 1..=4 {
        cluster.put_store(Store::new(id, format!("10.0.0.{id}:20160")));
    }
    cluster
}

/// A region `[start, end)` with a voter on every store in `stores` and the
/// leader on `leader`. Peer IDs are `id * 10 + store`.
pub fn region(id: RegionId, start: &str, end: &str, leader: StoreId, stores: &[StoreId]) -> Region {
    let mut region = Region::new(id, start.as_bytes().to_vec(), end.as_bytes().to_vec());
    for &store_id in stores {
        region = region.with_peer(Peer::new(peer_id(id, store_id), store_id), store_id == leader);
    }
    region
}

pub fn peer_id(region_id: RegionId, store_id: StoreId) -> u64 {
    region_id * 10 + store_id
}

pub fn range(start: &str, end: &str) -> KeyRange {
    KeyRange::new(start.as_bytes().to_vec(), end.as_bytes().to_vec())
}

pub fn op_controller() -> Arc<OperatorController> {
    Arc::new(OperatorController::new(Metrics::new()))
}

pub fn scheduler_with_storage(
    range: KeyRange,
    storage: Arc<dyn ConfigStorage>,
) -> (Arc<AffinityScheduler>, Arc<OperatorController>) {
    let op_controller = op_controller();
    let scheduler = Arc::new(AffinityScheduler::new(
        AffinityConfig::new(range),
        op_controller.clone(),
        storage,
    ));
    (scheduler, op_controller)
}

/// An affinity scheduler over `range` backed by an in-memory store.
pub fn scheduler(range: KeyRange) -> (Arc<AffinityScheduler>, Arc<OperatorController>, StateStore) {
    let store = StateStore::open_in_memory().unwrap();
    let (scheduler, op_controller) = scheduler_with_storage(range, Arc::new(store.clone()));
    (scheduler, op_controller, store)
}

/// Storage whose writes always fail.
pub struct FailingStorage;

impl ConfigStorage for FailingStorage {
    fn save_schedule_config(&self, _name: &str, _data: &[u8]) -> StateResult<()> {
        Err(StateError::Write("disk full".to_string()))
    }

    fn load_schedule_config(&self, _name: &str) -> StateResult<Option<Vec<u8>>> {
        Ok(None)
    }
}
