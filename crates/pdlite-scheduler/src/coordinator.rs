//! Owns the active schedulers and drives scheduling rounds.
//!
//! Every registered scheduler is recorded in the state store together with
//! its encoded config, so a restart rebuilds the same set from storage.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use pdlite_cluster::Cluster;
use pdlite_operator::OperatorController;
use pdlite_state::{ConfigStorage, SchedulerRecord, StateStore};

use crate::error::{SchedulerError, SchedulerResult};
use crate::registry::create_scheduler;
use crate::scheduler::{ConfigDecoder, Scheduler};

pub struct Coordinator {
    cluster: Arc<dyn Cluster>,
    op_controller: Arc<OperatorController>,
    store: StateStore,
    storage: Arc<dyn ConfigStorage>,
    /// name → scheduler.
    schedulers: RwLock<BTreeMap<String, Arc<dyn Scheduler>>>,
}

impl Coordinator {
    pub fn new(cluster: Arc<dyn Cluster>, op_controller: Arc<OperatorController>, store: StateStore) -> Self {
        let storage = Arc::new(store.clone());
        Self::with_config_storage(cluster, op_controller, store, storage)
    }

    /// Like [`Coordinator::new`], with scheduler configs kept in `storage`
    /// instead of `store`.
    pub fn with_config_storage(
        cluster: Arc<dyn Cluster>,
        op_controller: Arc<OperatorController>,
        store: StateStore,
        storage: Arc<dyn ConfigStorage>,
    ) -> Self {
        Self {
            cluster,
            op_controller,
            store,
            storage,
            schedulers: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn op_controller(&self) -> &Arc<OperatorController> {
        &self.op_controller
    }

    /// Create, persist and activate a scheduler. Returns its name.
    pub fn add_scheduler(&self, scheduler_type: &str, args: Vec<String>) -> SchedulerResult<String> {
        let scheduler = create_scheduler(
            scheduler_type,
            self.op_controller.clone(),
            self.storage.clone(),
            &ConfigDecoder::Args(args.clone()),
        )?;
        let name = scheduler.name().to_string();

        let mut schedulers = self.schedulers.write();
        if schedulers.contains_key(&name) {
            return Err(SchedulerError::AlreadyExists(name));
        }
        let config = scheduler.encode_config()?;
        // Restore walks records. A record without a blob falls back to its args.
        self.store.put_scheduler(&SchedulerRecord {
            name: name.clone(),
            scheduler_type: scheduler_type.to_string(),
            args,
        })?;
        if let Err(e) = self.storage.save_schedule_config(&name, &config) {
            if let Err(rollback) = self.store.delete_scheduler(&name) {
                warn!(%name, error = %rollback, "failed to roll back scheduler record");
            }
            return Err(e.into());
        }
        schedulers.insert(name.clone(), scheduler);

        info!(%name, scheduler_type, "scheduler added");
        Ok(name)
    }

    /// Deactivate a scheduler and drop its persisted state.
    pub fn remove_scheduler(&self, name: &str) -> SchedulerResult<()> {
        let mut schedulers = self.schedulers.write();
        if !schedulers.contains_key(name) {
            return Err(SchedulerError::NotFound(name.to_string()));
        }
        self.store.remove_schedule_config(name)?;
        self.store.delete_scheduler(name)?;
        schedulers.remove(name);
        info!(%name, "scheduler removed");
        Ok(())
    }

    pub fn get_scheduler(&self, name: &str) -> Option<Arc<dyn Scheduler>> {
        self.schedulers.read().get(name).cloned()
    }

    /// Active scheduler names, sorted.
    pub fn scheduler_names(&self) -> Vec<String> {
        self.schedulers.read().keys().cloned().collect()
    }

    pub fn schedulers(&self) -> Vec<Arc<dyn Scheduler>> {
        self.schedulers.read().values().cloned().collect()
    }

    /// Rebuild schedulers from the state store.
    ///
    /// A stored config blob wins over the registration args. Records that
    /// fail to load are logged and skipped. Returns how many were loaded.
    pub fn load_persisted(&self) -> SchedulerResult<usize> {
        let records = self.store.list_schedulers()?;
        let mut loaded = 0;
        for record in records {
            let decoder = match self.storage.load_schedule_config(&record.name)? {
                Some(blob) => ConfigDecoder::Json(blob),
                None => ConfigDecoder::Args(record.args.clone()),
            };
            let scheduler = match create_scheduler(
                &record.scheduler_type,
                self.op_controller.clone(),
                self.storage.clone(),
                &decoder,
            ) {
                Ok(scheduler) => scheduler,
                Err(e) => {
                    warn!(name = %record.name, scheduler_type = %record.scheduler_type, error = %e, "failed to restore scheduler");
                    continue;
                }
            };
            if scheduler.name() != record.name {
                warn!(stored = %record.name, actual = %scheduler.name(), "restored scheduler name differs from record");
            }
            self.schedulers
                .write()
                .insert(scheduler.name().to_string(), scheduler);
            loaded += 1;
        }
        info!(loaded, "schedulers restored");
        Ok(loaded)
    }

    /// Run one scheduling round across all schedulers. Returns how many
    /// operators were admitted.
    pub fn run_once(&self) -> usize {
        let mut admitted = 0;
        for scheduler in self.schedulers() {
            if !scheduler.is_schedule_allowed(self.cluster.as_ref()) {
                debug!(name = %scheduler.name(), "scheduler hit operator limit");
                continue;
            }
            let ops = scheduler.schedule(self.cluster.as_ref());
            if ops.is_empty() {
                continue;
            }
            admitted += self.op_controller.add_operators(ops);
        }
        admitted
    }

    /// Drive scheduling rounds every `interval` until `shutdown` flips.
    pub async fn run(&self, interval: Duration, mut shutdown: tokio::sync::watch::Receiver<bool>) {
        info!(interval_ms = interval.as_millis() as u64, "coordinator started");

        loop {
            tokio::select! {
                _ = tokio::time::sleep(interval) => {
                    let admitted = self.run_once();
                    if admitted > 0 {
                        debug!(admitted, "scheduling round admitted operators");
                    }
                }
                _ = shutdown.changed() => {
                    info!("coordinator shutting down");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::affinity::AFFINITY_NAME;
    use crate::test_util::*;
    use pdlite_cluster::BasicCluster;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn coordinator(cluster: Arc<BasicCluster>, store: StateStore) -> Coordinator {
        Coordinator::new(cluster, op_controller(), store)
    }

    #[test]
    fn add_persists_record_and_config() {
        let store = StateStore::open_in_memory().unwrap();
        let coordinator = coordinator(Arc::new(cluster(4)), store.clone());

        let name = coordinator.add_scheduler("affinity", args(&["a", "z"])).unwrap();
        assert_eq!(name, AFFINITY_NAME);
        assert_eq!(coordinator.scheduler_names(), vec![AFFINITY_NAME]);

        let record = store.get_scheduler(AFFINITY_NAME).unwrap().unwrap();
        assert_eq!(record.scheduler_type, "affinity");
        assert_eq!(record.args, args(&["a", "z"]));
        assert!(store.load_schedule_config(AFFINITY_NAME).unwrap().is_some());
    }

    #[test]
    fn duplicate_add_is_rejected() {
        let coordinator = coordinator(Arc::new(cluster(4)), StateStore::open_in_memory().unwrap());
        coordinator.add_scheduler("affinity", args(&["a", "z"])).unwrap();
        assert!(matches!(
            coordinator.add_scheduler("affinity", args(&["b", "y"])),
            Err(SchedulerError::AlreadyExists(_))
        ));
    }

    #[test]
    fn bad_add_leaves_nothing_behind() {
        let store = StateStore::open_in_memory().unwrap();
        let coordinator = coordinator(Arc::new(cluster(4)), store.clone());

        assert!(coordinator.add_scheduler("affinity", vec![]).is_err());
        assert!(coordinator.add_scheduler("shuffle", args(&["a", "z"])).is_err());
        assert!(coordinator.scheduler_names().is_empty());
        assert!(store.list_schedulers().unwrap().is_empty());
    }

    #[test]
    fn failed_config_save_rolls_back_record() {
        let store = StateStore::open_in_memory().unwrap();
        let coordinator = Coordinator::with_config_storage(
            Arc::new(cluster(4)),
            op_controller(),
            store.clone(),
            Arc::new(FailingStorage),
        );

        let err = coordinator.add_scheduler("affinity", args(&["a", "z"])).unwrap_err();
        assert!(err.to_string().contains("disk full"));
        assert!(coordinator.scheduler_names().is_empty());
        assert!(store.get_scheduler(AFFINITY_NAME).unwrap().is_none());

        // Nothing comes back after a restart either.
        let restarted = self::coordinator(Arc::new(cluster(4)), store);
        assert_eq!(restarted.load_persisted().unwrap(), 0);
    }

    #[test]
    fn remove_drops_persisted_state() {
        let store = StateStore::open_in_memory().unwrap();
        let coordinator = coordinator(Arc::new(cluster(4)), store.clone());
        coordinator.add_scheduler("affinity", args(&["a", "z"])).unwrap();

        coordinator.remove_scheduler(AFFINITY_NAME).unwrap();
        assert!(coordinator.get_scheduler(AFFINITY_NAME).is_none());
        assert!(store.get_scheduler(AFFINITY_NAME).unwrap().is_none());
        assert!(store.load_schedule_config(AFFINITY_NAME).unwrap().is_none());
        assert!(matches!(
            coordinator.remove_scheduler(AFFINITY_NAME),
            Err(SchedulerError::NotFound(_))
        ));
    }

    #[test]
    fn restore_prefers_stored_config_over_args() {
        let store = StateStore::open_in_memory().unwrap();
        {
            let coordinator = coordinator(Arc::new(cluster(4)), store.clone());
            coordinator.add_scheduler("affinity", args(&["a", "c"])).unwrap();
            let scheduler = coordinator.get_scheduler(AFFINITY_NAME).unwrap();
            // Stands in for a POST /config after registration.
            let updated = crate::affinity::decode_config(&ConfigDecoder::Args(args(&["x", "z"]))).unwrap();
            let crate::registry::SchedulerConfig::Affinity(conf) = updated;
            store
                .save_schedule_config(scheduler.name(), &serde_json::to_vec(&conf).unwrap())
                .unwrap();
        }

        let coordinator = coordinator(Arc::new(cluster(4)), store);
        assert_eq!(coordinator.load_persisted().unwrap(), 1);
        let blob = coordinator.get_scheduler(AFFINITY_NAME).unwrap().encode_config().unwrap();
        let json: serde_json::Value = serde_json::from_slice(&blob).unwrap();
        assert_eq!(json["range"]["start-key"], "eA==");
    }

    #[test]
    fn restore_falls_back_to_args_and_skips_broken_records() {
        let store = StateStore::open_in_memory().unwrap();
        store
            .put_scheduler(&SchedulerRecord {
                name: AFFINITY_NAME.to_string(),
                scheduler_type: "affinity".to_string(),
                args: args(&["a", "c"]),
            })
            .unwrap();
        store
            .put_scheduler(&SchedulerRecord {
                name: "gone-scheduler".to_string(),
                scheduler_type: "gone".to_string(),
                args: vec![],
            })
            .unwrap();

        let coordinator = coordinator(Arc::new(cluster(4)), store);
        assert_eq!(coordinator.load_persisted().unwrap(), 1);
        assert_eq!(coordinator.scheduler_names(), vec![AFFINITY_NAME]);
    }

    #[test]
    fn run_once_admits_until_limit() {
        let cluster = Arc::new(cluster(1));
        cluster.put_region(region(1, "a", "c", 1, &[1, 2]));
        cluster.put_region(region(2, "c", "e", 1, &[1, 2]));
        cluster.put_region(region(3, "e", "g", 2, &[1, 2]));
        cluster.put_region(region(4, "g", "i", 2, &[1, 2]));
        let coordinator = coordinator(cluster, StateStore::open_in_memory().unwrap());
        coordinator.add_scheduler("affinity", args(&["a", "z"])).unwrap();

        // The whole batch is admitted; the limit gates the next round.
        assert_eq!(coordinator.run_once(), 2);
        assert_eq!(coordinator.run_once(), 0);
        let metrics = coordinator.op_controller().metrics();
        assert_eq!(metrics.operator_limit("affinity", "leader").get(), 1);
        assert_eq!(metrics.scheduler_event(AFFINITY_NAME, "new-operator").get(), 2);
    }

    #[tokio::test]
    async fn run_stops_on_shutdown() {
        let coordinator = Arc::new(coordinator(Arc::new(cluster(4)), StateStore::open_in_memory().unwrap()));
        let (tx, rx) = tokio::sync::watch::channel(false);

        let handle = tokio::spawn({
            let coordinator = coordinator.clone();
            async move { coordinator.run(Duration::from_millis(5), rx).await }
        });
        tokio::time::sleep(Duration::from_millis(20)).await;
        tx.send(true).unwrap();
        handle.await.unwrap();
    }
}
