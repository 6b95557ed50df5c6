//! In-memory cluster view.
//!
//! Regions are indexed twice: by ID and by start key. The start-key tree
//! never holds two overlapping regions; a heartbeat for a region evicts
//! whatever it now overlaps.

use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;

use parking_lot::RwLock;
use tracing::debug;

use pdlite_core::{Region, RegionId, Store, StoreId};

use crate::Cluster;
use crate::options::ClusterOptions;

#[derive(Default)]
struct Inner {
    regions: HashMap<RegionId, Region>,
    /// start_key → region ID.
    tree: BTreeMap<Vec<u8>, RegionId>,
    stores: BTreeMap<StoreId, Store>,
    opts: ClusterOptions,
}

impl Inner {
    fn scan_ids(&self, start_key: &[u8], end_key: &[u8], limit: usize) -> Vec<RegionId> {
        let mut ids = Vec::new();

        // The region containing start_key begins at or before it.
        let preceding = self
            .tree
            .range::<[u8], _>((Bound::Unbounded, Bound::Included(start_key)))
            .next_back();
        if let Some((_, id)) = preceding {
            if let Some(region) = self.regions.get(id) {
                if region.end_key.is_empty() || region.end_key.as_slice() > start_key {
                    ids.push(*id);
                }
            }
        }

        for (key, id) in self
            .tree
            .range::<[u8], _>((Bound::Excluded(start_key), Bound::Unbounded))
        {
            if !end_key.is_empty() && key.as_slice() >= end_key {
                break;
            }
            ids.push(*id);
        }

        if limit > 0 {
            ids.truncate(limit);
        }
        ids
    }

    fn remove(&mut self, region_id: RegionId) -> Option<Region> {
        let region = self.regions.remove(&region_id)?;
        if self.tree.get(&region.start_key) == Some(&region_id) {
            self.tree.remove(&region.start_key);
        }
        Some(region)
    }
}

/// Thread-safe in-memory region tree and store registry.
#[derive(Default)]
pub struct BasicCluster {
    inner: RwLock<Inner>,
}

impl BasicCluster {
    pub fn new(opts: ClusterOptions) -> Self {
        Self {
            inner: RwLock::new(Inner {
                opts,
                ..Inner::default()
            }),
        }
    }

    /// Insert or replace a region, evicting any region it overlaps.
    ///
    /// Returns the IDs of evicted regions (not counting a previous version
    /// of the same region).
    pub fn put_region(&self, region: Region) -> Vec<RegionId> {
        let mut inner = self.inner.write();
        inner.remove(region.id);

        let overlaps = inner.scan_ids(&region.start_key, &region.end_key, 0);
        for id in &overlaps {
            inner.remove(*id);
        }
        if !overlaps.is_empty() {
            debug!(region_id = region.id, evicted = ?overlaps, "region heartbeat replaced overlapping regions");
        }

        inner.tree.insert(region.start_key.clone(), region.id);
        inner.regions.insert(region.id, region);
        overlaps
    }

    pub fn remove_region(&self, region_id: RegionId) -> Option<Region> {
        self.inner.write().remove(region_id)
    }

    /// All regions in key order.
    pub fn regions(&self) -> Vec<Region> {
        self.scan_regions(&[], &[], 0)
    }

    pub fn region_count(&self) -> usize {
        self.inner.read().regions.len()
    }

    pub fn put_store(&self, store: Store) {
        let mut inner = self.inner.write();
        debug!(store_id = store.id, state = ?store.state, "store updated");
        inner.stores.insert(store.id, store);
    }

    /// All stores ordered by ID.
    pub fn stores(&self) -> Vec<Store> {
        self.inner.read().stores.values().cloned().collect()
    }

    pub fn set_opts(&self, opts: ClusterOptions) {
        self.inner.write().opts = opts;
    }
}

impl Cluster for BasicCluster {
    fn scan_regions(&self, start_key: &[u8], end_key: &[u8], limit: usize) -> Vec<Region> {
        let inner = self.inner.read();
        inner
            .scan_ids(start_key, end_key, limit)
            .iter()
            .filter_map(|id| inner.regions.get(id).cloned())
            .collect()
    }

    fn get_region(&self, region_id: RegionId) -> Option<Region> {
        self.inner.read().regions.get(&region_id).cloned()
    }

    fn get_store(&self, store_id: StoreId) -> Option<Store> {
        self.inner.read().stores.get(&store_id).cloned()
    }

    fn opts(&self) -> ClusterOptions {
        self.inner.read().opts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(id: RegionId, start: &str, end: &str) -> Region {
        Region::new(id, start.as_bytes().to_vec(), end.as_bytes().to_vec())
    }

    /// Regions: ["", b) [b, d) [d, f) [f, "")
    fn four_regions() -> BasicCluster {
        let cluster = BasicCluster::default();
        cluster.put_region(region(1, "", "b"));
        cluster.put_region(region(2, "b", "d"));
        cluster.put_region(region(3, "d", "f"));
        cluster.put_region(region(4, "f", ""));
        cluster
    }

    fn ids(regions: &[Region]) -> Vec<RegionId> {
        regions.iter().map(|r| r.id).collect()
    }

    #[test]
    fn scan_whole_keyspace() {
        let cluster = four_regions();
        assert_eq!(ids(&cluster.scan_regions(b"", b"", 0)), vec![1, 2, 3, 4]);
    }

    #[test]
    fn scan_includes_region_containing_start() {
        let cluster = four_regions();
        // "c" sits inside region 2.
        assert_eq!(ids(&cluster.scan_regions(b"c", b"e", 0)), vec![2, 3]);
    }

    #[test]
    fn scan_end_is_exclusive() {
        let cluster = four_regions();
        assert_eq!(ids(&cluster.scan_regions(b"b", b"d", 0)), vec![2]);
    }

    #[test]
    fn scan_respects_limit() {
        let cluster = four_regions();
        assert_eq!(ids(&cluster.scan_regions(b"", b"", 2)), vec![1, 2]);
    }

    #[test]
    fn scan_with_gap_skips_missing_start() {
        let cluster = BasicCluster::default();
        cluster.put_region(region(2, "b", "d"));
        cluster.put_region(region(3, "f", "h"));
        // "e" lies in a hole; region 2 ends before it.
        assert_eq!(ids(&cluster.scan_regions(b"e", b"", 0)), vec![3]);
    }

    #[test]
    fn heartbeat_replaces_same_region() {
        let cluster = four_regions();
        let mut updated = region(2, "b", "d");
        updated.epoch.version = 2;
        let evicted = cluster.put_region(updated);

        assert!(evicted.is_empty());
        assert_eq!(cluster.region_count(), 4);
        assert_eq!(cluster.get_region(2).unwrap().epoch.version, 2);
    }

    #[test]
    fn heartbeat_evicts_overlapping_regions() {
        let cluster = four_regions();
        // A merged region now covers [b, f).
        let evicted = cluster.put_region(region(2, "b", "f"));

        assert_eq!(evicted, vec![3]);
        assert_eq!(ids(&cluster.regions()), vec![1, 2, 4]);
        assert!(cluster.get_region(3).is_none());
    }

    #[test]
    fn region_moving_start_key_drops_old_index() {
        let cluster = BasicCluster::default();
        cluster.put_region(region(5, "a", "c"));
        cluster.put_region(region(5, "b", "c"));

        assert_eq!(ids(&cluster.scan_regions(b"a", b"b", 0)), Vec::<RegionId>::new());
        assert_eq!(ids(&cluster.regions()), vec![5]);
    }

    #[test]
    fn remove_region() {
        let cluster = four_regions();
        assert!(cluster.remove_region(3).is_some());
        assert!(cluster.remove_region(3).is_none());
        assert_eq!(ids(&cluster.regions()), vec![1, 2, 4]);
    }

    #[test]
    fn stores_and_options() {
        let cluster = BasicCluster::new(ClusterOptions {
            leader_schedule_limit: 7,
            region_schedule_limit: 1,
        });
        cluster.put_store(Store::new(2, "10.0.0.2:20160"));
        cluster.put_store(Store::new(1, "10.0.0.1:20160"));

        let store_ids: Vec<StoreId> = cluster.stores().iter().map(|s| s.id).collect();
        assert_eq!(store_ids, vec![1, 2]);
        assert!(cluster.get_store(1).unwrap().is_up());
        assert_eq!(cluster.opts().leader_schedule_limit(), 7);

        cluster.set_opts(ClusterOptions::default());
        assert_eq!(cluster.opts().leader_schedule_limit(), 4);
    }
}
