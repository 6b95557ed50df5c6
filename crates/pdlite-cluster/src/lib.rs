//! pdlite-cluster — read-only cluster snapshot access for schedulers.
//!
//! Schedulers consume the [`Cluster`] trait: range scans over the region
//! tree, store lookups, and the current [`ClusterOptions`]. [`BasicCluster`]
//! is the in-memory implementation fed by region and store heartbeats.

pub mod basic;
pub mod options;

use pdlite_core::{Region, RegionId, Store, StoreId};

pub use basic::BasicCluster;
pub use options::ClusterOptions;

/// Query facade over the cluster's region and store metadata.
pub trait Cluster: Send + Sync {
    /// Regions overlapping `[start_key, end_key)` in key order.
    ///
    /// The first region may begin before `start_key`. An empty `end_key`
    /// scans to the end of the keyspace; `limit == 0` means unlimited.
    fn scan_regions(&self, start_key: &[u8], end_key: &[u8], limit: usize) -> Vec<Region>;

    fn get_region(&self, region_id: RegionId) -> Option<Region>;

    fn get_store(&self, store_id: StoreId) -> Option<Store>;

    fn opts(&self) -> ClusterOptions;
}
