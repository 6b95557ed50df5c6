//! Scheduling limits shared by every scheduler.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterOptions {
    /// Maximum number of in-flight leader operators.
    pub leader_schedule_limit: u64,
    /// Maximum number of in-flight region operators.
    pub region_schedule_limit: u64,
}

impl ClusterOptions {
    pub fn leader_schedule_limit(&self) -> u64 {
        self.leader_schedule_limit
    }

    pub fn region_schedule_limit(&self) -> u64 {
        self.region_schedule_limit
    }
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            leader_schedule_limit: 4,
            region_schedule_limit: 2048,
        }
    }
}
