//! Persisted record types.

use serde::{Deserialize, Serialize};

/// A registered scheduler: enough to rebuild it through the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerRecord {
    pub name: String,
    /// Registry type tag, e.g. `"affinity"`.
    #[serde(rename = "type")]
    pub scheduler_type: String,
    /// Positional arguments the scheduler was first created with.
    #[serde(default)]
    pub args: Vec<String>,
}
