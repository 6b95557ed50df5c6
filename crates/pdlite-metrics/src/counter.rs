//! Monotonic counters and labeled counter vectors.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

/// Handle to a single monotonic counter. Clones share the same value.
#[derive(Debug, Clone, Default)]
pub struct Counter {
    value: Arc<AtomicU64>,
}

impl Counter {
    pub fn inc(&self) {
        self.inc_by(1);
    }

    pub fn inc_by(&self, n: u64) {
        self.value.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// A family of counters sharing a name and label names.
pub struct CounterVec {
    name: &'static str,
    help: &'static str,
    label_names: &'static [&'static str],
    /// label values → counter.
    counters: RwLock<BTreeMap<Vec<String>, Counter>>,
}

impl CounterVec {
    pub fn new(name: &'static str, help: &'static str, label_names: &'static [&'static str]) -> Self {
        Self {
            name,
            help,
            label_names,
            counters: RwLock::new(BTreeMap::new()),
        }
    }

    /// Get (or create) the counter for the given label values.
    pub fn with_label_values(&self, values: &[&str]) -> Counter {
        debug_assert_eq!(values.len(), self.label_names.len(), "label count mismatch for {}", self.name);
        let key: Vec<String> = values.iter().map(|v| v.to_string()).collect();

        if let Some(counter) = self.counters.read().get(&key) {
            return counter.clone();
        }
        self.counters.write().entry(key).or_default().clone()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn help(&self) -> &'static str {
        self.help
    }

    pub fn label_names(&self) -> &'static [&'static str] {
        self.label_names
    }

    /// Current values, ordered by label values.
    pub fn snapshot(&self) -> Vec<(Vec<String>, u64)> {
        self.counters
            .read()
            .iter()
            .map(|(labels, counter)| (labels.clone(), counter.get()))
            .collect()
    }
}
