//! Tracks in-flight operators.
//!
//! At most one operator runs per region. Schedulers read per-kind counts
//! to decide whether they may propose more work; the execution runtime
//! removes operators once they finish.

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::{debug, info};

use pdlite_core::RegionId;
use pdlite_metrics::Metrics;

use crate::operator::{Operator, OperatorKind};

pub struct OperatorController {
    /// region_id → in-flight operator.
    operators: RwLock<HashMap<RegionId, Operator>>,
    metrics: Metrics,
}

impl OperatorController {
    pub fn new(metrics: Metrics) -> Self {
        Self {
            operators: RwLock::new(HashMap::new()),
            metrics,
        }
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Number of in-flight operators of `kind`.
    pub fn operator_count(&self, kind: OperatorKind) -> u64 {
        self.operators
            .read()
            .values()
            .filter(|op| op.kind == kind)
            .count() as u64
    }

    /// Admit operators. Operators for regions that already have one in
    /// flight are dropped. Returns how many were admitted.
    pub fn add_operators(&self, ops: Vec<Operator>) -> usize {
        let mut operators = self.operators.write();
        let mut added = 0;
        for op in ops {
            if let Some(existing) = operators.get(&op.region_id) {
                debug!(region_id = op.region_id, existing = %existing, "region already has an operator, skipping");
                continue;
            }
            self.metrics.operator_event(op.kind.as_str(), "create").inc();
            info!(region_id = op.region_id, operator = %op, "operator added");
            operators.insert(op.region_id, op);
            added += 1;
        }
        added
    }

    /// Remove a finished (or cancelled) operator.
    pub fn remove_operator(&self, region_id: RegionId) -> Option<Operator> {
        let op = self.operators.write().remove(&region_id)?;
        self.metrics.operator_event(op.kind.as_str(), "finish").inc();
        debug!(region_id, operator = %op, "operator removed");
        Some(op)
    }

    pub fn get_operator(&self, region_id: RegionId) -> Option<Operator> {
        self.operators.read().get(&region_id).cloned()
    }

    /// All in-flight operators ordered by region ID.
    pub fn operators(&self) -> Vec<Operator> {
        let mut ops: Vec<Operator> = self.operators.read().values().cloned().collect();
        ops.sort_by_key(|op| op.region_id);
        ops
    }
}
