//! Operator model.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use pdlite_core::{RegionEpoch, RegionId, StoreId};

/// Category of an operator, used for admission limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorKind {
    /// Moves leadership only.
    Leader,
    /// Moves or changes replicas.
    Region,
    /// Issued by an operator, not a scheduler.
    Admin,
}

impl OperatorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperatorKind::Leader => "leader",
            OperatorKind::Region => "region",
            OperatorKind::Admin => "admin",
        }
    }
}

impl fmt::Display for OperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One step of an operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OperatorStep {
    TransferLeader { from_store: StoreId, to_store: StoreId },
}

/// A validated mutation against a single region.
#[derive(Debug, Clone, Serialize)]
pub struct Operator {
    /// Operator family, e.g. `"transfer-leader"`.
    pub desc: String,
    /// Human-readable reason supplied by the creator.
    pub brief: String,
    pub region_id: RegionId,
    /// Region epoch the operator was built against.
    pub region_epoch: RegionEpoch,
    pub kind: OperatorKind,
    pub steps: Vec<OperatorStep>,
    /// Unix timestamp (milliseconds) of creation.
    pub created_at: u64,
}

impl Operator {
    pub fn new(
        desc: impl Into<String>,
        brief: impl Into<String>,
        region_id: RegionId,
        region_epoch: RegionEpoch,
        kind: OperatorKind,
        steps: Vec<OperatorStep>,
    ) -> Self {
        Self {
            desc: desc.into(),
            brief: brief.into(),
            region_id,
            region_epoch,
            kind,
            steps,
            created_at: epoch_millis(),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\"{}\" (kind:{}, region:{}({},{}), brief:{})",
            self.desc,
            self.kind,
            self.region_id,
            self.region_epoch.version,
            self.region_epoch.conf_ver,
            self.brief.trim_end()
        )
    }
}

fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transfer(region_id: RegionId) -> Operator {
        Operator::new(
            "transfer-leader",
            "test ",
            region_id,
            RegionEpoch { conf_ver: 1, version: 2 },
            OperatorKind::Leader,
            vec![OperatorStep::TransferLeader { from_store: 1, to_store: 2 }],
        )
    }

    #[test]
    fn kind_strings() {
        assert_eq!(OperatorKind::Leader.as_str(), "leader");
        assert_eq!(OperatorKind::Region.to_string(), "region");
    }

    #[test]
    fn display_includes_epoch_and_brief() {
        let op = transfer(3);
        assert_eq!(
            op.to_string(),
            "\"transfer-leader\" (kind:leader, region:3(2,1), brief:test)"
        );
    }

    #[test]
    fn serializes_kind_and_steps() {
        let op = transfer(3);
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json["kind"], "leader");
        assert_eq!(json["steps"][0]["type"], "transfer_leader");
        assert_eq!(json["region_id"], 3);
    }
}
