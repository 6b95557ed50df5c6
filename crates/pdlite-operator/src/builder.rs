//! Operator factories.
//!
//! Each factory checks the request against the current cluster view and
//! refuses to build an operator that could not possibly succeed.

use pdlite_cluster::Cluster;
use pdlite_core::{PeerRole, Region, StoreId};

use crate::error::{OperatorError, OperatorResult};
use crate::operator::{Operator, OperatorKind, OperatorStep};

/// Build an operator moving `region`'s leadership from `source` to `target`.
pub fn create_transfer_leader_operator(
    brief: &str,
    cluster: &dyn Cluster,
    region: &Region,
    source: StoreId,
    target: StoreId,
    kind: OperatorKind,
) -> OperatorResult<Operator> {
    let leader = region.leader().ok_or(OperatorError::NoLeader(region.id))?;
    if leader.store_id != source {
        return Err(OperatorError::SourceMismatch {
            region_id: region.id,
            expected: source,
            actual: leader.store_id,
        });
    }
    if source == target {
        return Err(OperatorError::SameStore {
            region_id: region.id,
            store_id: target,
        });
    }

    let peer = region.store_peer(target).ok_or(OperatorError::NoTargetPeer {
        region_id: region.id,
        store_id: target,
    })?;
    if peer.role == PeerRole::Learner {
        return Err(OperatorError::TargetIsLearner {
            region_id: region.id,
            store_id: target,
        });
    }

    let store = cluster
        .get_store(target)
        .ok_or(OperatorError::StoreNotFound(target))?;
    if !store.is_up() {
        return Err(OperatorError::StoreUnavailable(target));
    }

    Ok(Operator::new(
        "transfer-leader",
        brief,
        region.id,
        region.epoch,
        kind,
        vec![OperatorStep::TransferLeader {
            from_store: source,
            to_store: target,
        }],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdlite_cluster::BasicCluster;
    use pdlite_core::{Peer, Store, StoreState};

    fn cluster_with_stores(ids: &[StoreId]) -> BasicCluster {
        let cluster = BasicCluster::default();
        for id in ids {
            cluster.put_store(Store::new(*id, format!("10.0.0.{id}:20160")));
        }
        cluster
    }

    /// Leader on store 1, voter on store 2, learner on store 3.
    fn region() -> Region {
        Region::new(9, b"a".to_vec(), b"b".to_vec())
            .with_peer(Peer::new(91, 1), true)
            .with_peer(Peer::new(92, 2), false)
            .with_peer(Peer::learner(93, 3), false)
    }

    #[test]
    fn builds_transfer_leader() {
        let cluster = cluster_with_stores(&[1, 2, 3]);
        let op = create_transfer_leader_operator(
            "move it",
            &cluster,
            &region(),
            1,
            2,
            OperatorKind::Leader,
        )
        .unwrap();

        assert_eq!(op.desc, "transfer-leader");
        assert_eq!(op.brief, "move it");
        assert_eq!(op.region_id, 9);
        assert_eq!(op.kind, OperatorKind::Leader);
        assert_eq!(
            op.steps,
            vec![OperatorStep::TransferLeader { from_store: 1, to_store: 2 }]
        );
    }

    #[test]
    fn rejects_region_without_leader() {
        let cluster = cluster_with_stores(&[1, 2]);
        let mut r = region();
        r.leader = None;
        let err = create_transfer_leader_operator("", &cluster, &r, 1, 2, OperatorKind::Leader)
            .unwrap_err();
        assert_eq!(err, OperatorError::NoLeader(9));
    }

    #[test]
    fn rejects_wrong_source() {
        let cluster = cluster_with_stores(&[1, 2]);
        let err =
            create_transfer_leader_operator("", &cluster, &region(), 2, 1, OperatorKind::Leader)
                .unwrap_err();
        assert!(matches!(err, OperatorError::SourceMismatch { actual: 1, .. }));
    }

    #[test]
    fn rejects_same_store() {
        let cluster = cluster_with_stores(&[1]);
        let err =
            create_transfer_leader_operator("", &cluster, &region(), 1, 1, OperatorKind::Leader)
                .unwrap_err();
        assert!(matches!(err, OperatorError::SameStore { store_id: 1, .. }));
    }

    #[test]
    fn rejects_target_without_peer() {
        let cluster = cluster_with_stores(&[1, 2, 3, 4]);
        let err =
            create_transfer_leader_operator("", &cluster, &region(), 1, 4, OperatorKind::Leader)
                .unwrap_err();
        assert_eq!(err, OperatorError::NoTargetPeer { region_id: 9, store_id: 4 });
    }

    #[test]
    fn rejects_learner_target() {
        let cluster = cluster_with_stores(&[1, 2, 3]);
        let err =
            create_transfer_leader_operator("", &cluster, &region(), 1, 3, OperatorKind::Leader)
                .unwrap_err();
        assert!(matches!(err, OperatorError::TargetIsLearner { store_id: 3, .. }));
    }

    #[test]
    fn rejects_unknown_or_offline_store() {
        let cluster = cluster_with_stores(&[1]);
        let err =
            create_transfer_leader_operator("", &cluster, &region(), 1, 2, OperatorKind::Leader)
                .unwrap_err();
        assert_eq!(err, OperatorError::StoreNotFound(2));

        let mut offline = Store::new(2, "10.0.0.2:20160");
        offline.state = StoreState::Offline;
        cluster.put_store(offline);
        let err =
            create_transfer_leader_operator("", &cluster, &region(), 1, 2, OperatorKind::Leader)
                .unwrap_err();
        assert_eq!(err, OperatorError::StoreUnavailable(2));
    }
}
