//! Operator creation errors.

use pdlite_core::{RegionId, StoreId};
use thiserror::Error;

/// Reasons an operator cannot be built against the current cluster state.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OperatorError {
    #[error("region {0} has no leader")]
    NoLeader(RegionId),

    #[error("region {region_id} leader is on store {actual}, expected store {expected}")]
    SourceMismatch {
        region_id: RegionId,
        expected: StoreId,
        actual: StoreId,
    },

    #[error("region {region_id} leader is already on store {store_id}")]
    SameStore { region_id: RegionId, store_id: StoreId },

    #[error("region {region_id} has no peer on store {store_id}")]
    NoTargetPeer { region_id: RegionId, store_id: StoreId },

    #[error("region {region_id} peer on store {store_id} is a learner")]
    TargetIsLearner { region_id: RegionId, store_id: StoreId },

    #[error("store {0} not found")]
    StoreNotFound(StoreId),

    #[error("store {0} is not up")]
    StoreUnavailable(StoreId),
}

pub type OperatorResult<T> = Result<T, OperatorError>;
