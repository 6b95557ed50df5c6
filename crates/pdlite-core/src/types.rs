//! Domain types for the pdlite placement service.
//!
//! Regions are contiguous, replicated slices of the keyspace. Each region
//! has peers on several stores, one of which may be the leader. All keys are
//! opaque byte strings; JSON carries them base64-encoded.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::keys::base64_key;

/// Unique identifier for a region.
pub type RegionId = u64;

/// Unique identifier for a store (storage node).
pub type StoreId = u64;

/// Unique identifier for a peer (replica) of a region.
pub type PeerId = u64;

// ── Key range ─────────────────────────────────────────────────────

/// Half-open interval `[start_key, end_key)` over the keyspace.
///
/// An empty `end_key` means "to the end of the keyspace".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyRange {
    #[serde(rename = "start-key", with = "base64_key", default)]
    pub start_key: Vec<u8>,
    #[serde(rename = "end-key", with = "base64_key", default)]
    pub end_key: Vec<u8>,
}

impl KeyRange {
    pub fn new(start_key: impl Into<Vec<u8>>, end_key: impl Into<Vec<u8>>) -> Self {
        Self {
            start_key: start_key.into(),
            end_key: end_key.into(),
        }
    }

    /// The whole keyspace, `["", "")`.
    pub fn full() -> Self {
        Self::default()
    }

    /// Whether the interval `[start, end)` lies entirely inside this range.
    ///
    /// An interval that only partially overlaps the range is not involved.
    pub fn involves(&self, start: &[u8], end: &[u8]) -> bool {
        start >= self.start_key.as_slice()
            && (self.end_key.is_empty()
                || (!end.is_empty() && end <= self.end_key.as_slice()))
    }
}

impl fmt::Display for KeyRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {})",
            hex::encode(&self.start_key),
            hex::encode(&self.end_key)
        )
    }
}

// ── Region ────────────────────────────────────────────────────────

/// Region version counters, bumped on membership and range changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionEpoch {
    pub conf_ver: u64,
    pub version: u64,
}

/// Replica role within a region.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeerRole {
    #[default]
    Voter,
    Learner,
}

/// A single replica of a region, hosted on one store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Peer {
    pub id: PeerId,
    pub store_id: StoreId,
    #[serde(default)]
    pub role: PeerRole,
}

impl Peer {
    pub fn new(id: PeerId, store_id: StoreId) -> Self {
        Self {
            id,
            store_id,
            role: PeerRole::Voter,
        }
    }

    pub fn learner(id: PeerId, store_id: StoreId) -> Self {
        Self {
            id,
            store_id,
            role: PeerRole::Learner,
        }
    }
}

/// Snapshot of a region as last reported by its leader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub id: RegionId,
    #[serde(with = "base64_key", default)]
    pub start_key: Vec<u8>,
    #[serde(with = "base64_key", default)]
    pub end_key: Vec<u8>,
    #[serde(default)]
    pub epoch: RegionEpoch,
    #[serde(default)]
    pub peers: Vec<Peer>,
    #[serde(default)]
    pub leader: Option<Peer>,
    /// Peers currently reported as down.
    #[serde(default)]
    pub down_peer_ids: BTreeSet<PeerId>,
}

impl Region {
    pub fn new(id: RegionId, start_key: impl Into<Vec<u8>>, end_key: impl Into<Vec<u8>>) -> Self {
        Self {
            id,
            start_key: start_key.into(),
            end_key: end_key.into(),
            epoch: RegionEpoch::default(),
            peers: Vec::new(),
            leader: None,
            down_peer_ids: BTreeSet::new(),
        }
    }

    /// Add a peer, optionally making it the leader.
    pub fn with_peer(mut self, peer: Peer, is_leader: bool) -> Self {
        if is_leader {
            self.leader = Some(peer);
        }
        self.peers.push(peer);
        self
    }

    /// Mark a peer as down.
    pub fn with_down_peer(mut self, peer_id: PeerId) -> Self {
        self.down_peer_ids.insert(peer_id);
        self
    }

    pub fn leader(&self) -> Option<&Peer> {
        self.leader.as_ref()
    }

    pub fn is_peer_down(&self, peer_id: PeerId) -> bool {
        self.down_peer_ids.contains(&peer_id)
    }

    /// The leader, if there is one and it is not reported down.
    pub fn healthy_leader(&self) -> Option<&Peer> {
        self.leader().filter(|l| !self.is_peer_down(l.id))
    }

    /// The peer hosted on `store_id`, if any.
    pub fn store_peer(&self, store_id: StoreId) -> Option<&Peer> {
        self.peers.iter().find(|p| p.store_id == store_id)
    }
}

// ── Store ─────────────────────────────────────────────────────────

/// Lifecycle state of a store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreState {
    #[default]
    Up,
    Offline,
    Tombstone,
}

/// A storage node hosting region replicas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    pub id: StoreId,
    pub address: String,
    #[serde(default)]
    pub state: StoreState,
    #[serde(default)]
    pub labels: HashMap<String, String>,
    /// Unix timestamp of last heartbeat.
    #[serde(default)]
    pub last_heartbeat: u64,
}

impl Store {
    pub fn new(id: StoreId, address: impl Into<String>) -> Self {
        Self {
            id,
            address: address.into(),
            state: StoreState::Up,
            labels: HashMap::new(),
            last_heartbeat: 0,
        }
    }

    pub fn is_up(&self) -> bool {
        self.state == StoreState::Up
    }
}
