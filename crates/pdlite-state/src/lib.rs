//! pdlite-state — durable configuration store for pdlite.
//!
//! Backed by [redb](https://docs.rs/redb), persists scheduler registrations
//! and the serialized configuration blob of each scheduler so the
//! coordinator can rebuild them after a restart.
//!
//! Scheduler names are the keys of both tables. Records are JSON; config
//! blobs are stored as the scheduler produced them.
//!
//! The `StateStore` is `Clone` + `Send` + `Sync` (backed by `Arc<Database>`).
//! Components that only save and load config blobs depend on the narrower
//! [`ConfigStorage`] trait instead.

pub mod error;
pub mod store;
pub mod tables;
pub mod types;

pub use error::{StateError, StateResult};
pub use store::{ConfigStorage, StateStore};
pub use types::*;
