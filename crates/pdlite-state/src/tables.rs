//! redb table definitions for the pdlite state store.

use redb::TableDefinition;

/// Serialized scheduler configuration blobs keyed by scheduler name.
pub const SCHEDULE_CONFIGS: TableDefinition<&str, &[u8]> = TableDefinition::new("schedule_configs");

/// Scheduler registrations (`SchedulerRecord` as JSON) keyed by scheduler name.
pub const SCHEDULERS: TableDefinition<&str, &[u8]> = TableDefinition::new("schedulers");
