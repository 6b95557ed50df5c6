pub mod config;
pub mod keys;
pub mod types;

pub use config::DaemonConfig;
pub use keys::{KeyError, get_key_ranges, unescape_key};
pub use types::*;
