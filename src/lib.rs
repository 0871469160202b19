pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod providers;
#[cfg(feature = "server")]
pub mod server;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::storage::FileSnapshotStore;
pub use config::AppConfig;
pub use crate::core::aggregator::{CharacterService, FetchMode};
pub use domain::model::{AggregationReport, Character, FetchOptions, ProviderFailure};
pub use domain::ports::{CharacterProvider, SnapshotSink};
pub use utils::error::{Result, SyncError};
