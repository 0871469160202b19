pub mod aggregator;

pub use crate::domain::model::{AggregationReport, Character, FetchOptions, ProviderFailure};
pub use crate::domain::ports::{CharacterProvider, SnapshotSink};
pub use crate::utils::error::Result;
