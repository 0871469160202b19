use crate::domain::model::{Character, FetchOptions};
use crate::utils::error::Result;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// A catalog that yields normalized characters.
///
/// Implementations are built once at startup and shared across requests, so
/// they must not keep per-request state. Long-running work has to poll
/// `cancel` between pages and bail out with `SyncError::Cancelled`.
#[async_trait]
pub trait CharacterProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Returns at most `options.limit_per_provider` records (all when 0).
    async fn fetch(
        &self,
        cancel: &CancellationToken,
        options: FetchOptions,
    ) -> Result<Vec<Character>>;
}

pub trait SnapshotSink: Send + Sync {
    /// Durably stores one complete snapshot and returns its location.
    fn persist(
        &self,
        characters: &[Character],
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}
