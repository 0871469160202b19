use crate::domain::model::{AggregationReport, Character, FetchOptions, ProviderFailure};
use crate::domain::ports::{CharacterProvider, SnapshotSink};
use crate::utils::error::{Result, SyncError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// How providers are polled within one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchMode {
    #[default]
    Sequential,
    Concurrent,
}

/// Fans one request out to every configured provider, merges what comes back
/// and hands the sorted result to the snapshot sink.
///
/// Provider failures are logged and skipped. Only a failed snapshot or a
/// cancelled run fails the whole call.
pub struct CharacterService<S: SnapshotSink> {
    providers: Vec<Arc<dyn CharacterProvider>>,
    sink: S,
    mode: FetchMode,
}

impl<S: SnapshotSink> CharacterService<S> {
    pub fn new(providers: Vec<Arc<dyn CharacterProvider>>, sink: S) -> Self {
        Self {
            providers,
            sink,
            mode: FetchMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: FetchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub async fn fetch_all(
        &self,
        cancel: &CancellationToken,
        options: FetchOptions,
    ) -> Result<Vec<Character>> {
        let report = self.fetch_all_with_report(cancel, options).await?;
        Ok(report.characters)
    }

    /// Same as [`fetch_all`](Self::fetch_all) but also reports which
    /// providers were skipped and where the snapshot went.
    pub async fn fetch_all_with_report(
        &self,
        cancel: &CancellationToken,
        options: FetchOptions,
    ) -> Result<AggregationReport> {
        tracing::info!(
            "🔄 Fetching characters from {} providers ({:?}, limit per provider: {})",
            self.providers.len(),
            self.mode,
            options.limit_per_provider
        );

        let outcomes = match self.mode {
            FetchMode::Sequential => {
                let mut outcomes = Vec::with_capacity(self.providers.len());
                for provider in &self.providers {
                    outcomes.push(provider.fetch(cancel, options).await);
                }
                outcomes
            }
            FetchMode::Concurrent => {
                // join_all 保留輸入順序，因此結果與循序模式一致
                futures::future::join_all(
                    self.providers.iter().map(|p| p.fetch(cancel, options)),
                )
                .await
            }
        };

        let mut characters = Vec::new();
        let mut failures = Vec::new();
        for (provider, outcome) in self.providers.iter().zip(outcomes) {
            match outcome {
                Ok(batch) => {
                    tracing::debug!("{} returned {} characters", provider.name(), batch.len());
                    characters.extend(batch);
                }
                Err(e) => {
                    tracing::warn!("⚠️ Provider {} failed: {}", provider.name(), e);
                    failures.push(ProviderFailure {
                        provider: provider.name().to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }

        if cancel.is_cancelled() {
            tracing::error!(
                "❌ Run cancelled before persisting, discarding {} characters",
                characters.len()
            );
            return Err(SyncError::Cancelled);
        }

        sort_by_name(&mut characters);

        let snapshot = self.sink.persist(&characters).await.map_err(|e| {
            tracing::error!("❌ Failed to persist snapshot: {}", e);
            e
        })?;

        tracing::info!(
            "✅ Aggregated {} characters ({} providers failed)",
            characters.len(),
            failures.len()
        );

        Ok(AggregationReport {
            characters,
            failures,
            snapshot,
        })
    }

    /// Runs [`fetch_all_with_report`](Self::fetch_all_with_report) under a
    /// wall-clock deadline. Outstanding provider work is cancelled once it
    /// elapses.
    pub async fn fetch_all_within(
        &self,
        cancel: &CancellationToken,
        options: FetchOptions,
        deadline: Duration,
    ) -> Result<AggregationReport> {
        let run_token = cancel.child_token();
        match tokio::time::timeout(deadline, self.fetch_all_with_report(&run_token, options)).await
        {
            Ok(result) => result,
            Err(_) => {
                run_token.cancel();
                tracing::error!("⏱️ Aggregation exceeded deadline of {:?}", deadline);
                Err(SyncError::DeadlineExceeded { after: deadline })
            }
        }
    }
}

/// Stable, case-insensitive ordering by name.
pub fn sort_by_name(characters: &mut [Character]) {
    characters.sort_by_cached_key(|c| c.name.to_lowercase());
}
