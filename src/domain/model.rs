use serde::{Deserialize, Serialize};

/// A normalized character record as produced by any catalog.
///
/// Records have no identity: two entries with the same `name` are both kept.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    pub origin: String,
    pub species: String,
    pub additional_attribute: String,
}

impl Character {
    pub fn new(
        name: impl Into<String>,
        origin: impl Into<String>,
        species: impl Into<String>,
        additional_attribute: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            origin: origin.into(),
            species: species.into(),
            additional_attribute: additional_attribute.into(),
        }
    }
}

/// Per-invocation options handed to every provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// 0 means unbounded.
    pub limit_per_provider: usize,
}

impl FetchOptions {
    pub fn new(limit_per_provider: usize) -> Self {
        Self { limit_per_provider }
    }

    pub fn is_unbounded(&self) -> bool {
        self.limit_per_provider == 0
    }

    /// True once `fetched` records satisfy the cap.
    pub fn limit_reached(&self, fetched: usize) -> bool {
        !self.is_unbounded() && fetched >= self.limit_per_provider
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderFailure {
    pub provider: String,
    pub error: String,
}

/// Outcome of one aggregation run, including which providers were skipped.
#[derive(Debug, Clone, Serialize)]
pub struct AggregationReport {
    pub characters: Vec<Character>,
    pub failures: Vec<ProviderFailure>,
    /// Location reported by the snapshot sink.
    pub snapshot: String,
}

impl AggregationReport {
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn failed_providers(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.provider.as_str()).collect()
    }
}
