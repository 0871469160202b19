use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Upstream {url} returned status {status}")]
    UpstreamStatusError { url: String, status: u16 },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Failed to write snapshot {}: {source}", .path.display())]
    PersistenceError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Deadline of {after:?} exceeded")]
    DeadlineExceeded { after: Duration },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// 單一資料來源失敗，由聚合服務吸收
    Provider,
    Persistence,
    Deadline,
    Configuration,
}

impl SyncError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SyncError::ApiError(_) | SyncError::UpstreamStatusError { .. } => {
                ErrorCategory::Provider
            }
            SyncError::IoError(_)
            | SyncError::SerializationError(_)
            | SyncError::PersistenceError { .. } => ErrorCategory::Persistence,
            SyncError::Cancelled | SyncError::DeadlineExceeded { .. } => ErrorCategory::Deadline,
            SyncError::ConfigError { .. }
            | SyncError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Configuration => 1,
            ErrorCategory::Provider => 2,
            ErrorCategory::Persistence => 3,
            ErrorCategory::Deadline => 4,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Provider => format!("A character catalog could not be reached: {}", self),
            ErrorCategory::Persistence => format!("The snapshot could not be saved: {}", self),
            ErrorCategory::Deadline => format!("The sync did not finish in time: {}", self),
            ErrorCategory::Configuration => format!("The configuration is invalid: {}", self),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Provider => "Check network connectivity and the provider base_url settings",
            ErrorCategory::Persistence => {
                "Check that the snapshot directory exists, is writable and has free space"
            }
            ErrorCategory::Deadline => {
                "Lower --limit-per-provider or raise request_timeout_seconds, then re-run"
            }
            ErrorCategory::Configuration => "Fix the reported field in the TOML file or CLI flags",
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_and_exit_code() {
        assert_eq!(SyncError::Cancelled.category(), ErrorCategory::Deadline);
        assert_eq!(SyncError::Cancelled.exit_code(), 4);

        let err = SyncError::PersistenceError {
            path: PathBuf::from("/nope/characters.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.category(), ErrorCategory::Persistence);
        assert!(err.to_string().contains("/nope/characters.json"));

        let err = SyncError::InvalidConfigValueError {
            field: "providers.page_size".to_string(),
            value: "0".to_string(),
            reason: "Value must be at least 1".to_string(),
        };
        assert_eq!(err.exit_code(), 1);
        assert!(err.user_friendly_message().contains("providers.page_size"));
    }
}
