use crate::adapters::http::build_client;
use crate::core::aggregator::FetchMode;
use crate::domain::ports::CharacterProvider;
use crate::providers::ProviderKind;
use crate::utils::error::{Result, SyncError};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 300;
pub const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default = "default_providers")]
    pub providers: Vec<ProviderConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_addr")]
    pub addr: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// 未設定時由呼叫端決定（伺服器使用程序生命週期的暫存目錄）
    pub base_dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    #[serde(default)]
    pub mode: FetchMode,
    #[serde(default = "default_http_timeout")]
    pub http_timeout_seconds: u64,
    #[serde(default)]
    pub limit_per_provider: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub json: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub kind: ProviderKind,
    pub enabled: Option<bool>,
    pub base_url: Option<String>,
    pub page_size: Option<usize>,
}

fn default_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECONDS
}

fn default_http_timeout() -> u64 {
    DEFAULT_HTTP_TIMEOUT_SECONDS
}

fn default_providers() -> Vec<ProviderConfig> {
    [
        ProviderKind::Pokemon,
        ProviderKind::Starwars,
        ProviderKind::Rickandmorty,
    ]
    .into_iter()
    .map(|kind| ProviderConfig {
        kind,
        enabled: Some(true),
        base_url: None,
        page_size: None,
    })
    .collect()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            mode: FetchMode::default(),
            http_timeout_seconds: default_http_timeout(),
            limit_per_provider: 0,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            store: StoreConfig::default(),
            fetch: FetchConfig::default(),
            logging: LoggingConfig::default(),
            providers: default_providers(),
        }
    }
}

impl ProviderConfig {
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SyncError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SyncError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${POKEAPI_URL})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| SyncError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_seconds)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch.http_timeout_seconds)
    }

    pub fn enabled_providers(&self) -> impl Iterator<Item = &ProviderConfig> {
        self.providers.iter().filter(|p| p.is_enabled())
    }

    /// Builds the provider list in configuration order, sharing one HTTP
    /// client between all of them.
    pub fn build_providers(&self) -> Result<Vec<Arc<dyn CharacterProvider>>> {
        let client = build_client(self.http_timeout())?;
        let providers = self
            .enabled_providers()
            .map(|p| p.kind.build(client.clone(), p.base_url.as_deref(), p.page_size))
            .collect::<Vec<_>>();

        tracing::debug!(
            "Configured providers: {:?}",
            providers.iter().map(|p| p.name()).collect::<Vec<_>>()
        );
        Ok(providers)
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("server.addr", &self.server.addr)?;
        validation::validate_positive_number(
            "server.request_timeout_seconds",
            self.server.request_timeout_seconds,
            1,
        )?;
        validation::validate_positive_number(
            "fetch.http_timeout_seconds",
            self.fetch.http_timeout_seconds,
            1,
        )?;

        if let Some(base_dir) = &self.store.base_dir {
            validation::validate_path("store.base_dir", base_dir)?;
        }

        for provider in &self.providers {
            if let Some(base_url) = &provider.base_url {
                validation::validate_url("providers.base_url", base_url)?;
            }
            if let Some(page_size) = provider.page_size {
                validation::validate_positive_number("providers.page_size", page_size as u64, 1)?;
            }
        }

        Ok(())
    }
}
