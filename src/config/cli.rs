use crate::config::toml_config::AppConfig;
use crate::core::aggregator::FetchMode;
use crate::utils::error::Result;
use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_OUTPUT_DIR: &str = "./output";

#[derive(Debug, Clone, Parser)]
#[command(name = "character-sync")]
#[command(about = "Aggregate characters from several catalogs into one JSON snapshot")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Maximum characters per provider (0 = no limit)
    #[arg(long)]
    pub limit_per_provider: Option<usize>,

    /// Directory the snapshot is written to [default: ./output]
    #[arg(long)]
    pub output_dir: Option<String>,

    /// Poll all providers at the same time
    #[arg(long)]
    pub concurrent: bool,

    /// Overall deadline for the run, in seconds
    #[arg(long)]
    pub timeout_seconds: Option<u64>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    /// Loads the TOML file (or defaults) and layers the command line on top.
    pub fn resolve(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::from_file(path)?,
            None => AppConfig::default(),
        };

        if let Some(limit) = self.limit_per_provider {
            config.fetch.limit_per_provider = limit;
        }
        // 命令列優先，其次 TOML，最後才是預設目錄
        if let Some(dir) = &self.output_dir {
            config.store.base_dir = Some(dir.clone());
        } else if config.store.base_dir.is_none() {
            config.store.base_dir = Some(DEFAULT_OUTPUT_DIR.to_string());
        }
        if self.concurrent {
            config.fetch.mode = FetchMode::Concurrent;
        }
        if let Some(timeout) = self.timeout_seconds {
            config.server.request_timeout_seconds = timeout;
        }

        Ok(config)
    }
}
