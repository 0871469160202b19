use anyhow::Context;
use character_sync::server::create_router;
use character_sync::utils::{logger, validation::Validate};
use character_sync::{AppConfig, CharacterService, FileSnapshotStore};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "character-sync-server")]
#[command(about = "Serve GET /characters backed by the character aggregator")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listen address from the config
    #[arg(long)]
    addr: Option<String>,

    /// Emit JSON log lines
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("failed to load config file '{}'", path.display()))?,
        None => AppConfig::default(),
    };
    if let Some(addr) = args.addr {
        config.server.addr = addr;
    }
    config.validate().context("invalid configuration")?;

    logger::init_server_logger(args.json_logs || config.logging.json);

    // 未指定目錄時使用程序生命週期的暫存目錄，結束時自動清除
    let (base_dir, temp_store) = match &config.store.base_dir {
        Some(dir) => (PathBuf::from(dir), None),
        None => {
            let temp = tempfile::Builder::new()
                .prefix("charactersync_store_")
                .tempdir()
                .context("failed to create temp dir")?;
            (temp.path().to_path_buf(), Some(temp))
        }
    };
    tracing::info!("📁 Snapshot directory: {}", base_dir.display());

    let providers = config.build_providers()?;
    let service = CharacterService::new(providers, FileSnapshotStore::new(base_dir))
        .with_mode(config.fetch.mode);
    tracing::info!(
        "Providers: {:?} ({:?} mode)",
        service.provider_names(),
        config.fetch.mode
    );

    let app = create_router(Arc::new(service), config.request_timeout());
    let listener = tokio::net::TcpListener::bind(&config.server.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server.addr))?;
    tracing::info!("🚀 Server listening on {}", config.server.addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
        })
        .await?;

    drop(temp_store);
    Ok(())
}
