use character_sync::config::cli::DEFAULT_OUTPUT_DIR;
use character_sync::utils::{logger, validation::Validate};
use character_sync::{CharacterService, CliConfig, FetchOptions, FileSnapshotStore};
use clap::Parser;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting character-sync CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 載入並驗證配置
    let config = match cli.resolve().and_then(|config| config.validate().map(|_| config)) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration failed: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    };

    let base_dir = config
        .store
        .base_dir
        .clone()
        .unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string());
    let providers = config.build_providers()?;
    let service =
        CharacterService::new(providers, FileSnapshotStore::new(base_dir)).with_mode(config.fetch.mode);

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling outstanding requests");
            ctrl_c.cancel();
        }
    });

    let options = FetchOptions::new(config.fetch.limit_per_provider);
    match service
        .fetch_all_within(&cancel, options, config.request_timeout())
        .await
    {
        Ok(report) => {
            for failure in &report.failures {
                tracing::warn!("⚠️ Skipped {}: {}", failure.provider, failure.error);
            }
            tracing::info!("✅ Sync completed successfully!");
            println!("✅ Synced {} characters", report.characters.len());
            println!("📁 Snapshot saved to: {}", report.snapshot);
            Ok(())
        }
        Err(e) => {
            tracing::error!("❌ Sync failed: {} (Category: {:?})", e, e.category());
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    }
}
