use clap::Parser;
use scout_sync::domain::model::SyncReport;
use scout_sync::utils::{logger, validation::Validate};
use scout_sync::{
    CliConfig, ConfigProvider, HttpCsvFeed, JsonStore, LocalStaging, SyncConfig, SyncPipeline,
};

/// Build the pipeline from any config source, run one pass, and flush the
/// master store.
async fn execute<C: ConfigProvider>(config: C) -> scout_sync::Result<SyncReport> {
    let feed = HttpCsvFeed::new(config.feed_endpoint().to_string());
    let staging = LocalStaging::new(config.staging_dir().to_string());
    let store = JsonStore::open(config.store_path())?;

    let mut pipeline = SyncPipeline::new(feed, staging, store, config);
    let report = pipeline.run().await?;
    pipeline.store().flush()?;
    Ok(report)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting scout-sync");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let config_file = cli.config.clone();
    let result = match config_file {
        Some(path) => {
            tracing::info!("📄 loading config file: {}", path);
            match SyncConfig::from_file(&path) {
                Ok(config) => {
                    if let Err(e) = config.validate() {
                        tracing::error!("❌ configuration validation failed: {}", e);
                        eprintln!("❌ {}", e);
                        std::process::exit(1);
                    }
                    execute(config).await
                }
                Err(e) => {
                    tracing::error!("❌ failed to load {}: {}", path, e);
                    eprintln!("❌ {}", e);
                    std::process::exit(1);
                }
            }
        }
        None => {
            if let Err(e) = cli.validate() {
                tracing::error!("❌ configuration validation failed: {}", e);
                eprintln!("❌ {}", e);
                std::process::exit(1);
            }
            execute(cli).await
        }
    };

    match result {
        Ok(report) => {
            println!("{}", serde_json::to_string_pretty(&report)?);

            if report.failures.is_empty() {
                tracing::info!("✅ sync finished: {}", report.summary());
            } else {
                tracing::warn!(
                    "⚠️ sync finished with {} skipped records: {}",
                    report.failures.len(),
                    report.summary()
                );
                std::process::exit(2);
            }
        }
        Err(e) => {
            tracing::error!("❌ sync aborted: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
