use clap::Parser;
use review_etl::utils::{logger, validation::Validate};
use review_etl::{CliConfig, EtlEngine, HttpReviewSource, LocalStorage, ReviewPipeline};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting review-etl CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        // Failures are reported, never escalated to a non-zero exit.
        return Ok(());
    }

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let source = HttpReviewSource::new(config.feed_endpoint.clone());
    let storage = LocalStorage::new(config.output_path.clone());
    let pipeline = ReviewPipeline::new(source, storage, config);

    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(summary) => {
            tracing::info!("✅ Review export completed");
            println!(
                "✅ Review export completed: {} rows x {} columns",
                summary.rows, summary.columns
            );
            if !summary.persist.any_written() {
                println!("❌ No output file could be written, see messages above");
            }
        }
        Err(e) => {
            tracing::error!("❌ Review export failed: {}", e);
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
        }
    }

    Ok(())
}
