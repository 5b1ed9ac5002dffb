//! Main entry point for the tunecart binary
//!
//! Wires the real services together: loads the item list, launches the
//! Chromium-backed automation engine, runs the pricing pipeline, and writes
//! whichever report outputs were requested.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::signal;
use tracing_subscriber::EnvFilter;

use tunecart::services::{self, ChromiumEngine};
use tunecart::{
    AutomationEngine, MusicItem, PipelineConfig, PipelineError, PipelineResult, PricingPipeline,
    PricingReport, SelectorConfig,
};

/// Storefront price discovery and purchase optimization for music lists
#[derive(Parser)]
#[command(name = "tunecart")]
#[command(about = "Discovers digital track prices and computes a savings-maximizing purchase plan")]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Price every item in a CSV list and write the optimization report
    Analyze {
        /// CSV item list: artist,song,album (album optional, header optional)
        #[arg(short, long)]
        input: PathBuf,

        /// Number of parallel browsing sessions
        #[arg(long, default_value_t = 3)]
        concurrency: usize,

        /// Seconds to pause between chunks
        #[arg(long, default_value_t = 3)]
        chunk_delay: u64,

        /// Re-runs for items that finish without a price
        #[arg(long, default_value_t = 0)]
        retries: u32,

        /// Seconds before one item's extraction is abandoned
        #[arg(long, default_value_t = 90)]
        item_timeout: u64,

        /// Run the browser with a visible window
        #[arg(long)]
        visible: bool,

        /// Process one item at a time with a delay after each
        #[arg(long)]
        sequential: bool,

        /// Report observations in completion order instead of input order
        #[arg(long)]
        completion_order: bool,

        /// JSON file overriding the built-in selector cascades
        #[arg(long)]
        selectors: Option<PathBuf>,

        /// Write the full report as JSON
        #[arg(short = 'o', long)]
        output_json: Option<PathBuf>,

        /// Write the per-track report as CSV
        #[arg(short = 'c', long)]
        output_csv: Option<PathBuf>,
    },

    /// Price a single item and print the observation as JSON
    Price {
        /// Item spec: "Artist - Song" or "Artist - Song - Album"
        spec: String,

        /// Run the browser with a visible window
        #[arg(long)]
        visible: bool,
    },
}

#[tokio::main]
async fn main() -> PipelineResult<()> {
    let cli = Cli::parse();

    // .env values fill in anything the environment does not already set
    let _ = dotenv::dotenv();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Command::Analyze {
            input,
            concurrency,
            chunk_delay,
            retries,
            item_timeout,
            visible,
            sequential,
            completion_order,
            selectors,
            output_json,
            output_csv,
        } => {
            let mut config = PipelineConfig {
                concurrency,
                chunk_delay: Duration::from_secs(chunk_delay),
                max_retries: retries,
                item_timeout: Duration::from_secs(item_timeout),
                headless: !visible,
                sequential,
                restore_input_order: !completion_order,
                ..Default::default()
            };
            if let Some(path) = selectors {
                config.selectors = SelectorConfig::from_file(path)?;
            }
            apply_env_overrides(&mut config);

            let items = services::load_items(&input)?;
            tracing::info!(items = items.len(), input = %input.display(), "loaded item list");

            let report = run_pipeline(config, &items).await?;

            if let Some(path) = output_json {
                services::write_json(&report, path).await?;
            }
            if let Some(path) = output_csv {
                services::write_csv(&report, path).await?;
            }
            services::print_summary(&report);
        }

        Command::Price { spec, visible } => {
            let item = services::parse_item_spec(&spec)?;
            let mut config = PipelineConfig {
                sequential: true,
                headless: !visible,
                ..Default::default()
            };
            apply_env_overrides(&mut config);

            let report = run_pipeline(config, std::slice::from_ref(&item)).await?;
            let observation = report
                .tracks
                .first()
                .ok_or_else(|| PipelineError::fault("pipeline returned no observation"))?;
            println!("{}", serde_json::to_string_pretty(observation)?);
        }
    }

    Ok(())
}

/// Launch the engine, run the pipeline, and keep ctrl-c from leaking the
/// browser process.
async fn run_pipeline(
    config: PipelineConfig,
    items: &[MusicItem],
) -> PipelineResult<PricingReport> {
    let engine = Arc::new(
        ChromiumEngine::launch(&config.storefront, config.headless, config.lookup_timeout).await?,
    );
    let pipeline = PricingPipeline::new(Arc::clone(&engine), config);

    tokio::select! {
        result = pipeline.run(items) => result,
        _ = signal::ctrl_c() => {
            tracing::warn!("interrupted; shutting down browser");
            let _ = engine.shutdown().await;
            Err(PipelineError::fault("run interrupted by user"))
        }
    }
}

/// Environment variables override the built-in storefront settings, the same
/// precedence the config file loader of the purchase tool uses.
fn apply_env_overrides(config: &mut PipelineConfig) {
    if let Ok(base_url) = std::env::var("TUNECART_BASE_URL") {
        config.storefront.base_url = base_url.trim_end_matches('/').to_string();
    }
    if let Ok(user_agent) = std::env::var("TUNECART_USER_AGENT") {
        config.storefront.user_agent = user_agent;
    }
}
