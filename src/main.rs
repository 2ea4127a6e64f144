use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use epg_aggregator::{
    aggregator::{AggregationOutcome, Aggregator, SourceStatus},
    channels::{ChannelMatcher, NameNormalizer},
    config::{defaults::DEFAULT_LOG_LEVEL, Config, ConfigOrigin},
    output::{write_artifact, XmltvGenerator},
    sources::{SourceContext, SourceFactory},
    utils::time::{parse_guide_date, today_in},
};

#[derive(Parser)]
#[command(name = "epg-aggregator")]
#[command(version)]
#[command(about = "Aggregates TV program guides from several sources into one XMLTV file")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Guide date as YYYYMMDD (defaults to today in the configured timezone)
    #[arg(short, long, value_name = "YYYYMMDD")]
    date: Option<String>,

    /// Output directory (overrides config file)
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Sources to consult in order, comma separated (overrides config file)
    #[arg(short, long, value_delimiter = ',', value_name = "NAMES")]
    sources: Option<Vec<String>>,

    /// Log level (overrides config file)
    #[arg(short = 'v', long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // The config file can set the log level
    std::env::set_var("CONFIG_FILE", &cli.config);
    let loaded = Config::load();

    let log_level = cli
        .log_level
        .clone()
        .or_else(|| loaded.as_ref().ok().map(|(c, _)| c.logging.level.clone()))
        .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("epg_aggregator={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting EPG Aggregator v{}", env!("CARGO_PKG_VERSION"));
    let (mut config, origin) =
        loaded.with_context(|| format!("failed to load configuration from {}", cli.config))?;
    match origin {
        ConfigOrigin::File(path) => info!("Configuration loaded from: {}", path.display()),
        ConfigOrigin::Defaults(path) => warn!(
            "Config file {} not found, using built-in defaults",
            path.display()
        ),
    }

    if let Some(dir) = cli.output_dir {
        config.output.dir = dir;
    }

    let tz = config.tz()?;
    let date = match cli.date.as_deref() {
        Some(value) => parse_guide_date(value).map_err(anyhow::Error::msg)?,
        None => today_in(tz),
    };
    let source_names = cli.sources.unwrap_or_else(|| config.enabled_sources());
    info!(
        "Building guide for {} ({}) from sources: {}",
        date,
        tz,
        source_names.join(", ")
    );

    let catalog = Arc::new(config.catalog()?);
    let normalizer = NameNormalizer::new(config.alias_table());
    let matcher = ChannelMatcher::new(
        catalog.clone(),
        normalizer.clone(),
        config.matching_options(),
    );

    let context = SourceContext {
        http: config.http.clone(),
        endpoints: config.endpoints.clone(),
        normalizer: normalizer.clone(),
        date,
        tz,
    };
    let sources = SourceFactory::create_sources(&source_names, &context)?;

    let mut aggregator = Aggregator::new(matcher, config.success_threshold);
    let outcome = aggregator.run(&sources).await;
    log_summary(&outcome);

    let generator = XmltvGenerator::new(
        date,
        tz,
        config.output.generator_name.clone(),
        config.output.generator_url.clone(),
    );
    let xml = generator.generate(outcome.state.results())?;
    let written = write_artifact(&xml, &config.output)?;

    info!(
        "Guide written to {} ({} of {} channels filled, {:.2}%)",
        written.gzip_path.display(),
        outcome.state.filled_count(),
        catalog.len(),
        outcome.success_rate
    );

    Ok(())
}

fn log_summary(outcome: &AggregationOutcome) {
    info!(
        "Aggregation stopped ({:?}) at {:.2}% with {} programs",
        outcome.stop_reason,
        outcome.success_rate,
        outcome.state.total_programs()
    );

    for report in &outcome.reports {
        match &report.status {
            SourceStatus::Completed => info!(
                "  {}: {} returned, {} matched, {} unmatched, {} skipped, {} programs dropped -> {:.2}%",
                report.source,
                report.channels_returned,
                report.channels_matched,
                report.channels_unmatched,
                report.channels_skipped,
                report.programs_dropped,
                report.success_rate_after
            ),
            SourceStatus::Failed(reason) => warn!("  {}: failed ({})", report.source, reason),
        }
    }

    for result in outcome.state.iter() {
        if result.has_programs() {
            debug!("  {} {}: {} programs", result.channel_id, result.name, result.programs.len());
        } else {
            warn!("  {} {}: no programs", result.channel_id, result.name);
        }
    }
}
