use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use roster_etl::config;
use roster_etl::enrichment::{create_classifier, EnrichmentProcessor};
use roster_etl::etl::{load_and_process, ValidationOptions};
use roster_etl::member_store::{MemberStore, SqliteMemberStore};

fn parse_path(s: &str) -> Result<PathBuf, String> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(format!("Error resolving path '{}': {}", s, msg));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir().map_err(|e| format!("Failed to get current dir: {}", e))?;
    Ok(cwd.join(original_path))
}

fn parse_dir(s: &str) -> Result<PathBuf, String> {
    let path = parse_path(s)?;
    if !path.exists() {
        return Err(format!("Directory does not exist: {}", s));
    }
    if !path.is_dir() {
        return Err(format!("Path is not a directory: {}", s));
    }
    Ok(path)
}

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to the roster CSV file to ingest.
    #[clap(value_parser = parse_path)]
    pub input: PathBuf,

    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Directory where the roster database (roster.db) lives.
    /// Can also be specified in config file.
    #[clap(long, value_parser = parse_dir)]
    pub db_dir: Option<PathBuf>,

    /// Reject rows whose join date is present but unparseable.
    #[clap(long, default_value_t = false)]
    pub require_date_joined: bool,

    /// Base URL of the classification backend.
    #[clap(long)]
    pub classifier_base_url: Option<String>,

    /// Model to request from the classification backend.
    #[clap(long)]
    pub classifier_model: Option<String>,

    /// API key for the classification backend. When absent, classification
    /// runs offline with canned results.
    #[clap(long)]
    pub classifier_api_key: Option<String>,

    /// Timeout in seconds for classification requests.
    #[clap(long)]
    pub classifier_timeout_secs: Option<u64>,
}

/// Convert CLI args to CliConfig for config resolution
impl From<&CliArgs> for config::CliConfig {
    fn from(args: &CliArgs) -> Self {
        config::CliConfig {
            db_dir: args.db_dir.clone(),
            require_date_joined: args.require_date_joined,
            classifier_base_url: args.classifier_base_url.clone(),
            classifier_model: args.classifier_model.clone(),
            classifier_api_key: args.classifier_api_key.clone(),
            classifier_timeout_secs: args.classifier_timeout_secs,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    // Load TOML config if provided
    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Some(config::FileConfig::load(path)?)
        }
        None => None,
    };

    // Resolve final configuration (TOML overrides CLI)
    let cli_config: config::CliConfig = (&cli_args).into();
    let app_config = config::AppConfig::resolve(&cli_config, file_config)?;

    info!("Configuration loaded:");
    info!("  db_dir: {:?}", app_config.db_dir);
    info!("  input: {:?}", cli_args.input);

    // Extract and validate
    let options = ValidationOptions {
        require_date_joined: app_config.require_date_joined,
    };
    let outcome = load_and_process(&cli_args.input, options);

    // Row index 0 marks a file-level failure (missing or unreadable input,
    // broken header row); those abort the run.
    if let Some(file_error) = outcome.errors.iter().find(|e| e.row_index == 0) {
        bail!(
            "Failed to read input {:?}: {}",
            cli_args.input,
            file_error.reason
        );
    }

    info!(
        "Extracted {} valid row(s), {} rejected row(s) from {:?}",
        outcome.valid.len(),
        outcome.errors.len(),
        cli_args.input
    );
    for error in &outcome.errors {
        warn!(
            "Rejected row {}: {} (name: {:?}, email: {:?})",
            error.row_index, error.reason, error.raw_name, error.raw_email
        );
    }

    if outcome.valid.is_empty() {
        info!("No valid rows to process, exiting");
        return Ok(());
    }

    // Enrich via the configured classifier
    let classifier = create_classifier(&app_config.classifier);
    info!("Classifier backend: {}", classifier.name());
    let processor = EnrichmentProcessor::new(classifier);

    let enriched = processor.process_batch(outcome.valid).await;
    let enriched_count = enriched.iter().filter(|r| r.enriched).count();
    let failed_count = enriched.iter().filter(|r| r.error.is_some()).count();
    info!(
        "Enriched {} of {} record(s) ({} classification failure(s))",
        enriched_count,
        enriched.len(),
        failed_count
    );

    // Persist. Storage failures abort the run; enrichment failures above
    // only degrade records to their fallback state.
    let db_path = app_config.roster_db_path();
    if !db_path.exists() {
        info!("Creating new roster database at {:?}", db_path);
    }
    let store = SqliteMemberStore::new(&db_path)?;

    let merge_stats = store.merge_batch(&enriched)?;
    info!(
        "Merge complete: {} member(s) created, {} updated, {} new skill(s)",
        merge_stats.members_created, merge_stats.members_updated, merge_stats.skills_created
    );

    let store_stats = store.get_stats()?;
    info!(
        "Roster database now holds {} member(s) and {} skill(s)",
        store_stats.members, store_stats.skills
    );

    Ok(())
}
