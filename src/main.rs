use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use movie_catalog_server::analysis::{Aggregator, KoreanTokenizer, Summarizer};
use movie_catalog_server::catalog_store::{CatalogStore, SqliteCatalogStore};
use movie_catalog_server::config;
use movie_catalog_server::ingestion::Importer;
use movie_catalog_server::server::{run_server, RequestsLoggingLevel, ServerConfig};

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

#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to the SQLite catalog database. Created if missing.
    #[clap(value_parser = parse_path, default_value = config::DEFAULT_DB_PATH)]
    pub db_path: PathBuf,

    /// Path to the JSON dataset imported when the catalog is empty.
    #[clap(long, value_parser = parse_path, default_value = config::DEFAULT_DATA_PATH)]
    pub data_path: PathBuf,

    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = config::DEFAULT_PORT)]
    pub port: u16,

    /// The address to bind to.
    #[clap(long, default_value = config::DEFAULT_BIND_ADDRESS)]
    pub bind_address: String,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// The maximum age of catalog responses in the client cache, in seconds.
    #[clap(long, default_value_t = config::DEFAULT_CONTENT_CACHE_AGE_SEC)]
    pub content_cache_age_sec: usize,

    /// How many keywords each sentiment summary keeps.
    #[clap(long, default_value_t = movie_catalog_server::analysis::DEFAULT_SUMMARY_SIZE)]
    pub summary_top_n: usize,

    /// Number of read-only database connections.
    #[clap(long, default_value_t = config::DEFAULT_READ_POOL_SIZE)]
    pub read_pool_size: usize,

    /// Serve the database as is, without importing the dataset.
    #[clap(long)]
    pub skip_import: bool,
}

impl From<&CliArgs> for config::CliConfig {
    fn from(args: &CliArgs) -> Self {
        config::CliConfig {
            db_path: args.db_path.clone(),
            data_path: args.data_path.clone(),
            port: args.port,
            bind_address: args.bind_address.clone(),
            logging_level: args.logging_level.clone(),
            content_cache_age_sec: args.content_cache_age_sec,
            summary_top_n: args.summary_top_n,
            read_pool_size: args.read_pool_size,
            skip_import: args.skip_import,
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
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading configuration from {:?}", path);
            Some(config::FileConfig::load(path)?)
        }
        None => None,
    };

    // TOML overrides CLI
    let cli_config: config::CliConfig = (&cli_args).into();
    let app_config = config::AppConfig::resolve(&cli_config, file_config)?;

    info!("Configuration loaded:");
    info!("  db_path: {:?}", app_config.db_path);
    info!("  data_path: {:?}", app_config.data_path);
    info!("  listen: {}:{}", app_config.bind_address, app_config.port);

    if !app_config.db_path.exists() {
        info!("Creating new catalog database at {:?}", app_config.db_path);
    }
    let catalog_store = Arc::new(SqliteCatalogStore::new(
        &app_config.db_path,
        app_config.read_pool_size,
    )?);

    if app_config.skip_import {
        info!(
            "Import disabled, serving {} movies",
            catalog_store.get_movies_count()?
        );
    } else {
        let tokenizer = KoreanTokenizer::with_max_text_chars(app_config.analysis.max_review_chars);
        let importer = Importer::new(Aggregator::new(
            Summarizer::new(tokenizer),
            app_config.analysis.summary_top_n,
        ));
        importer.import_if_empty(&app_config.data_path, catalog_store.as_ref())?;
    }

    let server_config = ServerConfig {
        requests_logging_level: app_config.logging_level,
        bind_address: app_config.bind_address,
        port: app_config.port,
        content_cache_age_sec: app_config.content_cache_age_sec,
    };
    run_server(server_config, catalog_store).await
}
