mod file_config;

pub use file_config::{AnalysisConfig, FileConfig};

use crate::analysis::{DEFAULT_MAX_TEXT_CHARS, DEFAULT_SUMMARY_SIZE};
use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use std::net::IpAddr;
use std::path::PathBuf;

pub const DEFAULT_DB_PATH: &str = "movie_database.db";
pub const DEFAULT_DATA_PATH: &str = "data.json";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_READ_POOL_SIZE: usize = 4;
pub const DEFAULT_CONTENT_CACHE_AGE_SEC: usize = 3600;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub db_path: PathBuf,
    pub data_path: PathBuf,
    pub port: u16,
    pub bind_address: String,
    pub logging_level: RequestsLoggingLevel,
    pub content_cache_age_sec: usize,
    pub summary_top_n: usize,
    pub read_pool_size: usize,
    pub skip_import: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            port: DEFAULT_PORT,
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            logging_level: RequestsLoggingLevel::default(),
            content_cache_age_sec: DEFAULT_CONTENT_CACHE_AGE_SEC,
            summary_top_n: DEFAULT_SUMMARY_SIZE,
            read_pool_size: DEFAULT_READ_POOL_SIZE,
            skip_import: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub data_path: PathBuf,
    pub port: u16,
    pub bind_address: IpAddr,
    pub logging_level: RequestsLoggingLevel,
    pub content_cache_age_sec: usize,
    pub read_pool_size: usize,
    pub skip_import: bool,

    pub analysis: AnalysisSettings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisSettings {
    pub summary_top_n: usize,
    pub max_review_chars: usize,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            summary_top_n: DEFAULT_SUMMARY_SIZE,
            max_review_chars: DEFAULT_MAX_TEXT_CHARS,
        }
    }
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_path = file
            .db_path
            .map(PathBuf::from)
            .unwrap_or_else(|| cli.db_path.clone());
        if db_path.is_dir() {
            bail!("db_path is a directory: {:?}", db_path);
        }

        let skip_import = file.skip_import.unwrap_or(cli.skip_import);
        let data_path = file
            .data_path
            .map(PathBuf::from)
            .unwrap_or_else(|| cli.data_path.clone());
        if !skip_import && !data_path.is_file() {
            bail!("Dataset file does not exist: {:?}", data_path);
        }

        let port = file.port.unwrap_or(cli.port);

        let bind_address_str = file
            .bind_address
            .unwrap_or_else(|| cli.bind_address.clone());
        let bind_address: IpAddr = bind_address_str
            .parse()
            .with_context(|| format!("Invalid bind_address: {}", bind_address_str))?;

        let logging_level = match file.logging_level {
            Some(s) => match parse_logging_level(&s) {
                Some(level) => level,
                None => bail!("Invalid logging_level: {}", s),
            },
            None => cli.logging_level.clone(),
        };

        let content_cache_age_sec = file
            .content_cache_age_sec
            .unwrap_or(cli.content_cache_age_sec);

        let read_pool_size = file.read_pool_size.unwrap_or(cli.read_pool_size);
        if read_pool_size == 0 {
            bail!("read_pool_size must be at least 1");
        }

        let analysis_file = file.analysis.unwrap_or_default();
        let analysis = AnalysisSettings {
            summary_top_n: analysis_file.summary_top_n.unwrap_or(cli.summary_top_n),
            max_review_chars: analysis_file
                .max_review_chars
                .unwrap_or(DEFAULT_MAX_TEXT_CHARS),
        };
        if analysis.summary_top_n == 0 {
            bail!("summary_top_n must be at least 1");
        }
        if analysis.max_review_chars == 0 {
            bail!("max_review_chars must be at least 1");
        }

        Ok(Self {
            db_path,
            data_path,
            port,
            bind_address,
            logging_level,
            content_cache_age_sec,
            read_pool_size,
            skip_import,
            analysis,
        })
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
