//! Catalog Import Tool
//!
//! Reads a JSON movie dataset, summarizes the reviews of every movie by
//! sentiment and writes the result into a SQLite catalog database, without
//! starting the HTTP server.

use anyhow::{bail, Result};
use clap::Parser;
use movie_catalog_server::analysis::{
    Aggregator, KoreanTokenizer, Summarizer, DEFAULT_MAX_TEXT_CHARS, DEFAULT_SUMMARY_SIZE,
};
use movie_catalog_server::catalog_store::{CatalogStore, SqliteCatalogStore};
use movie_catalog_server::ingestion::Importer;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "catalog-import")]
#[command(about = "Import a JSON movie dataset into a SQLite catalog database")]
struct Args {
    /// Path to the dataset file (a JSON array of movies)
    #[arg(value_name = "DATA_PATH")]
    data_path: PathBuf,

    /// Path to the output SQLite database file
    #[arg(value_name = "OUTPUT_DB")]
    output_db: PathBuf,

    /// Number of keywords kept in each sentiment summary
    #[arg(long, default_value_t = DEFAULT_SUMMARY_SIZE)]
    top_n: usize,

    /// Reviews longer than this many characters are left out of the summaries
    #[arg(long, default_value_t = DEFAULT_MAX_TEXT_CHARS)]
    max_review_chars: usize,

    /// Import even if the catalog already contains movies
    #[arg(long, default_value_t = false)]
    force: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    if args.top_n == 0 {
        bail!("--top-n must be at least 1");
    }
    if args.max_review_chars == 0 {
        bail!("--max-review-chars must be at least 1");
    }

    info!("Catalog Import Tool");
    info!("===================");
    info!("Dataset: {}", args.data_path.display());
    info!("Output database: {}", args.output_db.display());

    if args.output_db.exists() {
        warn!(
            "Output database already exists: {}",
            args.output_db.display()
        );
    }

    let store = SqliteCatalogStore::new(&args.output_db, 1)?;
    let importer = Importer::new(Aggregator::new(
        Summarizer::new(KoreanTokenizer::with_max_text_chars(args.max_review_chars)),
        args.top_n,
    ));

    let report = if args.force {
        importer.import_file(&args.data_path, &store)?
    } else {
        importer.import_if_empty(&args.data_path, &store)?
    };

    info!("");
    info!("Import Summary");
    info!("==============");
    if report.skipped {
        warn!("Catalog was not empty, nothing imported (use --force to import anyway)");
    } else {
        info!("Movies imported: {}", report.movies_imported);
        info!("Reviews processed: {}", report.reviews_processed);
    }

    info!("");
    info!("Database contains {} movies", store.get_movies_count()?);

    Ok(())
}
