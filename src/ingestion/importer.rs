//! Batch import of a movie dataset into the catalog.
//!
//! The whole file is parsed and validated before anything is written, reviews
//! are aggregated in parallel (movies share no state), then each movie is
//! inserted in its own transaction.

use super::models::{RawMovie, RawReview};
use crate::analysis::{Aggregator, Review, Tokenizer};
use crate::catalog_store::{CatalogStore, NewMovie, Sentiment};
use rayon::prelude::*;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum IngestionError {
    #[error("Failed to read dataset {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Dataset {path:?} is not a JSON array of movies: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Movie #{index} in {path:?} is malformed: {source}")]
    InvalidMovie {
        path: PathBuf,
        index: usize,
        source: serde_json::Error,
    },

    #[error("Review #{review_index} of movie '{movie}' in {path:?} is missing field '{field}'")]
    MissingReviewField {
        path: PathBuf,
        movie: String,
        review_index: usize,
        field: &'static str,
    },

    #[error(
        "Review #{review_index} of movie '{movie}' in {path:?} has a malformed field '{field}': expected a string, got {found}"
    )]
    MalformedReviewField {
        path: PathBuf,
        movie: String,
        review_index: usize,
        field: &'static str,
        found: String,
    },

    #[error("Failed to store movie '{movie}': {reason:#}")]
    Store { movie: String, reason: anyhow::Error },
}

pub const REVIEW_TEXT_FIELD: &str = "리뷰내용";
pub const REVIEW_SENTIMENT_FIELD: &str = "감정";

/// A dataset entry ready for aggregation.
#[derive(Clone, Debug)]
pub struct PreparedMovie {
    pub movie: NewMovie,
    pub reviews: Vec<Review>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub movies_imported: usize,
    pub reviews_processed: usize,
    /// True when the catalog already had movies and nothing was imported.
    pub skipped: bool,
}

/// Reads the dataset at `path`, checking every movie record.
pub fn load_dataset(path: &Path) -> Result<Vec<RawMovie>, IngestionError> {
    let content = std::fs::read_to_string(path).map_err(|source| IngestionError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let entries: Vec<serde_json::Value> =
        serde_json::from_str(&content).map_err(|source| IngestionError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            serde_json::from_value(entry).map_err(|source| IngestionError::InvalidMovie {
                path: path.to_path_buf(),
                index,
                source,
            })
        })
        .collect()
}

fn prepare_review(
    path: &Path,
    movie: &RawMovie,
    review_index: usize,
    review: &RawReview,
) -> Result<Review, IngestionError> {
    let string_field = |value: &Option<Value>, field: &'static str| match value {
        None | Some(Value::Null) => Err(IngestionError::MissingReviewField {
            path: path.to_path_buf(),
            movie: movie.title.clone(),
            review_index,
            field,
        }),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(IngestionError::MalformedReviewField {
            path: path.to_path_buf(),
            movie: movie.title.clone(),
            review_index,
            field,
            found: other.to_string(),
        }),
    };
    let text = string_field(&review.text, REVIEW_TEXT_FIELD)?;
    let label = string_field(&review.sentiment, REVIEW_SENTIMENT_FIELD)?;
    Ok(Review::new(text, Sentiment::from_label(&label)))
}

/// Converts raw records, failing on the first review whose text or label is
/// missing or not a string.
pub fn prepare_movies(
    path: &Path,
    raw_movies: &[RawMovie],
) -> Result<Vec<PreparedMovie>, IngestionError> {
    raw_movies
        .iter()
        .map(|raw| {
            let reviews = raw
                .reviews
                .iter()
                .enumerate()
                .map(|(index, review)| prepare_review(path, raw, index, review))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(PreparedMovie {
                movie: raw.to_new_movie(),
                reviews,
            })
        })
        .collect()
}

pub struct Importer<T: Tokenizer> {
    aggregator: Aggregator<T>,
}

impl<T: Tokenizer> Importer<T> {
    pub fn new(aggregator: Aggregator<T>) -> Self {
        Self { aggregator }
    }

    /// Imports every movie of the dataset at `path` into `store`.
    ///
    /// Validation and aggregation finish before the first insert, so a bad
    /// record never leaves a partial catalog. A store failure on one movie
    /// keeps the movies committed before it.
    pub fn import_file(
        &self,
        path: &Path,
        store: &dyn CatalogStore,
    ) -> Result<ImportReport, IngestionError> {
        let start = Instant::now();
        let raw_movies = load_dataset(path)?;
        let prepared = prepare_movies(path, &raw_movies)?;
        info!(
            "Loaded {} movies from {:?}, summarizing reviews...",
            prepared.len(),
            path
        );

        let breakdowns: Vec<_> = prepared
            .par_iter()
            .map(|entry| self.aggregator.aggregate(&entry.reviews))
            .collect();

        let mut report = ImportReport::default();
        for (entry, breakdown) in prepared.iter().zip(breakdowns) {
            let summaries = breakdown.into_summaries();
            let id = store
                .insert_movie(&entry.movie, &summaries)
                .map_err(|reason| IngestionError::Store {
                    movie: entry.movie.title.clone(),
                    reason,
                })?;
            debug!("Imported movie {} '{}'", id, entry.movie.title);
            report.movies_imported += 1;
            report.reviews_processed += entry.reviews.len();
        }

        info!(
            "Imported {} movies ({} reviews) in {:.2?}",
            report.movies_imported,
            report.reviews_processed,
            start.elapsed()
        );
        Ok(report)
    }

    /// Like [`Importer::import_file`], but leaves a catalog that already has
    /// movies untouched.
    pub fn import_if_empty(
        &self,
        path: &Path,
        store: &dyn CatalogStore,
    ) -> Result<ImportReport, IngestionError> {
        let existing = store
            .get_movies_count()
            .map_err(|reason| IngestionError::Store {
                movie: String::new(),
                reason,
            })?;
        if existing > 0 {
            info!(
                "Catalog already contains {} movies, skipping import of {:?}",
                existing, path
            );
            return Ok(ImportReport {
                skipped: true,
                ..Default::default()
            });
        }
        self.import_file(path, store)
    }
}
