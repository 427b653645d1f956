//! Dataset ingestion: JSON loading, review validation and catalog import.

mod importer;
mod models;

pub use importer::{
    load_dataset, prepare_movies, ImportReport, Importer, IngestionError, PreparedMovie,
    REVIEW_SENTIMENT_FIELD, REVIEW_TEXT_FIELD,
};
pub use models::{RawMovie, RawReview};
