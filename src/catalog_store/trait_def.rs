//! CatalogStore trait definition.

use super::models::{MovieDetails, MovieListItem, NewMovie, SentimentSummary};
use anyhow::Result;

/// Trait for catalog storage backends.
///
/// Handlers only see `Arc<dyn CatalogStore>`, so tests can swap in their own
/// implementation without a database.
pub trait CatalogStore: Send + Sync {
    // =========================================================================
    // Reads
    // =========================================================================

    /// All movies, ordered by id.
    fn list_movies(&self) -> Result<Vec<MovieListItem>>;

    /// A movie with its sentiment summaries, `None` if the id is unknown.
    fn get_movie(&self, id: i64) -> Result<Option<MovieDetails>>;

    fn get_movies_count(&self) -> Result<usize>;

    // =========================================================================
    // Writes
    // =========================================================================

    /// Inserts a movie and its summaries atomically, returning the new id.
    fn insert_movie(&self, movie: &NewMovie, summaries: &[SentimentSummary]) -> Result<i64>;
}
