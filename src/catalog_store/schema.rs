//! SQLite schema of the movie catalog.
//!
//! Each movie owns one summary row per sentiment class; summaries are deleted
//! with their movie.

use crate::sqlite_column;
use crate::sqlite_persistence::{
    Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema,
};

/// Movies table - catalog metadata
const MOVIES_TABLE: Table = Table {
    name: "movies",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("poster_url", &SqlType::Text, non_null = true),
        sqlite_column!(
            "age_limit",
            &SqlType::Text,
            non_null = true,
            default_value = Some("'없음'")
        ),
        sqlite_column!("running_time", &SqlType::Text),
        sqlite_column!("release_date", &SqlType::Text),
        sqlite_column!("synopsis", &SqlType::Text),
        sqlite_column!(
            "recommended_movies",
            &SqlType::Text,
            non_null = true,
            default_value = Some("'없음'")
        ),
        sqlite_column!("genre", &SqlType::Text),
        sqlite_column!("rating", &SqlType::Text),
        sqlite_column!("audience", &SqlType::Integer),
    ],
    indices: &[("idx_movies_title", "title")],
};

const MOVIE_FK: ForeignKey = ForeignKey {
    foreign_table: "movies",
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::Cascade,
};

/// Sentiment summaries table - one row per (movie, sentiment class)
const SENTIMENT_SUMMARIES_TABLE: Table = Table {
    name: "sentiment_summaries",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "movie_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&MOVIE_FK)
        ),
        sqlite_column!("classification", &SqlType::Text, non_null = true),
        sqlite_column!("ratio", &SqlType::Real, non_null = true),
        sqlite_column!("summary", &SqlType::Text, non_null = true),
    ],
    indices: &[("idx_sentiment_summaries_movie", "movie_id")],
};

pub const CATALOG_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 0,
    tables: &[MOVIES_TABLE, SENTIMENT_SUMMARIES_TABLE],
    migration: None,
}];
