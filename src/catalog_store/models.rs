//! Catalog models shared by the store, the ingestion pipeline and the HTTP layer.

use serde::{Deserialize, Serialize};

/// Value stored for movie attributes the dataset does not provide.
pub const NOT_AVAILABLE: &str = "없음";

// =============================================================================
// Sentiment
// =============================================================================

/// Sentiment class of a review.
///
/// The dataset only uses `긍정` and `부정`; any other label is carried through
/// verbatim so that new classes get their own summary instead of failing.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Sentiment {
    Positive,
    Negative,
    Other(String),
}

impl Sentiment {
    pub const POSITIVE_LABEL: &'static str = "긍정";
    pub const NEGATIVE_LABEL: &'static str = "부정";

    pub fn from_label(label: &str) -> Self {
        match label {
            Self::POSITIVE_LABEL => Sentiment::Positive,
            Self::NEGATIVE_LABEL => Sentiment::Negative,
            other => Sentiment::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Sentiment::Positive => Self::POSITIVE_LABEL,
            Sentiment::Negative => Self::NEGATIVE_LABEL,
            Sentiment::Other(label) => label,
        }
    }
}

impl From<String> for Sentiment {
    fn from(label: String) -> Self {
        Sentiment::from_label(&label)
    }
}

impl From<Sentiment> for String {
    fn from(sentiment: Sentiment) -> Self {
        sentiment.label().to_string()
    }
}

/// Keyword summary and share of one sentiment class for a movie.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SentimentSummary {
    pub classification: Sentiment,
    /// Fraction of the movie's reviews in this class, in [0, 1].
    pub ratio: f64,
    /// Most frequent words joined by ", ". Empty when the class has no reviews.
    pub summary: String,
}

// =============================================================================
// Movies
// =============================================================================

/// Movie metadata as ingested, before it gets an id.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NewMovie {
    pub title: String,
    pub poster_url: String,
    pub running_time: Option<String>,
    pub release_date: Option<String>,
    pub synopsis: Option<String>,
    pub genre: Option<String>,
    pub rating: Option<String>,
    pub audience: Option<i64>,
}

/// Entry of the movie listing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MovieListItem {
    pub id: i64,
    pub title: String,
    pub poster_url: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub poster_url: String,
    pub age_limit: String,
    pub running_time: Option<String>,
    pub release_date: Option<String>,
    pub synopsis: Option<String>,
    pub recommended_movies: String,
    pub genre: Option<String>,
    pub rating: Option<String>,
    pub audience: Option<i64>,
}

/// A movie together with its per-sentiment summaries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MovieDetails {
    pub movie: Movie,
    pub reviews: Vec<SentimentSummary>,
}
