//! Shared constants for end-to-end tests
//!
//! When the fixture dataset changes, update only this file.

// ============================================================================
// Fixture Dataset
// ============================================================================

/// Title of the first movie, which has one positive and one negative review
pub const MOVIE_1_TITLE: &str = "기생충";

/// Poster of the first movie
pub const MOVIE_1_POSTER: &str = "https://posters.example/parasite.jpg";

/// Positive review of the first movie
pub const MOVIE_1_POSITIVE_REVIEW: &str = "연기가 좋았다";

/// Negative review of the first movie
pub const MOVIE_1_NEGATIVE_REVIEW: &str = "결말이 지루했다";

/// Title of the second movie, which has no reviews and no age limit
pub const MOVIE_2_TITLE: &str = "괴물";

/// Poster of the second movie
pub const MOVIE_2_POSTER: &str = "https://posters.example/host.jpg";

/// Title of the third movie, whose reviews are all positive
pub const MOVIE_3_TITLE: &str = "올드보이";

/// Poster of the third movie
pub const MOVIE_3_POSTER: &str = "https://posters.example/oldboy.jpg";

/// Number of movies in the fixture dataset
pub const FIXTURE_MOVIES_COUNT: usize = 3;

/// Id no fixture movie gets
pub const UNKNOWN_MOVIE_ID: i64 = 9999;

// ============================================================================
// Test Timeouts and Configuration
// ============================================================================

/// Maximum time to wait for server to become ready (milliseconds)
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Timeout for individual HTTP requests (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Polling interval when waiting for server ready (milliseconds)
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;

/// Cache age the test server advertises on catalog routes (seconds)
pub const TEST_CONTENT_CACHE_AGE_SEC: usize = 120;
