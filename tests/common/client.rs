//! HTTP client for end-to-end tests
//!
//! This module wraps reqwest and provides one method per catalog endpoint.
//!
//! When API routes change, update only this file.

use super::constants::*;
use reqwest::Response;
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    /// GET an arbitrary path, for routes without a dedicated helper
    pub async fn get(&self, path: &str) -> Response {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .expect("Request failed")
    }

    /// GET /
    pub async fn home(&self) -> Response {
        self.get("/").await
    }

    /// GET /movies
    pub async fn get_movies(&self) -> Response {
        self.get("/movies").await
    }

    /// GET /movie/{id}
    pub async fn get_movie(&self, id: i64) -> Response {
        self.get(&format!("/movie/{}", id)).await
    }

    /// Finds the id of the movie titled `title` through GET /movies.
    ///
    /// # Panics
    ///
    /// Panics if no listed movie has that title.
    pub async fn movie_id_by_title(&self, title: &str) -> i64 {
        let movies: serde_json::Value = self
            .get_movies()
            .await
            .json()
            .await
            .expect("Invalid movie list");
        movies
            .as_array()
            .expect("Movie list is not an array")
            .iter()
            .find(|m| m["title"] == title)
            .and_then(|m| m["id"].as_i64())
            .unwrap_or_else(|| panic!("Movie '{}' not listed", title))
    }
}
