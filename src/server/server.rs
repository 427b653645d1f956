use anyhow::{Context, Result};
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;

use tracing::{error, info};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use super::{http_cache, log_requests, state::*, ServerConfig};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub hash: String,
    pub movies_count: usize,
}

#[derive(Serialize)]
struct ErrorDetail {
    detail: &'static str,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

fn internal_error(context: &str, err: anyhow::Error) -> Response {
    error!("{}: {:#}", context, err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorDetail {
            detail: "Internal server error",
        }),
    )
        .into_response()
}

async fn home(State(state): State<ServerState>) -> Response {
    match state.catalog_store.get_movies_count() {
        Ok(movies_count) => Json(ServerStats {
            uptime: format_uptime(state.start_time.elapsed()),
            hash: state.hash.clone(),
            movies_count,
        })
        .into_response(),
        Err(err) => internal_error("Failed to count movies", err),
    }
}

async fn list_movies(State(catalog_store): State<GuardedCatalogStore>) -> Response {
    match catalog_store.list_movies() {
        Ok(movies) => Json(movies).into_response(),
        Err(err) => internal_error("Failed to list movies", err),
    }
}

async fn get_movie(
    State(catalog_store): State<GuardedCatalogStore>,
    Path(id): Path<i64>,
) -> Response {
    match catalog_store.get_movie(id) {
        Ok(Some(details)) => Json(details).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorDetail {
                detail: "Movie not found",
            }),
        )
            .into_response(),
        Err(err) => internal_error(&format!("Failed to load movie {}", id), err),
    }
}

pub fn make_app(config: ServerConfig, catalog_store: GuardedCatalogStore) -> Router {
    let state = ServerState::new(config.clone(), catalog_store);

    let catalog_routes: Router = Router::new()
        .route("/movies", get(list_movies))
        .route("/movie/{id}", get(get_movie))
        .layer(middleware::from_fn_with_state(
            config.content_cache_age_sec,
            http_cache,
        ))
        .with_state(state.clone());

    let home_router: Router = Router::new()
        .route("/", get(home))
        .with_state(state.clone());

    home_router
        .merge(catalog_routes)
        .layer(middleware::from_fn_with_state(state, log_requests))
}

/// Resolves on Ctrl-C. If the handler cannot be installed the server keeps
/// running until killed.
async fn ctrl_c() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {}", err);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested, draining connections...");
}

/// Serves the catalog until `shutdown` resolves.
pub async fn serve_until<F>(
    config: ServerConfig,
    catalog_store: GuardedCatalogStore,
    listener: tokio::net::TcpListener,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = make_app(config, catalog_store);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server failed")
}

pub async fn run_server(config: ServerConfig, catalog_store: GuardedCatalogStore) -> Result<()> {
    let address = SocketAddr::new(config.bind_address, config.port);
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!("Serving movie catalog on http://{}", address);

    serve_until(config, catalog_store, listener, ctrl_c()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog_store::{
        CatalogStore, Movie, MovieDetails, MovieListItem, NewMovie, Sentiment, SentimentSummary,
        NOT_AVAILABLE,
    };
    use crate::server::RequestsLoggingLevel;
    use axum::{body::Body, http::Request};
    use std::sync::Arc;
    use tower::ServiceExt; // for `oneshot`

    /// Serves one fixed movie; `fail` turns every call into an error.
    struct FixedCatalogStore {
        fail: bool,
    }

    fn fixed_movie() -> MovieDetails {
        MovieDetails {
            movie: Movie {
                id: 7,
                title: "괴물".to_string(),
                poster_url: "https://posters.example/host.jpg".to_string(),
                age_limit: NOT_AVAILABLE.to_string(),
                running_time: Some("119분".to_string()),
                release_date: Some("2006".to_string()),
                synopsis: None,
                recommended_movies: NOT_AVAILABLE.to_string(),
                genre: Some("SF".to_string()),
                rating: Some("8.6".to_string()),
                audience: Some(13_000_000),
            },
            reviews: vec![
                SentimentSummary {
                    classification: Sentiment::Positive,
                    ratio: 1.0,
                    summary: "영화, 좋다".to_string(),
                },
                SentimentSummary {
                    classification: Sentiment::Negative,
                    ratio: 0.0,
                    summary: String::new(),
                },
            ],
        }
    }

    impl CatalogStore for FixedCatalogStore {
        fn list_movies(&self) -> Result<Vec<MovieListItem>> {
            if self.fail {
                anyhow::bail!("disk on fire");
            }
            let movie = fixed_movie().movie;
            Ok(vec![MovieListItem {
                id: movie.id,
                title: movie.title,
                poster_url: movie.poster_url,
            }])
        }

        fn get_movie(&self, id: i64) -> Result<Option<MovieDetails>> {
            if self.fail {
                anyhow::bail!("disk on fire");
            }
            Ok(Some(fixed_movie()).filter(|m| m.movie.id == id))
        }

        fn get_movies_count(&self) -> Result<usize> {
            if self.fail {
                anyhow::bail!("disk on fire");
            }
            Ok(1)
        }

        fn insert_movie(&self, _movie: &NewMovie, _summaries: &[SentimentSummary]) -> Result<i64> {
            anyhow::bail!("read only")
        }
    }

    fn app(fail: bool) -> Router {
        let config = ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Body,
            content_cache_age_sec: 60,
            ..Default::default()
        };
        make_app(config, Arc::new(FixedCatalogStore { fail }))
    }

    async fn fetch(app: Router, uri: &str) -> (StatusCode, Option<String>, serde_json::Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let cache_control = response
            .headers()
            .get("cache-control")
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
        };
        (status, cache_control, body)
    }

    #[test]
    fn formats_uptime() {
        assert_eq!(format_uptime(Duration::from_secs(0)), "0d 00:00:00");
        assert_eq!(format_uptime(Duration::from_secs(90_061)), "1d 01:01:01");
    }

    #[tokio::test]
    async fn lists_movies() {
        let (status, cache_control, body) = fetch(app(false), "/movies").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cache_control.as_deref(), Some("max-age=60"));
        assert_eq!(
            body,
            serde_json::json!([{
                "id": 7,
                "title": "괴물",
                "poster_url": "https://posters.example/host.jpg"
            }])
        );
    }

    #[tokio::test]
    async fn returns_movie_details() {
        let (status, _, body) = fetch(app(false), "/movie/7").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["movie"]["title"], "괴물");
        assert_eq!(body["movie"]["age_limit"], NOT_AVAILABLE);
        assert_eq!(body["reviews"][0]["classification"], "긍정");
        assert_eq!(body["reviews"][0]["ratio"], 1.0);
        assert_eq!(body["reviews"][1]["summary"], "");
    }

    #[tokio::test]
    async fn unknown_movie_is_not_found() {
        let (status, cache_control, body) = fetch(app(false), "/movie/8").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(cache_control, None);
        assert_eq!(body, serde_json::json!({"detail": "Movie not found"}));
    }

    #[tokio::test]
    async fn non_numeric_id_is_rejected() {
        let (status, _, _) = fetch(app(false), "/movie/abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn store_failure_is_internal_error() {
        for uri in ["/", "/movies", "/movie/7"] {
            let (status, cache_control, body) = fetch(app(true), uri).await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{}", uri);
            assert_eq!(cache_control, None, "{}", uri);
            assert_eq!(body["detail"], "Internal server error");
        }
    }

    #[tokio::test]
    async fn home_reports_stats_without_caching() {
        let (status, cache_control, body) = fetch(app(false), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cache_control, None);
        assert_eq!(body["movies_count"], 1);
        assert_eq!(body["hash"], env!("GIT_HASH"));
    }
}
