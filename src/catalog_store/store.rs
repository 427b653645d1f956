//! SQLite-backed catalog store.
//!
//! Writes go through a single connection, reads are spread round-robin over a
//! small pool of read-only connections. Every operation borrows its connection
//! for the duration of one call; the guard releases it on every return path.

use super::models::*;
use super::schema::CATALOG_VERSIONED_SCHEMAS;
use super::trait_def::CatalogStore;
use crate::sqlite_persistence::BASE_DB_VERSION;
use anyhow::{anyhow, bail, Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

#[derive(Clone)]
pub struct SqliteCatalogStore {
    read_pool: Vec<Arc<Mutex<Connection>>>,
    write_conn: Arc<Mutex<Connection>>,
    read_index: Arc<AtomicUsize>,
}

fn migrate_if_needed(conn: &mut Connection) -> Result<()> {
    let db_version: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;

    let latest_version = CATALOG_VERSIONED_SCHEMAS.len() - 1;
    let latest_schema = &CATALOG_VERSIONED_SCHEMAS[latest_version];

    let table_count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
        [],
        |r| r.get(0),
    )?;

    if table_count == 0 {
        info!("Creating catalog db schema at version {}", latest_version);
        latest_schema.create(conn)?;
        return Ok(());
    }

    if db_version < BASE_DB_VERSION as i64 {
        bail!(
            "Database has tables but user_version {} is not a catalog schema version",
            db_version
        );
    }
    let mut current_version = (db_version - BASE_DB_VERSION as i64) as usize;
    if current_version > latest_version {
        bail!(
            "Database schema version {} is newer than supported version {}",
            current_version,
            latest_version
        );
    }

    if current_version < latest_version {
        let tx = conn.transaction()?;
        for schema in CATALOG_VERSIONED_SCHEMAS.iter().skip(current_version + 1) {
            if let Some(migration_fn) = schema.migration {
                info!(
                    "Migrating catalog db from version {} to {}",
                    current_version, schema.version
                );
                migration_fn(&tx)?;
            }
            current_version = schema.version;
        }
        tx.pragma_update(None, "user_version", BASE_DB_VERSION + current_version)?;
        tx.commit()?;
    }

    latest_schema
        .validate(conn)
        .context("Catalog database does not match the expected schema")
}

fn parse_movie_row(row: &rusqlite::Row) -> rusqlite::Result<Movie> {
    Ok(Movie {
        id: row.get(0)?,
        title: row.get(1)?,
        poster_url: row.get(2)?,
        age_limit: row.get(3)?,
        running_time: row.get(4)?,
        release_date: row.get(5)?,
        synopsis: row.get(6)?,
        recommended_movies: row.get(7)?,
        genre: row.get(8)?,
        rating: row.get(9)?,
        audience: row.get(10)?,
    })
}

fn parse_summary_row(row: &rusqlite::Row) -> rusqlite::Result<SentimentSummary> {
    Ok(SentimentSummary {
        classification: Sentiment::from_label(&row.get::<_, String>(0)?),
        ratio: row.get(1)?,
        summary: row.get(2)?,
    })
}

impl SqliteCatalogStore {
    /// Opens (creating if needed) the catalog database at `db_path`.
    ///
    /// An existing database must carry our schema version and pass schema
    /// validation. `read_pool_size` read-only connections are opened for
    /// concurrent queries.
    pub fn new<P: AsRef<Path>>(db_path: P, read_pool_size: usize) -> Result<Self> {
        let db_path_ref = db_path.as_ref();
        if read_pool_size == 0 {
            bail!("read_pool_size must be at least 1");
        }

        let mut write_conn = Connection::open_with_flags(
            db_path_ref,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI
                | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("Failed to open catalog database {:?}", db_path_ref))?;

        migrate_if_needed(&mut write_conn)?;

        write_conn.pragma_update(None, "journal_mode", "WAL")?;
        write_conn.pragma_update(None, "foreign_keys", "ON")?;

        let movie_count: i64 =
            write_conn.query_row("SELECT COUNT(*) FROM movies", [], |r| r.get(0))?;
        info!("Opened movie catalog {:?}: {} movies", db_path_ref, movie_count);

        let mut read_pool = Vec::with_capacity(read_pool_size);
        for _ in 0..read_pool_size {
            let read_conn = Connection::open_with_flags(
                db_path_ref,
                rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY
                    | rusqlite::OpenFlags::SQLITE_OPEN_URI
                    | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )?;
            read_conn.pragma_update(None, "journal_mode", "WAL")?;
            read_pool.push(Arc::new(Mutex::new(read_conn)));
        }

        Ok(SqliteCatalogStore {
            write_conn: Arc::new(Mutex::new(write_conn)),
            read_pool,
            read_index: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Runs `f` with the next pooled read connection held for its whole duration.
    fn with_read_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let index = self.read_index.fetch_add(1, Ordering::SeqCst) % self.read_pool.len();
        let conn = self.read_pool[index]
            .lock()
            .map_err(|_| anyhow!("Catalog read connection mutex poisoned"))?;
        f(&conn)
    }

    fn get_summaries(conn: &Connection, movie_id: i64) -> Result<Vec<SentimentSummary>> {
        let mut stmt = conn.prepare_cached(
            "SELECT classification, ratio, summary FROM sentiment_summaries WHERE movie_id = ?1 ORDER BY id",
        )?;
        let summaries = stmt
            .query_map(params![movie_id], parse_summary_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(summaries)
    }
}

impl CatalogStore for SqliteCatalogStore {
    fn list_movies(&self) -> Result<Vec<MovieListItem>> {
        self.with_read_conn(|conn| {
            let mut stmt =
                conn.prepare_cached("SELECT id, title, poster_url FROM movies ORDER BY id")?;
            let movies = stmt
                .query_map([], |row| {
                    Ok(MovieListItem {
                        id: row.get(0)?,
                        title: row.get(1)?,
                        poster_url: row.get(2)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(movies)
        })
    }

    fn get_movie(&self, id: i64) -> Result<Option<MovieDetails>> {
        self.with_read_conn(|conn| {
            let movie = conn
                .prepare_cached(
                    "SELECT id, title, poster_url, age_limit, running_time, release_date, synopsis, \
                     recommended_movies, genre, rating, audience FROM movies WHERE id = ?1",
                )?
                .query_row(params![id], parse_movie_row)
                .optional()?;
            match movie {
                Some(movie) => {
                    let reviews = Self::get_summaries(conn, movie.id)?;
                    Ok(Some(MovieDetails { movie, reviews }))
                }
                None => Ok(None),
            }
        })
    }

    fn get_movies_count(&self) -> Result<usize> {
        self.with_read_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM movies", [], |r| r.get(0))?;
            Ok(count as usize)
        })
    }

    fn insert_movie(&self, movie: &NewMovie, summaries: &[SentimentSummary]) -> Result<i64> {
        let mut conn = self
            .write_conn
            .lock()
            .map_err(|_| anyhow!("Catalog write connection mutex poisoned"))?;
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO movies (title, poster_url, running_time, release_date, synopsis, genre, rating, audience) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                movie.title,
                movie.poster_url,
                movie.running_time,
                movie.release_date,
                movie.synopsis,
                movie.genre,
                movie.rating,
                movie.audience,
            ],
        )
        .with_context(|| format!("Failed to insert movie '{}'", movie.title))?;
        let movie_id = tx.last_insert_rowid();

        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO sentiment_summaries (movie_id, classification, ratio, summary) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for summary in summaries {
                stmt.execute(params![
                    movie_id,
                    summary.classification.label(),
                    summary.ratio,
                    summary.summary,
                ])?;
            }
        }

        tx.commit()?;
        debug!(
            "Inserted movie {} '{}' with {} summaries",
            movie_id,
            movie.title,
            summaries.len()
        );
        Ok(movie_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn new_store(dir: &TempDir) -> SqliteCatalogStore {
        SqliteCatalogStore::new(dir.path().join("catalog.db"), 2).unwrap()
    }

    fn sample_movie(title: &str) -> NewMovie {
        NewMovie {
            title: title.to_string(),
            poster_url: format!("https://posters.example/{}.jpg", title),
            running_time: Some("120분".to_string()),
            release_date: Some("2023".to_string()),
            synopsis: Some("줄거리".to_string()),
            genre: Some("드라마".to_string()),
            rating: Some("8.5".to_string()),
            audience: Some(1_200_000),
        }
    }

    fn sample_summaries() -> Vec<SentimentSummary> {
        vec![
            SentimentSummary {
                classification: Sentiment::Positive,
                ratio: 0.75,
                summary: "영화, 좋다".to_string(),
            },
            SentimentSummary {
                classification: Sentiment::Negative,
                ratio: 0.25,
                summary: "지루하다".to_string(),
            },
        ]
    }

    #[test]
    fn inserted_movie_reads_back_with_defaults() {
        let dir = TempDir::new().unwrap();
        let store = new_store(&dir);

        let id = store
            .insert_movie(&sample_movie("기생충"), &sample_summaries())
            .unwrap();
        let details = store.get_movie(id).unwrap().unwrap();

        assert_eq!(details.movie.title, "기생충");
        assert_eq!(details.movie.age_limit, NOT_AVAILABLE);
        assert_eq!(details.movie.recommended_movies, NOT_AVAILABLE);
        assert_eq!(details.movie.audience, Some(1_200_000));
        assert_eq!(details.reviews, sample_summaries());
    }

    /// Makes every summary insert whose text matches `pattern` abort.
    fn reject_summaries_like(db_path: &Path, pattern: &str) {
        let conn = Connection::open(db_path).unwrap();
        conn.execute_batch(&format!(
            "CREATE TRIGGER reject_summary BEFORE INSERT ON sentiment_summaries \
             WHEN NEW.summary LIKE '{}' BEGIN SELECT RAISE(ABORT, 'summary rejected'); END;",
            pattern
        ))
        .unwrap();
    }

    #[test]
    fn failed_summary_rolls_back_only_its_movie() {
        let dir = TempDir::new().unwrap();
        let store = new_store(&dir);
        let first = store
            .insert_movie(&sample_movie("A"), &sample_summaries())
            .unwrap();
        reject_summaries_like(&dir.path().join("catalog.db"), "지루%");

        // The positive summary goes in before the negative one aborts
        let err = store
            .insert_movie(&sample_movie("B"), &sample_summaries())
            .unwrap_err();
        assert!(format!("{:#}", err).contains("summary rejected"));

        let movies = store.list_movies().unwrap();
        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].id, first);
        assert_eq!(store.get_movie(first).unwrap().unwrap().reviews.len(), 2);
        let summary_rows: i64 = store
            .with_read_conn(|conn| {
                Ok(conn.query_row("SELECT COUNT(*) FROM sentiment_summaries", [], |r| {
                    r.get(0)
                })?)
            })
            .unwrap();
        assert_eq!(summary_rows, 2);

        // The write connection is usable again after the rollback
        store.insert_movie(&sample_movie("C"), &[]).unwrap();
        assert_eq!(store.get_movies_count().unwrap(), 2);
    }

    #[test]
    fn unknown_movie_is_none() {
        let dir = TempDir::new().unwrap();
        let store = new_store(&dir);
        assert!(store.get_movie(42).unwrap().is_none());
    }

    #[test]
    fn list_is_ordered_by_id() {
        let dir = TempDir::new().unwrap();
        let store = new_store(&dir);
        for title in ["A", "B", "C"] {
            store.insert_movie(&sample_movie(title), &[]).unwrap();
        }

        let movies = store.list_movies().unwrap();
        assert_eq!(
            movies.iter().map(|m| m.title.as_str()).collect::<Vec<_>>(),
            vec!["A", "B", "C"]
        );
        assert!(movies.windows(2).all(|w| w[0].id < w[1].id));
        assert_eq!(store.get_movies_count().unwrap(), 3);
    }

    #[test]
    fn reopening_keeps_data_and_validates_schema() {
        let dir = TempDir::new().unwrap();
        {
            let store = new_store(&dir);
            store.insert_movie(&sample_movie("A"), &[]).unwrap();
        }
        let store = new_store(&dir);
        assert_eq!(store.get_movies_count().unwrap(), 1);
    }

    #[test]
    fn rejects_foreign_database() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("other.db");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute("CREATE TABLE notes (id INTEGER PRIMARY KEY)", [])
                .unwrap();
        }
        assert!(SqliteCatalogStore::new(&path, 1).is_err());
    }

    #[tokio::test]
    async fn test_concurrent_reads_no_blocking() {
        let dir = TempDir::new().unwrap();
        let store = new_store(&dir);
        store
            .insert_movie(&sample_movie("A"), &sample_summaries())
            .unwrap();

        let handles: Vec<_> = (0..10)
            .map(|_| {
                tokio::spawn({
                    let store = store.clone();
                    async move {
                        for _ in 0..100 {
                            assert_eq!(store.get_movies_count().unwrap(), 1);
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap();
        }
    }
}
