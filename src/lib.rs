//! Movie Catalog Server Library
//!
//! This library exposes the internal modules for the binaries and for testing.

pub mod analysis;
pub mod catalog_store;
pub mod config;
pub mod ingestion;
pub mod server;
pub mod sqlite_persistence;

// Re-export commonly used types for convenience
pub use catalog_store::{CatalogStore, SqliteCatalogStore};
pub use ingestion::{ImportReport, Importer};
pub use server::{run_server, RequestsLoggingLevel, ServerConfig};
