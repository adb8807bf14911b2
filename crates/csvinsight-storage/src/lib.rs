//! Report persistence.
//!
//! [`ReportStore`] is the append-only capability the server depends on.
//! [`ReportGateway`] implements it with SeaORM over SQLite or PostgreSQL,
//! chosen by the configured connection string.

pub mod backend;
pub mod config;
pub mod entities;
pub mod error;
pub mod gateway;


use async_trait::async_trait;
use csvinsight_common::Report;

pub use backend::{Backend, PoolSettings};
pub use config::DatabaseConfig;
pub use error::{Result, StorageError};
pub use gateway::ReportGateway;

/// Append-only store of [`Report`]s.
///
/// Implementations must be safe to share across threads (`Send + Sync`)
/// because one instance serves every in-flight HTTP request.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Inserts a report with a fresh id and a server-assigned timestamp.
    async fn create(&self, filename: &str, insights: &str) -> Result<Report>;

    /// Returns up to `limit` reports, most recent first. An empty table yields
    /// an empty vector, never an error.
    async fn list(&self, limit: u64) -> Result<Vec<Report>>;

    /// Round-trips a trivial query without touching report data.
    async fn ping(&self) -> Result<()>;
}
