use async_trait::async_trait;
use chrono::Utc;
use csvinsight_common::Report;
use migration::{Migrator, MigratorTrait};
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ActiveValue::Set, ConnectOptions, ConnectionTrait,
    Database, DatabaseConnection, EntityTrait, QueryOrder, QuerySelect, Statement,
};
use std::time::Duration;
use tokio::sync::OnceCell;

use crate::backend::Backend;
use crate::config::DatabaseConfig;
use crate::entities::report::{self, Column as RepCol, Entity as RepEntity};
use crate::error::{Result, StorageError};
use crate::ReportStore;

fn model_to_report(m: report::Model) -> Report {
    Report {
        id: m.id,
        filename: m.filename,
        insights: m.insights,
        timestamp: m.timestamp.with_timezone(&Utc),
    }
}

/// SeaORM-backed [`ReportStore`].
///
/// Construction is cheap and never touches the database. The pooled
/// connection is opened by [`connect`](Self::connect) (or by the first
/// operation), migrated, and then shared by every later call. A failed
/// attempt leaves the cell empty so the next call retries; once a handle is
/// stored it is never replaced.
pub struct ReportGateway {
    config: DatabaseConfig,
    db: OnceCell<DatabaseConnection>,
}

impl ReportGateway {
    pub fn new(config: DatabaseConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Backend selected by the connection string.
    pub fn backend(&self) -> Result<Backend> {
        let url = self.config.url.as_deref().ok_or(StorageError::NotConfigured)?;
        Backend::from_url(url)
    }

    pub fn is_connected(&self) -> bool {
        self.db.initialized()
    }

    /// Opens and migrates the database if that has not happened yet.
    pub async fn connect(&self) -> Result<()> {
        self.db().await.map(|_| ())
    }

    async fn db(&self) -> Result<&DatabaseConnection> {
        let url = self.config.url.as_deref().ok_or(StorageError::NotConfigured)?;
        self.db.get_or_try_init(|| self.open(url)).await
    }

    async fn open(&self, url: &str) -> Result<DatabaseConnection> {
        let backend = Backend::from_url(url)?;
        backend.prepare(url)?;

        let pool = backend.pool_settings(url, self.config.max_connections);
        let mut opts = ConnectOptions::new(backend.connection_url(url));
        opts.max_connections(pool.max_connections)
            .min_connections(pool.min_connections)
            .connect_timeout(Duration::from_secs(self.config.connect_timeout_secs))
            .sqlx_logging(false);
        if let Some(idle) = pool.idle_timeout {
            opts.idle_timeout(idle);
        }
        if let Some(lifetime) = pool.max_lifetime {
            opts.max_lifetime(lifetime);
        }

        let db = Database::connect(opts).await?;

        if backend.wants_wal(url) {
            db.execute_unprepared("PRAGMA journal_mode=WAL;").await?;
        }

        Migrator::up(&db, None).await?;

        tracing::info!(
            backend = %backend,
            db = %self.config.redacted_url(),
            "Connected report store"
        );
        Ok(db)
    }
}

#[async_trait]
impl ReportStore for ReportGateway {
    async fn create(&self, filename: &str, insights: &str) -> Result<Report> {
        let db = self.db().await?;
        let am = report::ActiveModel {
            id: NotSet,
            filename: Set(filename.to_string()),
            insights: Set(insights.to_string()),
            timestamp: Set(Utc::now().fixed_offset()),
        };
        let m = am.insert(db).await?;
        tracing::debug!(id = m.id, filename = %m.filename, "Report inserted");
        Ok(model_to_report(m))
    }

    async fn list(&self, limit: u64) -> Result<Vec<Report>> {
        let db = self.db().await?;
        let rows = RepEntity::find()
            .order_by_desc(RepCol::Timestamp)
            .order_by_desc(RepCol::Id)
            .limit(limit)
            .all(db)
            .await?;
        Ok(rows.into_iter().map(model_to_report).collect())
    }

    async fn ping(&self) -> Result<()> {
        let db = self.db().await?;
        db.execute(Statement::from_string(
            db.get_database_backend(),
            "SELECT 1".to_string(),
        ))
        .await?;
        Ok(())
    }
}
