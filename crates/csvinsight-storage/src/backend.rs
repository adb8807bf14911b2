use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Result, StorageError};

/// Database engine behind a [`ReportGateway`](crate::ReportGateway), picked
/// from the connection string at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Embedded, file-backed (or in-memory) SQLite.
    Sqlite,
    /// Networked PostgreSQL.
    Postgres,
}

/// Long enough to never expire in practice.
const PINNED_CONNECTION_LIFETIME: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Connection pool options derived from the backend. `None` keeps the
/// driver default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub min_connections: u32,
    pub idle_timeout: Option<Duration>,
    pub max_lifetime: Option<Duration>,
}

impl Backend {
    pub fn from_url(url: &str) -> Result<Self> {
        let scheme = url.split(':').next().unwrap_or_default().to_ascii_lowercase();
        match scheme.as_str() {
            "sqlite" | "file" => Ok(Self::Sqlite),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            _ => Err(StorageError::UnsupportedBackend(scheme)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::Postgres => "postgres",
        }
    }

    /// Rewrites `url` into the form the driver accepts.
    ///
    /// SQLite URLs get `mode=rwc` so the database file is created on first
    /// use, and `file:` URLs are mapped onto the `sqlite://` scheme.
    pub fn connection_url(&self, url: &str) -> String {
        match self {
            Self::Postgres => url.to_string(),
            Self::Sqlite => {
                let url = match url.strip_prefix("file:") {
                    Some(path) => format!("sqlite://{}", path.trim_start_matches("//")),
                    None => url.to_string(),
                };
                if is_sqlite_memory(&url) || url.contains("mode=") {
                    url
                } else if url.contains('?') {
                    format!("{url}&mode=rwc")
                } else {
                    format!("{url}?mode=rwc")
                }
            }
        }
    }

    /// Filesystem path of a file-backed SQLite database, if any.
    pub fn sqlite_path(&self, url: &str) -> Option<PathBuf> {
        if *self != Self::Sqlite || is_sqlite_memory(url) {
            return None;
        }
        let rest = url
            .strip_prefix("sqlite://")
            .or_else(|| url.strip_prefix("sqlite:"))
            .or_else(|| url.strip_prefix("file://"))
            .or_else(|| url.strip_prefix("file:"))?;
        let path = rest.split('?').next().unwrap_or_default();
        (!path.is_empty()).then(|| PathBuf::from(path))
    }

    /// Creates the parent directory of a file-backed SQLite database.
    pub fn prepare(&self, url: &str) -> Result<()> {
        if let Some(parent) = self
            .sqlite_path(url)
            .as_deref()
            .and_then(Path::parent)
            .filter(|p| !p.as_os_str().is_empty())
        {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Pool sizing and connection recycling for `url`.
    ///
    /// An in-memory SQLite database lives and dies with its single
    /// connection, so that connection is kept open for the life of the
    /// process instead of being reaped when idle or old.
    pub fn pool_settings(&self, url: &str, configured: u32) -> PoolSettings {
        if *self == Self::Sqlite && is_sqlite_memory(url) {
            PoolSettings {
                max_connections: 1,
                min_connections: 1,
                idle_timeout: Some(PINNED_CONNECTION_LIFETIME),
                max_lifetime: Some(PINNED_CONNECTION_LIFETIME),
            }
        } else {
            PoolSettings {
                max_connections: configured.max(1),
                min_connections: 0,
                idle_timeout: None,
                max_lifetime: None,
            }
        }
    }

    /// Whether to switch the database into WAL journal mode after connecting.
    pub fn wants_wal(&self, url: &str) -> bool {
        *self == Self::Sqlite && !is_sqlite_memory(url)
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn is_sqlite_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_is_chosen_from_scheme() {
        assert_eq!(Backend::from_url("sqlite://data/r.db").unwrap(), Backend::Sqlite);
        assert_eq!(Backend::from_url("sqlite::memory:").unwrap(), Backend::Sqlite);
        assert_eq!(Backend::from_url("file:./dev.db").unwrap(), Backend::Sqlite);
        assert_eq!(
            Backend::from_url("postgres://u:p@localhost/db").unwrap(),
            Backend::Postgres
        );
        assert_eq!(
            Backend::from_url("postgresql://localhost/db").unwrap(),
            Backend::Postgres
        );
    }

    #[test]
    fn unknown_scheme_is_rejected() {
        let err = Backend::from_url("mysql://localhost/db").unwrap_err();
        assert!(matches!(err, StorageError::UnsupportedBackend(ref s) if s == "mysql"));
    }

    #[test]
    fn sqlite_url_gets_create_mode() {
        let b = Backend::Sqlite;
        assert_eq!(
            b.connection_url("sqlite://data/r.db"),
            "sqlite://data/r.db?mode=rwc"
        );
        assert_eq!(
            b.connection_url("sqlite://data/r.db?mode=ro"),
            "sqlite://data/r.db?mode=ro"
        );
        assert_eq!(b.connection_url("file:./dev.db"), "sqlite://./dev.db?mode=rwc");
        assert_eq!(b.connection_url("sqlite::memory:"), "sqlite::memory:");
        assert_eq!(
            Backend::Postgres.connection_url("postgres://localhost/db"),
            "postgres://localhost/db"
        );
    }

    #[test]
    fn in_memory_connection_is_never_recycled() {
        let pool = Backend::Sqlite.pool_settings("sqlite::memory:", 10);
        assert_eq!(pool.max_connections, 1);
        assert_eq!(pool.min_connections, 1);
        let year = Duration::from_secs(365 * 24 * 60 * 60);
        assert!(pool.idle_timeout.is_some_and(|t| t > year));
        assert!(pool.max_lifetime.is_some_and(|t| t > year));
    }

    #[test]
    fn file_and_postgres_pools_use_configured_size() {
        for (backend, url) in [
            (Backend::Sqlite, "sqlite://data/r.db"),
            (Backend::Postgres, "postgres://localhost/db"),
        ] {
            let pool = backend.pool_settings(url, 8);
            assert_eq!(pool.max_connections, 8);
            assert_eq!(pool.min_connections, 0);
            assert_eq!(pool.idle_timeout, None);
            assert_eq!(pool.max_lifetime, None);
        }
        assert_eq!(Backend::Postgres.pool_settings("postgres://h/db", 0).max_connections, 1);
    }

    #[test]
    fn sqlite_path_is_extracted() {
        let b = Backend::Sqlite;
        assert_eq!(
            b.sqlite_path("sqlite://data/r.db?mode=rwc"),
            Some(PathBuf::from("data/r.db"))
        );
        assert_eq!(b.sqlite_path("file:./dev.db"), Some(PathBuf::from("./dev.db")));
        assert_eq!(b.sqlite_path("sqlite::memory:"), None);
        assert_eq!(Backend::Postgres.sqlite_path("postgres://h/db"), None);
    }
}
