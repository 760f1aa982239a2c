//! Opening the media store.

use super::migrations;
use crate::Error;
use std::path::Path;
use tokio_rusqlite::Connection;

/// Applied on every open. WAL plus a busy timeout lets several contexts
/// share one store file.
const PRAGMAS: &str = "
    PRAGMA journal_mode = WAL;
    PRAGMA synchronous = NORMAL;
    PRAGMA busy_timeout = 5000;
    PRAGMA foreign_keys = ON;
";

/// Handle to the SQLite media store.
///
/// Operations run on the connection's background thread. Clones share the
/// same connection.
#[derive(Clone, Debug)]
pub struct CacheDb {
    pub(crate) conn: Connection,
}

impl CacheDb {
    /// Open (creating if missing) the store at `path` and migrate it.
    ///
    /// The parent directory must already exist.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let conn = Connection::open(path).await.map_err(|e| Error::Database(e.into()))?;
        let db = Self::prepare(conn).await?;
        tracing::debug!(path = %path.display(), "opened media store");
        Ok(db)
    }

    pub async fn open_in_memory() -> Result<Self, Error> {
        let conn = Connection::open_in_memory().await.map_err(|e| Error::Database(e.into()))?;
        Self::prepare(conn).await
    }

    async fn prepare(conn: Connection) -> Result<Self, Error> {
        conn.call(|conn| conn.execute_batch(PRAGMAS)).await?;
        let version = migrations::run(&conn).await?;
        tracing::debug!(schema_version = version, "media store schema ready");

        Ok(Self { conn })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_prepare_applies_pragmas() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let (foreign_keys, busy_timeout): (i64, i64) = db
            .conn
            .call(|conn| {
                let fk = conn.query_row("PRAGMA foreign_keys", [], |row| row.get(0))?;
                let busy = conn.query_row("PRAGMA busy_timeout", [], |row| row.get(0))?;
                Ok::<_, tokio_rusqlite::rusqlite::Error>((fk, busy))
            })
            .await
            .unwrap();

        assert_eq!(foreign_keys, 1);
        assert_eq!(busy_timeout, 5000);
    }

    #[tokio::test]
    async fn test_open_missing_directory_fails() {
        let result = CacheDb::open("/nonexistent-dir/thisday/cache.sqlite").await;
        assert!(matches!(result, Err(Error::Database(_))));
    }
}
