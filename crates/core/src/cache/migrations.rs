//! Schema migrations for the media store.
//!
//! A schema version is independent of the cache generation: bumping the
//! generation discards cached bodies, a migration changes the tables that
//! hold them. Applied versions are recorded in `_migrations`.

use super::Error;
use tokio_rusqlite::{Connection, params, rusqlite};

struct Migration {
    version: i64,
    name: &'static str,
    sql: &'static str,
}

/// Ordered by version. Never edit an entry once released; append a new one.
const MIGRATIONS: &[Migration] = &[
    Migration { version: 1, name: "media_entries", sql: include_str!("../../migrations/001_media_entries.sql") },
    Migration { version: 2, name: "entry_digest", sql: include_str!("../../migrations/002_entry_digest.sql") },
];

/// Newest schema version this build understands.
pub fn latest_version() -> i64 {
    MIGRATIONS.last().map_or(0, |m| m.version)
}

fn applied_version(conn: &rusqlite::Connection) -> Result<i64, Error> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL DEFAULT '',
            applied_at TEXT NOT NULL
        )",
    )?;

    Ok(conn.query_row("SELECT COALESCE(MAX(version), 0) FROM _migrations", [], |row| row.get(0))?)
}

/// Bring the schema up to [`latest_version`].
///
/// Each pending migration runs in its own transaction. A store written by a
/// newer build is refused rather than guessed at.
pub async fn run(conn: &Connection) -> Result<i64, Error> {
    conn.call(|conn| -> Result<i64, Error> {
        let applied = applied_version(conn)?;
        if applied > latest_version() {
            return Err(Error::MigrationFailed(format!(
                "store schema version {applied} is newer than supported version {}",
                latest_version()
            )));
        }

        for migration in MIGRATIONS.iter().filter(|m| m.version > applied) {
            let tx = conn.transaction()?;
            tx.execute_batch(migration.sql)
                .map_err(|e| Error::MigrationFailed(format!("{} ({}): {e}", migration.version, migration.name)))?;
            tx.execute(
                "INSERT INTO _migrations (version, name, applied_at) VALUES (?1, ?2, ?3)",
                params![migration.version, migration.name, chrono::Utc::now().to_rfc3339()],
            )?;
            tx.commit()?;
            tracing::debug!(version = migration.version, name = migration.name, "applied cache migration");
        }

        applied_version(conn)
    })
    .await
    .map_err(Error::from)
}
