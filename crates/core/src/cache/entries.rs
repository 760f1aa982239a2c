//! Stored response CRUD operations.
//!
//! Every operation is scoped to one generation name. Within a generation
//! the request URL is the only key: request headers never take part in
//! matching, so two requests for the same URL with different `Accept`
//! headers resolve to the same entry.

use super::connection::CacheDb;
use super::hash::body_digest;
use crate::Error;
use bytes::Bytes;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// A stored HTTP response.
///
/// Holds everything needed to replay the response to a later request for
/// the same URL: status, headers and the full body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
    pub digest: String,
    pub stored_at: String,
}

impl CachedResponse {
    /// Build an entry for `url`, deriving the content type and body digest.
    pub fn new(url: impl Into<String>, status: u16, headers: Vec<(String, String)>, body: Bytes) -> Self {
        let content_type = headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("content-type"))
            .map(|(_, value)| value.clone());
        let digest = body_digest(&body);

        Self {
            url: url.into(),
            status,
            content_type,
            headers,
            body,
            digest,
            stored_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Size of the stored body in bytes.
    pub fn size(&self) -> usize {
        self.body.len()
    }
}

impl CacheDb {
    /// Look up the entry stored under `url` in `generation`.
    ///
    /// Returns None if the generation or the entry doesn't exist.
    pub async fn match_entry(&self, generation: &str, url: &str) -> Result<Option<CachedResponse>, Error> {
        let generation = generation.to_string();
        let url = url.to_string();
        self.conn
            .call(move |conn| -> Result<Option<CachedResponse>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT url, status, content_type, headers_json, body, digest, stored_at
                FROM entries WHERE generation = ?1 AND url = ?2",
                )?;

                let result = stmt.query_row(params![generation, url], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, u16>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, Vec<u8>>(4)?,
                        row.get::<_, String>(5)?,
                        row.get::<_, String>(6)?,
                    ))
                });

                match result {
                    Ok((url, status, content_type, headers_json, body, digest, stored_at)) => {
                        let headers: Vec<(String, String)> = serde_json::from_str(&headers_json)
                            .map_err(|e| Error::CorruptEntry(format!("{url}: {e}")))?;
                        Ok(Some(CachedResponse {
                            url,
                            status,
                            content_type,
                            headers,
                            body: Bytes::from(body),
                            digest,
                            stored_at,
                        }))
                    }
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Store `response` under its URL in `generation`.
    ///
    /// Creates the generation on first write. An existing entry for the
    /// same URL is replaced and moves to the newest enumeration position.
    pub async fn put_entry(&self, generation: &str, response: &CachedResponse) -> Result<(), Error> {
        let generation = generation.to_string();
        let response = response.clone();
        let headers_json =
            serde_json::to_string(&response.headers).map_err(|e| Error::CorruptEntry(e.to_string()))?;

        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                tx.execute(
                    "INSERT OR IGNORE INTO generations (name, created_at) VALUES (?1, ?2)",
                    params![generation, chrono::Utc::now().to_rfc3339()],
                )?;
                tx.execute(
                    "DELETE FROM entries WHERE generation = ?1 AND url = ?2",
                    params![generation, response.url],
                )?;
                tx.execute(
                    "INSERT INTO entries (
                    generation, url, status, content_type, headers_json, body, digest, stored_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    params![
                        generation,
                        response.url,
                        response.status,
                        response.content_type,
                        headers_json,
                        response.body.as_ref(),
                        response.digest,
                        response.stored_at,
                    ],
                )?;
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// List the URLs stored in `generation`, oldest insertion first.
    pub async fn entry_keys(&self, generation: &str) -> Result<Vec<String>, Error> {
        let generation = generation.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT url FROM entries WHERE generation = ?1 ORDER BY seq ASC")?;
                let keys = stmt
                    .query_map(params![generation], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(keys)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete one entry. Deleting a missing entry is a no-op returning false.
    pub async fn delete_entry(&self, generation: &str, url: &str) -> Result<bool, Error> {
        let generation = generation.to_string();
        let url = url.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute(
                    "DELETE FROM entries WHERE generation = ?1 AND url = ?2",
                    params![generation, url],
                )?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// List every generation name present in the store.
    pub async fn generation_names(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(move |conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM generations ORDER BY created_at ASC, name ASC")?;
                let names = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a whole generation with all of its entries.
    ///
    /// Returns false if the generation didn't exist.
    pub async fn delete_generation(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let tx = conn.transaction()?;
                tx.execute("DELETE FROM entries WHERE generation = ?1", params![name])?;
                let count = tx.execute("DELETE FROM generations WHERE name = ?1", params![name])?;
                tx.commit()?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }
}
