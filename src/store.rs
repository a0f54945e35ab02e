//! Append-only upload log.
//!
//! Every successfully parsed upload is recorded with its original file name and the full
//! encoded payload (not the decoded bytes), so it can be re-extracted later.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rusqlite::{params, Connection, OptionalExtension};

use crate::error::StoreError;
use crate::payload::UploadPayload;

/// Convenience result type for persistence operations.
pub type StoreResult<T> = Result<T, StoreError>;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS files (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    filename TEXT NOT NULL,
    content TEXT NOT NULL
)";

/// A stored upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedUpload {
    pub id: i64,
    pub filename: String,
    pub contents: String,
}

impl PersistedUpload {
    /// Rebuild the payload exactly as it was uploaded.
    pub fn to_payload(&self) -> UploadPayload {
        UploadPayload::new(self.filename.clone(), self.contents.clone())
    }
}

/// Destination for upload records.
pub trait UploadSink {
    /// Append a record and return its id.
    fn record(&self, filename: &str, contents: &str) -> StoreResult<i64>;
}

/// A sink that keeps nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardSink;

impl UploadSink for DiscardSink {
    fn record(&self, _filename: &str, _contents: &str) -> StoreResult<i64> {
        Ok(0)
    }
}

/// SQLite-backed upload log.
///
/// Only the database path is held; each operation opens its own connection and releases it
/// before returning.
#[derive(Debug, Clone)]
pub struct SqliteUploadStore {
    path: PathBuf,
}

impl SqliteUploadStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Fetch one record by id.
    pub fn get(&self, id: i64) -> StoreResult<Option<PersistedUpload>> {
        let conn = self.connect()?;
        let row = conn
            .query_row(
                "SELECT id, filename, content FROM files WHERE id = ?1",
                params![id],
                |r| {
                    Ok(PersistedUpload {
                        id: r.get(0)?,
                        filename: r.get(1)?,
                        contents: r.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    /// All records, oldest first.
    pub fn list(&self) -> StoreResult<Vec<PersistedUpload>> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare("SELECT id, filename, content FROM files ORDER BY id")?;
        let rows = stmt
            .query_map([], |r| {
                Ok(PersistedUpload {
                    id: r.get(0)?,
                    filename: r.get(1)?,
                    contents: r.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn connect(&self) -> StoreResult<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute(SCHEMA, [])?;
        Ok(conn)
    }
}

impl UploadSink for SqliteUploadStore {
    fn record(&self, filename: &str, contents: &str) -> StoreResult<i64> {
        let conn = self.connect()?;
        conn.execute(
            "INSERT INTO files (filename, content) VALUES (?1, ?2)",
            params![filename, contents],
        )?;
        Ok(conn.last_insert_rowid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn tmp_db(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("upload-insights-{name}-{nanos}.db"))
    }

    #[test]
    fn record_assigns_increasing_ids_and_round_trips() {
        let path = tmp_db("store-unit");
        let store = SqliteUploadStore::new(&path);

        let a = store.record("a.csv", "data:text/csv;base64,QQ==").unwrap();
        let b = store.record("b.pdf", "data:application/pdf;base64,Qg==").unwrap();
        assert!(b > a);

        let got = store.get(a).unwrap().unwrap();
        assert_eq!(got.filename, "a.csv");
        assert_eq!(got.to_payload().contents, "data:text/csv;base64,QQ==");
        assert_eq!(store.list().unwrap().len(), 2);
        assert_eq!(store.get(b + 100).unwrap(), None);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn unreachable_database_is_an_error() {
        let store = SqliteUploadStore::new(std::env::temp_dir().join("no-such-dir-upload-insights/x/y.db"));
        assert!(store.record("a.csv", "x,y").is_err());
    }
}
