//! Chat history store: the sole source of truth for conversation
//! ordering.
//!
//! Append-only from the pipeline's point of view; rows are never
//! updated or deleted here. The production store is SQLite. Concurrent
//! requests for the same user may interleave; a duplicate scan can
//! miss a turn still being written by a concurrent request, which is
//! an accepted consistency relaxation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;
use support_common::{Category, ChatTurn, SupportError};
use tracing::debug;

/// External history store collaborator.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Append one completed turn.
    async fn append(&self, turn: &ChatTurn) -> Result<(), SupportError>;

    /// Fetch the most recent turns for a user, newest first.
    async fn query_recent(&self, user_id: &str, limit: usize)
        -> Result<Vec<ChatTurn>, SupportError>;
}

/// SQLite-backed history store.
///
/// The connection is guarded by a plain mutex; statements are short
/// and the guard is never held across an await point.
pub struct SqliteHistoryStore {
    conn: Mutex<Connection>,
}

impl SqliteHistoryStore {
    /// Open (or create) the database at `path` and ensure the schema.
    pub fn open<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// In-memory database, used by tests.
    pub fn open_in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn init_schema(conn: &Connection) -> anyhow::Result<()> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS chats (
                 id        INTEGER PRIMARY KEY AUTOINCREMENT,
                 user_id   TEXT NOT NULL,
                 message   TEXT NOT NULL,
                 response  TEXT NOT NULL,
                 category  TEXT,
                 timestamp TEXT NOT NULL
             );
             CREATE INDEX IF NOT EXISTS idx_chats_user_ts
                 ON chats (user_id, timestamp DESC);",
        )?;
        Ok(())
    }
}

#[async_trait]
impl HistoryStore for SqliteHistoryStore {
    async fn append(&self, turn: &ChatTurn) -> Result<(), SupportError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| SupportError::Persistence("history store lock poisoned".to_string()))?;

        conn.execute(
            "INSERT INTO chats (user_id, message, response, category, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            (
                &turn.user_id,
                &turn.message,
                &turn.response,
                turn.category.map(|c| c.to_string()),
                turn.timestamp.to_rfc3339(),
            ),
        )
        .map_err(|e| SupportError::Persistence(e.to_string()))?;

        debug!("Appended turn for {} at {}", turn.user_id, turn.timestamp.to_rfc3339());
        Ok(())
    }

    async fn query_recent(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<ChatTurn>, SupportError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| SupportError::Persistence("history store lock poisoned".to_string()))?;

        let mut stmt = conn
            .prepare(
                "SELECT user_id, message, response, category, timestamp
                 FROM chats
                 WHERE user_id = ?1
                 ORDER BY timestamp DESC, id DESC
                 LIMIT ?2",
            )
            .map_err(|e| SupportError::Persistence(e.to_string()))?;

        let rows = stmt
            .query_map((user_id, limit as i64), |row| {
                let category: Option<String> = row.get(3)?;
                let timestamp: String = row.get(4)?;
                Ok(ChatTurn {
                    user_id: row.get(0)?,
                    message: row.get(1)?,
                    response: row.get(2)?,
                    category: category.as_deref().and_then(Category::from_label),
                    timestamp: timestamp
                        .parse::<DateTime<Utc>>()
                        .unwrap_or_else(|_| Utc::now()),
                })
            })
            .map_err(|e| SupportError::Persistence(e.to_string()))?;

        let mut turns = Vec::new();
        for row in rows {
            turns.push(row.map_err(|e| SupportError::Persistence(e.to_string()))?);
        }

        debug!("Loaded {} recent turns for {}", turns.len(), user_id);
        Ok(turns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn turn_at(user: &str, msg: &str, ts: DateTime<Utc>) -> ChatTurn {
        let mut turn = ChatTurn::new(user, msg, "resp", Some(Category::General));
        turn.timestamp = ts;
        turn
    }

    #[tokio::test]
    async fn test_append_and_query_newest_first() {
        let store = SqliteHistoryStore::open_in_memory().unwrap();
        let base = Utc::now();

        for (i, msg) in ["first", "second", "third"].iter().enumerate() {
            let turn = turn_at("u1", msg, base + chrono::Duration::seconds(i as i64));
            store.append(&turn).await.unwrap();
        }

        let turns = store.query_recent("u1", 10).await.unwrap();
        let messages: Vec<_> = turns.iter().map(|t| t.message.as_str()).collect();
        assert_eq!(messages, vec!["third", "second", "first"]);
    }

    #[tokio::test]
    async fn test_query_respects_limit_and_user() {
        let store = SqliteHistoryStore::open_in_memory().unwrap();
        let base = Utc::now();

        for i in 0..8 {
            let turn = turn_at("u1", &format!("msg-{}", i), base + chrono::Duration::seconds(i));
            store.append(&turn).await.unwrap();
        }
        store
            .append(&turn_at("u2", "other user", base))
            .await
            .unwrap();

        let turns = store.query_recent("u1", 5).await.unwrap();
        assert_eq!(turns.len(), 5);
        assert!(turns.iter().all(|t| t.user_id == "u1"));
        assert_eq!(turns[0].message, "msg-7");
    }

    #[tokio::test]
    async fn test_category_round_trip_including_cached() {
        let store = SqliteHistoryStore::open_in_memory().unwrap();

        store
            .append(&ChatTurn::new("u1", "q", "a", Some(Category::Cached)))
            .await
            .unwrap();
        store.append(&ChatTurn::new("u1", "q2", "a2", None)).await.unwrap();

        let turns = store.query_recent("u1", 10).await.unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[1].category, Some(Category::Cached));
        assert_eq!(turns[0].category, None);
    }

    #[tokio::test]
    async fn test_open_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("chats.db");

        let store = SqliteHistoryStore::open(&path).unwrap();
        store
            .append(&ChatTurn::new("u1", "q", "a", Some(Category::General)))
            .await
            .unwrap();

        assert!(path.exists());
    }
}
