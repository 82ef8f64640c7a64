//! Room sessions and transcripts on top of [`DatabasePool`].
//!
//! A room's session holds its overrides (backend key, model, system
//! prompt). Its transcript is an append-only list of messages ordered by a
//! per-room sequence number that never leaves this module.

use sqlx::Row;
use tracing::debug;

use super::pool::DatabasePool;
use crate::error::Result;
use crate::types::{ChatMessage, Role};

/// Per-room overrides. `None` means "use the backend default".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    pub room_id: String,
    pub backend_key: Option<String>,
    pub model: Option<String>,
    pub system_prompt: Option<String>,
}

impl Session {
    pub fn new(room_id: impl Into<String>) -> Self {
        Self {
            room_id: room_id.into(),
            ..Default::default()
        }
    }
}

/// The nullable columns of `rooms` that can be overridden one at a time.
#[derive(Clone, Copy, Debug)]
enum RoomField {
    Backend,
    Model,
    SystemPrompt,
}

impl RoomField {
    fn column(self) -> &'static str {
        match self {
            RoomField::Backend => "backend",
            RoomField::Model => "model",
            RoomField::SystemPrompt => "system_prompt",
        }
    }
}

/// SQLite-backed store for room sessions and transcripts.
///
/// Cheap to clone; clones share the underlying pools.
#[derive(Clone, Debug)]
pub struct SessionStore {
    pool: DatabasePool,
}

impl SessionStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Open the database at `database_url` and run migrations.
    pub async fn connect(database_url: &str) -> Result<Self> {
        Ok(Self::new(DatabasePool::connect(database_url).await?))
    }

    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }

    /// Return the session for `room_id`, creating an empty one if the room
    /// has never been seen.
    pub async fn get_or_create(&self, room_id: &str) -> Result<Session> {
        if let Some(session) = self.fetch_session(room_id).await? {
            return Ok(session);
        }

        sqlx::query("INSERT INTO rooms (id) VALUES (?) ON CONFLICT(id) DO NOTHING")
            .bind(room_id)
            .execute(&self.pool.writer)
            .await?;
        debug!(room_id, "room created");

        // Another task may have created and configured the room in between.
        let row = sqlx::query("SELECT id, backend, model, system_prompt FROM rooms WHERE id = ?")
            .bind(room_id)
            .fetch_one(&self.pool.writer)
            .await?;
        session_from_row(&row)
    }

    /// Read the session for `room_id` without creating it.
    pub async fn fetch_session(&self, room_id: &str) -> Result<Option<Session>> {
        let row = sqlx::query("SELECT id, backend, model, system_prompt FROM rooms WHERE id = ?")
            .bind(room_id)
            .fetch_optional(&self.pool.reader)
            .await?;

        row.as_ref().map(session_from_row).transpose()
    }

    pub async fn set_backend(&self, room_id: &str, backend_key: Option<&str>) -> Result<()> {
        self.set_field(room_id, RoomField::Backend, backend_key).await
    }

    pub async fn set_model(&self, room_id: &str, model: Option<&str>) -> Result<()> {
        self.set_field(room_id, RoomField::Model, model).await
    }

    pub async fn set_system_prompt(&self, room_id: &str, prompt: Option<&str>) -> Result<()> {
        self.set_field(room_id, RoomField::SystemPrompt, prompt).await
    }

    async fn set_field(&self, room_id: &str, field: RoomField, value: Option<&str>) -> Result<()> {
        let column = field.column();
        let sql = format!(
            "INSERT INTO rooms (id, {column}) VALUES (?, ?) \
             ON CONFLICT(id) DO UPDATE SET {column} = excluded.{column}"
        );

        sqlx::query(&sql)
            .bind(room_id)
            .bind(value)
            .execute(&self.pool.writer)
            .await?;

        debug!(room_id, column, value = ?value, "room override updated");
        Ok(())
    }

    /// Append a message to the room's transcript.
    ///
    /// The room row and the entry are written in one transaction on the
    /// single writer connection, so the `MAX(seq_num) + 1` allocation cannot
    /// race with another append.
    pub async fn append_message(&self, room_id: &str, role: Role, content: &str) -> Result<()> {
        let mut tx = self.pool.writer.begin().await?;

        sqlx::query("INSERT INTO rooms (id) VALUES (?) ON CONFLICT(id) DO NOTHING")
            .bind(room_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO context_entries (room_id, seq_num, role, content) \
             VALUES (?, (SELECT COALESCE(MAX(seq_num), 0) + 1 FROM context_entries WHERE room_id = ?), ?, ?)",
        )
        .bind(room_id)
        .bind(room_id)
        .bind(role.as_str())
        .bind(content)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!(room_id, role = %role, len = content.len(), "transcript entry appended");
        Ok(())
    }

    /// The room's transcript in append order. Empty for unknown rooms.
    pub async fn fetch_transcript(&self, room_id: &str) -> Result<Vec<ChatMessage>> {
        let rows = sqlx::query(
            "SELECT role, content FROM context_entries WHERE room_id = ? ORDER BY seq_num ASC",
        )
        .bind(room_id)
        .fetch_all(&self.pool.reader)
        .await?;

        rows.iter()
            .map(|row| -> Result<ChatMessage> {
                let role: String = row.try_get("role")?;
                let content: String = row.try_get("content")?;
                Ok(ChatMessage::new(role.parse()?, content))
            })
            .collect()
    }

    pub async fn transcript_len(&self, room_id: &str) -> Result<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM context_entries WHERE room_id = ?")
            .bind(room_id)
            .fetch_one(&self.pool.reader)
            .await?;
        Ok(count.max(0) as usize)
    }

    /// Delete the room's transcript. Session overrides are kept.
    pub async fn clear_transcript(&self, room_id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM context_entries WHERE room_id = ?")
            .bind(room_id)
            .execute(&self.pool.writer)
            .await?;

        debug!(room_id, removed = result.rows_affected(), "transcript cleared");
        Ok(())
    }
}

fn session_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Session> {
    Ok(Session {
        room_id: row.try_get("id")?,
        backend_key: row.try_get("backend")?,
        model: row.try_get("model")?,
        system_prompt: row.try_get("system_prompt")?,
    })
}
