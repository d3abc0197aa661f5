//! Local chat archive operations
//!
//! Messages are keyed by (profile_id, message_id) so re-archiving a
//! page that was already seen is a no-op.

use fabula_core::{ChatMessage, Error, Result};
use sqlx::SqlitePool;

/// Database row for an archived message
#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    message_id: i64,
    text: String,
    from_user: i32,
    created_at: String,
}

impl From<MessageRow> for ChatMessage {
    fn from(row: MessageRow) -> Self {
        ChatMessage {
            id: row.message_id,
            text: row.text,
            from_user: row.from_user != 0,
            created_at: row.created_at,
        }
    }
}

/// Archive a batch of messages, skipping ones already stored
///
/// Returns how many rows were actually inserted.
pub async fn archive_messages(
    pool: &SqlitePool,
    profile_id: i64,
    messages: &[ChatMessage],
) -> Result<usize> {
    let mut inserted = 0;
    for message in messages {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO messages (profile_id, message_id, text, from_user, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(profile_id)
        .bind(message.id)
        .bind(&message.text)
        .bind(message.from_user as i32)
        .bind(&message.created_at)
        .execute(pool)
        .await
        .map_err(|e| Error::DatabaseError(e.to_string()))?;

        inserted += result.rows_affected() as usize;
    }
    Ok(inserted)
}

/// Load the newest `limit` archived messages, oldest first
pub async fn load_recent_messages(
    pool: &SqlitePool,
    profile_id: i64,
    limit: u32,
) -> Result<Vec<ChatMessage>> {
    let rows: Vec<MessageRow> = sqlx::query_as(
        r#"
        SELECT message_id, text, from_user, created_at
        FROM messages
        WHERE profile_id = ?
        ORDER BY message_id DESC
        LIMIT ?
        "#,
    )
    .bind(profile_id)
    .bind(limit)
    .fetch_all(pool)
    .await
    .map_err(|e| Error::DatabaseError(e.to_string()))?;

    let mut messages: Vec<ChatMessage> = rows.into_iter().map(ChatMessage::from).collect();
    messages.reverse();
    Ok(messages)
}

/// Count archived messages for a profile
pub async fn count_messages(pool: &SqlitePool, profile_id: i64) -> Result<i64> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM messages WHERE profile_id = ?")
        .bind(profile_id)
        .fetch_one(pool)
        .await
        .map_err(|e| Error::DatabaseError(e.to_string()))?;

    Ok(count.0)
}

/// Delete the archive for a profile
pub async fn clear_messages(pool: &SqlitePool, profile_id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM messages WHERE profile_id = ?")
        .bind(profile_id)
        .execute(pool)
        .await
        .map_err(|e| Error::DatabaseError(e.to_string()))?;

    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encryption::EncryptedToken;
    use crate::sqlite::{create_profile, Database};

    fn message(id: i64, text: &str, from_user: bool) -> ChatMessage {
        ChatMessage {
            id,
            text: text.to_string(),
            from_user,
            created_at: "2025-04-01T10:00:00Z".to_string(),
        }
    }

    async fn setup() -> (Database, i64) {
        let db = Database::connect_in_memory().await.unwrap();
        let encrypted = EncryptedToken {
            ciphertext: vec![1, 2, 3],
            iv: [0u8; 12],
        };
        let profile_id = create_profile(db.pool(), "tester", Some(42), &encrypted)
            .await
            .unwrap();
        (db, profile_id)
    }

    #[tokio::test]
    async fn test_archive_skips_duplicates() {
        let (db, profile_id) = setup().await;

        let batch = vec![message(1, "hi", true), message(2, "hello", false)];
        let inserted = archive_messages(db.pool(), profile_id, &batch).await.unwrap();
        assert_eq!(inserted, 2);

        // Same batch again plus one new message
        let batch = vec![message(2, "hello", false), message(3, "how?", true)];
        let inserted = archive_messages(db.pool(), profile_id, &batch).await.unwrap();
        assert_eq!(inserted, 1);

        assert_eq!(count_messages(db.pool(), profile_id).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_load_recent_oldest_first() {
        let (db, profile_id) = setup().await;

        let batch = vec![
            message(10, "first", true),
            message(11, "second", false),
            message(12, "third", true),
        ];
        archive_messages(db.pool(), profile_id, &batch).await.unwrap();

        let loaded = load_recent_messages(db.pool(), profile_id, 2).await.unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].id, 11);
        assert_eq!(loaded[1].id, 12);
    }

    #[tokio::test]
    async fn test_clear_messages() {
        let (db, profile_id) = setup().await;

        archive_messages(db.pool(), profile_id, &[message(1, "hi", true)])
            .await
            .unwrap();
        let removed = clear_messages(db.pool(), profile_id).await.unwrap();
        assert_eq!(removed, 1);
        assert_eq!(count_messages(db.pool(), profile_id).await.unwrap(), 0);
    }
}
