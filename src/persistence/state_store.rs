//! Per-user conversation state and data bag.
//!
//! Backs the wizard engine: one nullable state name plus a JSON bag per
//! user, stored on the `users` row. Every operation is a single SQL
//! statement so rapid consecutive messages from one user cannot lose
//! updates to an application-memory read-then-write.

use std::sync::Arc;

use serde_json::{Map, Value};
use sqlx::SqlitePool;

use crate::{AppError, Result};

/// Conversation state store over the shared pool.
#[derive(Clone)]
pub struct ConversationStore {
    db: Arc<SqlitePool>,
}

impl ConversationStore {
    /// Create a new store instance.
    #[must_use]
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Fetch the current state name and data bag for a user.
    ///
    /// An unknown user is idle with an empty bag.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` on query failure or a malformed stored bag.
    pub async fn get(&self, user_id: i64) -> Result<(Option<String>, Map<String, Value>)> {
        let row: Option<(Option<String>, String)> =
            sqlx::query_as("SELECT state, data FROM users WHERE id = ?1")
                .bind(user_id)
                .fetch_optional(&*self.db)
                .await?;

        let Some((state, raw)) = row else {
            return Ok((None, Map::new()));
        };
        let bag: Map<String, Value> = serde_json::from_str(&raw)
            .map_err(|err| AppError::Db(format!("malformed data bag for user {user_id}: {err}")))?;
        Ok((state, bag))
    }

    /// Set or clear the state name; the data bag is untouched.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the update fails.
    pub async fn set_state(&self, user_id: i64, state: Option<&str>) -> Result<()> {
        sqlx::query("UPDATE users SET state = ?2 WHERE id = ?1")
            .bind(user_id)
            .bind(state)
            .execute(&*self.db)
            .await?;
        Ok(())
    }

    /// Merge a partial bag into the stored one.
    ///
    /// Uses `json_patch` so the merge happens inside the store, atomically
    /// at the statement level.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the update fails.
    pub async fn merge_data(&self, user_id: i64, partial: &Map<String, Value>) -> Result<()> {
        let patch = Value::Object(partial.clone()).to_string();
        sqlx::query("UPDATE users SET data = json_patch(data, ?2) WHERE id = ?1")
            .bind(user_id)
            .bind(patch)
            .execute(&*self.db)
            .await?;
        Ok(())
    }

    /// Merge a single key into the stored bag.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the update fails.
    pub async fn merge_one(&self, user_id: i64, key: &str, value: Value) -> Result<()> {
        let mut partial = Map::new();
        partial.insert(key.to_owned(), value);
        self.merge_data(user_id, &partial).await
    }

    /// Clear the state name and, optionally, the data bag.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the update fails.
    pub async fn reset(&self, user_id: i64, clear_data: bool) -> Result<()> {
        let sql = if clear_data {
            "UPDATE users SET state = NULL, data = '{}' WHERE id = ?1"
        } else {
            "UPDATE users SET state = NULL WHERE id = ?1"
        };
        sqlx::query(sql).bind(user_id).execute(&*self.db).await?;
        Ok(())
    }
}
