//! User repository.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::models::User;
use crate::Result;

/// Repository wrapper for chat participant records.
#[derive(Clone)]
pub struct UserRepo {
    db: Arc<SqlitePool>,
}

impl UserRepo {
    /// Create a new repository instance.
    #[must_use]
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Insert a user on first contact or refresh their name fields.
    ///
    /// `initial_state` seeds the conversation state for brand-new rows
    /// only; existing rows keep whatever state they are in.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the upsert fails.
    pub async fn upsert(&self, user: &User, initial_state: Option<&str>) -> Result<()> {
        sqlx::query(
            "INSERT INTO users (id, first_name, last_name, username, locale, state, data) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, '{}') \
             ON CONFLICT(id) DO UPDATE SET \
                 first_name = excluded.first_name, \
                 last_name = excluded.last_name, \
                 username = excluded.username, \
                 locale = excluded.locale",
        )
        .bind(user.id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.username)
        .bind(&user.locale)
        .bind(initial_state)
        .execute(&*self.db)
        .await?;
        Ok(())
    }

    /// Retrieve a user by identifier.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn get(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, first_name, last_name, username, locale FROM users WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&*self.db)
        .await?;
        Ok(user)
    }

    /// Preferred locale for a user, if known.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn locale(&self, id: i64) -> Result<Option<String>> {
        let locale: Option<Option<String>> =
            sqlx::query_scalar("SELECT locale FROM users WHERE id = ?1")
                .bind(id)
                .fetch_optional(&*self.db)
                .await?;
        Ok(locale.flatten())
    }
}
