//! Task type catalog repository.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::models::{Difficulty, TaskType};
use crate::{AppError, Result};

/// Repository wrapper for the task type catalog.
#[derive(Clone)]
pub struct TaskTypeRepo {
    db: Arc<SqlitePool>,
}

impl TaskTypeRepo {
    /// Create a new repository instance.
    #[must_use]
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Insert a new catalog entry.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Conflict` if the `(name, difficulty)` pair
    /// already exists, `AppError::Db` for any other persistence failure.
    pub async fn create(&self, task_type: &TaskType) -> Result<()> {
        sqlx::query("INSERT INTO task_types (id, name, difficulty) VALUES (?1, ?2, ?3)")
            .bind(&task_type.id)
            .bind(&task_type.name)
            .bind(task_type.difficulty)
            .execute(&*self.db)
            .await
            .map_err(|err| {
                if err
                    .as_database_error()
                    .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
                {
                    AppError::Conflict(format!(
                        "task type ({}, {}) already exists",
                        task_type.name,
                        task_type.difficulty.as_str()
                    ))
                } else {
                    AppError::from(err)
                }
            })?;
        Ok(())
    }

    /// Retrieve a catalog entry by identifier.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the entry does not exist.
    pub async fn get(&self, id: &str) -> Result<TaskType> {
        let task_type = sqlx::query_as::<_, TaskType>(
            "SELECT id, name, difficulty FROM task_types WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&*self.db)
        .await?;
        task_type.ok_or_else(|| AppError::NotFound(format!("task type {id} not found")))
    }

    /// Find a catalog entry by its unique pair.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn find(&self, name: &str, difficulty: Difficulty) -> Result<Option<TaskType>> {
        let task_type = sqlx::query_as::<_, TaskType>(
            "SELECT id, name, difficulty FROM task_types WHERE name = ?1 AND difficulty = ?2",
        )
        .bind(name)
        .bind(difficulty)
        .fetch_optional(&*self.db)
        .await?;
        Ok(task_type)
    }

    /// All catalog entries, ordered by tier then name for stable keyboards.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn list_ordered(&self) -> Result<Vec<TaskType>> {
        let task_types = sqlx::query_as::<_, TaskType>(
            "SELECT id, name, difficulty FROM task_types \
             ORDER BY CASE difficulty WHEN 'easy' THEN 0 WHEN 'medium' THEN 1 ELSE 2 END, name",
        )
        .fetch_all(&*self.db)
        .await?;
        Ok(task_types)
    }

    /// Delete a catalog entry by its unique pair.
    ///
    /// Conditional delete; returns the deleted id when a row matched.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the delete fails.
    pub async fn delete(&self, name: &str, difficulty: Difficulty) -> Result<Option<String>> {
        let id: Option<String> = sqlx::query_scalar(
            "DELETE FROM task_types WHERE name = ?1 AND difficulty = ?2 RETURNING id",
        )
        .bind(name)
        .bind(difficulty)
        .fetch_optional(&*self.db)
        .await?;
        Ok(id)
    }
}
