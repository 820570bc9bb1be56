//! Worker repository.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::models::{Difficulty, Worker};
use crate::{AppError, Result};

/// Repository wrapper for field-crew worker records.
#[derive(Clone)]
pub struct WorkerRepo {
    db: Arc<SqlitePool>,
}

impl WorkerRepo {
    /// Create a new repository instance.
    #[must_use]
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Insert a new worker record.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Conflict` if the phone number is already taken,
    /// `AppError::Db` for any other persistence failure.
    pub async fn create(&self, worker: &Worker) -> Result<()> {
        sqlx::query(
            "INSERT INTO workers (id, name, phone, skill, task_id) VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&worker.id)
        .bind(&worker.name)
        .bind(&worker.phone)
        .bind(worker.skill)
        .bind(&worker.task_id)
        .execute(&*self.db)
        .await
        .map_err(|err| {
            if err
                .as_database_error()
                .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
            {
                AppError::Conflict(format!("worker phone {} already exists", worker.phone))
            } else {
                AppError::from(err)
            }
        })?;
        Ok(())
    }

    /// Retrieve a worker by identifier.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the worker does not exist.
    pub async fn get(&self, id: &str) -> Result<Worker> {
        let worker = sqlx::query_as::<_, Worker>(
            "SELECT id, name, phone, skill, task_id FROM workers WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&*self.db)
        .await?;
        worker.ok_or_else(|| AppError::NotFound(format!("worker {id} not found")))
    }

    /// Bind a registering user id to the worker row matching a phone.
    ///
    /// Conditional update; returns the worker's name when a row matched,
    /// `None` when no worker has that phone.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the update fails.
    pub async fn register_by_phone(&self, phone: &str, user_id: i64) -> Result<Option<String>> {
        let name: Option<String> =
            sqlx::query_scalar("UPDATE workers SET id = ?2 WHERE phone = ?1 RETURNING name")
                .bind(phone)
                .bind(user_id.to_string())
                .fetch_optional(&*self.db)
                .await?;
        Ok(name)
    }

    /// Workers whose skill tier matches the difficulty and who have no
    /// current task.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn eligible_for(&self, difficulty: Difficulty) -> Result<Vec<Worker>> {
        let workers = sqlx::query_as::<_, Worker>(
            "SELECT id, name, phone, skill, task_id FROM workers \
             WHERE skill = ?1 AND task_id IS NULL",
        )
        .bind(difficulty.matching_skill())
        .fetch_all(&*self.db)
        .await?;
        Ok(workers)
    }

    /// Clear a worker's current task reference, freeing them for offers.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the update fails.
    pub async fn release(&self, id: &str) -> Result<()> {
        sqlx::query("UPDATE workers SET task_id = NULL WHERE id = ?1")
            .bind(id)
            .execute(&*self.db)
            .await?;
        Ok(())
    }

    /// The worker a task is assigned to.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the task is unknown or unassigned.
    pub async fn get_for_task(&self, task_id: &str) -> Result<Worker> {
        let worker = sqlx::query_as::<_, Worker>(
            "SELECT w.id, w.name, w.phone, w.skill, w.task_id FROM workers w \
             JOIN tasks t ON t.worker_id = w.id WHERE t.id = ?1",
        )
        .bind(task_id)
        .fetch_optional(&*self.db)
        .await?;
        worker.ok_or_else(|| AppError::NotFound(format!("no worker assigned to task {task_id}")))
    }
}
