//! Task repository, including the claim arbitration and reminder sweeps.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::models::{Task, Timeliness};
use crate::{AppError, Result};

/// Outcome of a claim attempt, arbitrated by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOutcome {
    /// The conditional assignment took effect; the claimant owns the task.
    Won,
    /// Another worker was already assigned.
    AlreadyTaken,
    /// The task's scheduled time has passed.
    Expired,
    /// The task no longer exists.
    Gone,
}

/// Worker ids affected by one reminder sweep pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepResult {
    /// Workers to prompt for a timeliness confirmation.
    pub confirm: Vec<String>,
    /// Workers whose task start must be announced.
    pub started: Vec<String>,
}

/// Repository wrapper for task records.
#[derive(Clone)]
pub struct TaskRepo {
    db: Arc<SqlitePool>,
}

impl TaskRepo {
    /// Create a new repository instance.
    #[must_use]
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Insert a new task record.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the insert fails.
    pub async fn create(&self, task: &Task) -> Result<()> {
        sqlx::query(
            "INSERT INTO tasks (id, location, scheduled_at, contact, comment, payment, \
             type_id, worker_id, timeliness, start_notified, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )
        .bind(&task.id)
        .bind(&task.location)
        .bind(task.scheduled_at)
        .bind(&task.contact)
        .bind(&task.comment)
        .bind(task.payment)
        .bind(&task.type_id)
        .bind(&task.worker_id)
        .bind(task.timeliness)
        .bind(task.start_notified)
        .bind(task.created_at)
        .execute(&*self.db)
        .await?;
        Ok(())
    }

    /// Retrieve a task by identifier.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the task does not exist.
    pub async fn get(&self, id: &str) -> Result<Task> {
        let task = sqlx::query_as::<_, Task>(
            "SELECT id, location, scheduled_at, contact, comment, payment, type_id, \
             worker_id, timeliness, start_notified, created_at FROM tasks WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&*self.db)
        .await?;
        task.ok_or_else(|| AppError::NotFound(format!("task {id} not found")))
    }

    /// Attempt to assign a task to a worker.
    ///
    /// The single conditional UPDATE — assign iff still unassigned and not
    /// yet due — is the sole arbiter of mutual exclusion; the follow-up
    /// read only classifies a failure. The winner's `workers.task_id`
    /// reference is set in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the transaction fails.
    pub async fn claim(
        &self,
        task_id: &str,
        worker_id: &str,
        now: DateTime<Utc>,
    ) -> Result<ClaimOutcome> {
        let mut tx = self.db.begin().await?;

        let affected = sqlx::query(
            "UPDATE tasks SET worker_id = ?1 \
             WHERE id = ?2 AND worker_id IS NULL AND scheduled_at > ?3",
        )
        .bind(worker_id)
        .bind(task_id)
        .bind(now)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if affected == 1 {
            sqlx::query("UPDATE workers SET task_id = ?1 WHERE id = ?2")
                .bind(task_id)
                .bind(worker_id)
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;
            return Ok(ClaimOutcome::Won);
        }

        // Zero rows affected — classify why within the same transaction.
        let row: Option<(Option<String>, DateTime<Utc>)> =
            sqlx::query_as("SELECT worker_id, scheduled_at FROM tasks WHERE id = ?1")
                .bind(task_id)
                .fetch_optional(&mut *tx)
                .await?;
        tx.commit().await?;

        Ok(match row {
            None => ClaimOutcome::Gone,
            Some((Some(_), _)) => ClaimOutcome::AlreadyTaken,
            // Unassigned but the conditional failed: only the time guard
            // can have rejected it.
            Some((None, _)) => ClaimOutcome::Expired,
        })
    }

    /// Record a worker's timeliness confirmation.
    ///
    /// Scoped to the `unknown` placeholder the sweep stamped so a stale
    /// button press cannot clobber later state. Returns affected rows.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the update fails.
    pub async fn confirm_timeliness(
        &self,
        worker_id: &str,
        timeliness: Timeliness,
    ) -> Result<u64> {
        let affected = sqlx::query(
            "UPDATE tasks SET timeliness = ?2 \
             WHERE worker_id = ?1 AND timeliness = 'unknown'",
        )
        .bind(worker_id)
        .bind(timeliness)
        .execute(&*self.db)
        .await?
        .rows_affected();
        Ok(affected)
    }

    /// Run both reminder sweep updates in one transaction.
    ///
    /// 1. Assigned tasks due within `lookahead` with unset timeliness get
    ///    the `unknown` fallback stamped.
    /// 2. Assigned tasks already due and not yet announced get the start
    ///    flag set.
    ///
    /// The transaction commits before any notification is sent, so the
    /// pool connection is never held across the fan-out. Re-running the
    /// sweep immediately affects zero rows.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the transaction fails.
    pub async fn sweep_due(&self, now: DateTime<Utc>, lookahead: Duration) -> Result<SweepResult> {
        let horizon = now
            + chrono::Duration::from_std(lookahead)
                .map_err(|err| AppError::Db(format!("lookahead out of range: {err}")))?;

        let mut tx = self.db.begin().await?;

        let confirm: Vec<String> = sqlx::query_scalar(
            "UPDATE tasks SET timeliness = 'unknown' \
             WHERE scheduled_at <= ?1 AND worker_id IS NOT NULL AND timeliness IS NULL \
             RETURNING worker_id",
        )
        .bind(horizon)
        .fetch_all(&mut *tx)
        .await?;

        let started: Vec<String> = sqlx::query_scalar(
            "UPDATE tasks SET start_notified = 1 \
             WHERE scheduled_at <= ?1 AND worker_id IS NOT NULL AND start_notified = 0 \
             RETURNING worker_id",
        )
        .bind(now)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(SweepResult { confirm, started })
    }
}
