//! Completed-work report repository.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::models::{Report, ReportVerdict};
use crate::Result;

/// Repository wrapper for work report records.
#[derive(Clone)]
pub struct ReportRepo {
    db: Arc<SqlitePool>,
}

impl ReportRepo {
    /// Create a new repository instance.
    #[must_use]
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Insert a pending report.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the insert fails.
    pub async fn create(&self, report: &Report) -> Result<()> {
        sqlx::query(
            "INSERT INTO reports (id, task_id, worker_id, photo_message_id, verdict, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&report.id)
        .bind(&report.task_id)
        .bind(&report.worker_id)
        .bind(report.photo_message_id)
        .bind(report.verdict)
        .bind(report.created_at)
        .execute(&*self.db)
        .await?;
        Ok(())
    }

    /// Stamp the operator verdict on a task's pending reports.
    ///
    /// Returns affected rows; zero means no review was outstanding.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the update fails.
    pub async fn set_verdict(&self, task_id: &str, verdict: ReportVerdict) -> Result<u64> {
        let affected =
            sqlx::query("UPDATE reports SET verdict = ?2 WHERE task_id = ?1 AND verdict IS NULL")
                .bind(task_id)
                .bind(verdict)
                .execute(&*self.db)
                .await?
                .rows_affected();
        Ok(affected)
    }

    /// Most recent report for a task, if any.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn latest_for_task(&self, task_id: &str) -> Result<Option<Report>> {
        let report = sqlx::query_as::<_, Report>(
            "SELECT id, task_id, worker_id, photo_message_id, verdict, created_at \
             FROM reports WHERE task_id = ?1 ORDER BY created_at DESC LIMIT 1",
        )
        .bind(task_id)
        .fetch_optional(&*self.db)
        .await?;
        Ok(report)
    }
}
