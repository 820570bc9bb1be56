//! Broadcast offer repository.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::models::Offer;
use crate::Result;

/// Repository wrapper for in-flight broadcast offers.
#[derive(Clone)]
pub struct OfferRepo {
    db: Arc<SqlitePool>,
}

impl OfferRepo {
    /// Create a new repository instance.
    #[must_use]
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Record a delivered offer message.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the insert fails.
    pub async fn record(&self, offer: &Offer) -> Result<()> {
        sqlx::query("INSERT INTO offers (worker_id, message_id, task_id) VALUES (?1, ?2, ?3)")
            .bind(&offer.worker_id)
            .bind(offer.message_id)
            .bind(&offer.task_id)
            .execute(&*self.db)
            .await?;
        Ok(())
    }

    /// Delete the offer row for one delivered message.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the delete fails.
    pub async fn delete_for_message(&self, worker_id: &str, message_id: i64) -> Result<()> {
        sqlx::query("DELETE FROM offers WHERE worker_id = ?1 AND message_id = ?2")
            .bind(worker_id)
            .bind(message_id)
            .execute(&*self.db)
            .await?;
        Ok(())
    }

    /// Remove and return every outstanding offer for a task except the
    /// winner's, for retraction.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the delete fails.
    pub async fn take_losers(&self, task_id: &str, winner_id: &str) -> Result<Vec<Offer>> {
        let losers = sqlx::query_as::<_, Offer>(
            "DELETE FROM offers WHERE task_id = ?1 AND worker_id != ?2 \
             RETURNING worker_id, message_id, task_id",
        )
        .bind(task_id)
        .bind(winner_id)
        .fetch_all(&*self.db)
        .await?;
        Ok(losers)
    }

    /// All outstanding offers for a task.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Db` if the query fails.
    pub async fn list_for_task(&self, task_id: &str) -> Result<Vec<Offer>> {
        let offers = sqlx::query_as::<_, Offer>(
            "SELECT worker_id, message_id, task_id FROM offers WHERE task_id = ?1",
        )
        .bind(task_id)
        .fetch_all(&*self.db)
        .await?;
        Ok(offers)
    }
}
