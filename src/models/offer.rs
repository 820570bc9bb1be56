//! In-flight broadcast offer record.

use serde::{Deserialize, Serialize};

/// One outbound offer message sent to one worker for one task.
///
/// Keyed by `(worker_id, message_id)` so the message can be retracted
/// later; rows are deleted once retracted or superseded by a claim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct Offer {
    /// Worker the offer was delivered to (also the chat id).
    pub worker_id: String,
    /// Platform message id of the delivered offer.
    pub message_id: i64,
    /// Task the offer is for.
    pub task_id: String,
}
