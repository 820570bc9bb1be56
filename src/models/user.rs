//! Chat participant identity record.

use serde::{Deserialize, Serialize};

/// A chat participant, created on first inbound update and refreshed on
/// every subsequent one. The conversation state columns backing the same
/// row are owned by the conversation store, not this model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct User {
    /// Platform-assigned stable identifier (also the chat id).
    pub id: i64,
    /// First name as reported by the platform.
    pub first_name: String,
    /// Last name, when the platform provides one.
    pub last_name: Option<String>,
    /// Public username, when set.
    pub username: Option<String>,
    /// Preferred locale code reported by the client.
    pub locale: Option<String>,
}
