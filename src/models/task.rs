//! Task model and timeliness outcomes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Post-hoc classification of whether a task started on schedule.
///
/// Absent (`NULL` in storage) means "unset"; the reminder sweep stamps
/// `Unknown` as the fallback when the worker never confirms.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum Timeliness {
    /// Worker confirmed an on-schedule start.
    OnTime,
    /// Worker confirmed a small delay.
    Late,
    /// Worker confirmed a large delay.
    VeryLate,
    /// Never confirmed; stamped by the reminder sweep.
    Unknown,
}

impl Timeliness {
    /// Storage code, identical to the serde form.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OnTime => "on_time",
            Self::Late => "late",
            Self::VeryLate => "very_late",
            Self::Unknown => "unknown",
        }
    }

    /// Parse a storage code.
    #[must_use]
    pub fn from_str_code(code: &str) -> Option<Self> {
        match code {
            "on_time" => Some(Self::OnTime),
            "late" => Some(Self::Late),
            "very_late" => Some(Self::VeryLate),
            "unknown" => Some(Self::Unknown),
            _ => None,
        }
    }
}

/// A unit of work created by the operator and claimed by one worker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct Task {
    /// Opaque unique identifier.
    pub id: String,
    /// Where the work happens.
    pub location: String,
    /// Scheduled start instant.
    pub scheduled_at: DateTime<Utc>,
    /// On-site contact string.
    pub contact: String,
    /// Optional free-text comment.
    pub comment: Option<String>,
    /// Payment amount; always positive.
    pub payment: i64,
    /// Referenced catalog entry.
    pub type_id: String,
    /// Assigned worker; `None` means unclaimed. One-way transition.
    pub worker_id: Option<String>,
    /// Timeliness outcome; `None` means unset.
    pub timeliness: Option<Timeliness>,
    /// Whether the "task started" notification has been sent.
    pub start_notified: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Construct an unclaimed task with a generated identifier.
    #[must_use]
    pub fn new(
        location: String,
        scheduled_at: DateTime<Utc>,
        contact: String,
        comment: Option<String>,
        payment: i64,
        type_id: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            location,
            scheduled_at,
            contact,
            comment,
            payment,
            type_id,
            worker_id: None,
            timeliness: None,
            start_notified: false,
            created_at: Utc::now(),
        }
    }
}
