//! Completed-work report model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Operator verdict on a submitted work report.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum ReportVerdict {
    /// Work accepted; the worker is released.
    GoodJob,
    /// Work must be redone.
    BadJob,
    /// Photo must be retaken.
    BadPhoto,
}

impl ReportVerdict {
    /// Storage code, identical to the serde form.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::GoodJob => "good_job",
            Self::BadJob => "bad_job",
            Self::BadPhoto => "bad_photo",
        }
    }

    /// Parse a storage code.
    #[must_use]
    pub fn from_str_code(code: &str) -> Option<Self> {
        match code {
            "good_job" => Some(Self::GoodJob),
            "bad_job" => Some(Self::BadJob),
            "bad_photo" => Some(Self::BadPhoto),
            _ => None,
        }
    }
}

/// A photo submission for a finished task, awaiting operator review.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct Report {
    /// Opaque unique identifier.
    pub id: String,
    /// Task the report closes out.
    pub task_id: String,
    /// Worker who submitted the report.
    pub worker_id: String,
    /// Platform message id of the submitted photo.
    pub photo_message_id: i64,
    /// Operator verdict; `None` while review is pending.
    pub verdict: Option<ReportVerdict>,
    /// Submission timestamp.
    pub created_at: DateTime<Utc>,
}

impl Report {
    /// Construct a pending report with a generated identifier.
    #[must_use]
    pub fn new(task_id: String, worker_id: String, photo_message_id: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            task_id,
            worker_id,
            photo_message_id,
            verdict: None,
            created_at: Utc::now(),
        }
    }
}
