//! Field-crew worker model and skill tiers.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::task_type::Difficulty;

/// Ordered worker capability tiers, lowest to highest.
///
/// Shares the three-tier ordinal with [`Difficulty`] so eligibility is a
/// direct index match.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum SkillLevel {
    /// No repair capability.
    None,
    /// Simple repair capability.
    Basic,
    /// Electrical repair capability.
    Electrical,
}

impl SkillLevel {
    /// All tiers in ascending order.
    pub const ALL: [Self; 3] = [Self::None, Self::Basic, Self::Electrical];

    /// Zero-based ordinal of this tier.
    #[must_use]
    pub fn tier(self) -> usize {
        match self {
            Self::None => 0,
            Self::Basic => 1,
            Self::Electrical => 2,
        }
    }

    /// Tier from a zero-based ordinal.
    #[must_use]
    pub fn from_tier(tier: usize) -> Option<Self> {
        Self::ALL.get(tier).copied()
    }

    /// The difficulty tier this skill level is matched against.
    #[must_use]
    pub fn matching_difficulty(self) -> Difficulty {
        match self {
            Self::None => Difficulty::Easy,
            Self::Basic => Difficulty::Medium,
            Self::Electrical => Difficulty::Hard,
        }
    }

    /// Storage code, identical to the serde form.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Basic => "basic",
            Self::Electrical => "electrical",
        }
    }

    /// Catalog key for the localized tier label.
    #[must_use]
    pub fn label_key(self) -> &'static str {
        match self {
            Self::None => "skill_none",
            Self::Basic => "skill_basic",
            Self::Electrical => "skill_electrical",
        }
    }
}

/// A user promoted to field-crew status.
///
/// The id is a generated UUID until the worker registers, at which point
/// it is replaced by their platform user id (one-to-one with [`crate::models::User`]).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct Worker {
    /// Worker identifier; equals the platform user id once registered.
    pub id: String,
    /// Display name, title-cased at entry.
    pub name: String,
    /// Canonical phone number; unique.
    pub phone: String,
    /// Capability tier.
    pub skill: SkillLevel,
    /// Currently assigned task, if any.
    pub task_id: Option<String>,
}

impl Worker {
    /// Construct an unregistered worker with a generated identifier.
    #[must_use]
    pub fn new(name: String, phone: String, skill: SkillLevel) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            phone,
            skill,
            task_id: None,
        }
    }

    /// Chat id for outbound sends; `None` until the worker has registered.
    #[must_use]
    pub fn chat_id(&self) -> Option<i64> {
        self.id.parse().ok()
    }
}
