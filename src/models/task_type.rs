//! Task type catalog entry and difficulty tiers.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::worker::SkillLevel;

/// Star character used in difficulty and skill labels.
pub const STAR: char = '\u{2b50}';

/// Ordered task difficulty tiers, lowest to highest.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum Difficulty {
    /// Routine work, no repair skill required.
    Easy,
    /// Requires simple repair skill.
    Medium,
    /// Requires electrical repair skill.
    Hard,
}

impl Difficulty {
    /// All tiers in ascending order.
    pub const ALL: [Self; 3] = [Self::Easy, Self::Medium, Self::Hard];

    /// Zero-based ordinal of this tier.
    #[must_use]
    pub fn tier(self) -> usize {
        match self {
            Self::Easy => 0,
            Self::Medium => 1,
            Self::Hard => 2,
        }
    }

    /// Tier from a zero-based ordinal.
    #[must_use]
    pub fn from_tier(tier: usize) -> Option<Self> {
        Self::ALL.get(tier).copied()
    }

    /// The skill tier eligible for this difficulty.
    #[must_use]
    pub fn matching_skill(self) -> SkillLevel {
        match self {
            Self::Easy => SkillLevel::None,
            Self::Medium => SkillLevel::Basic,
            Self::Hard => SkillLevel::Electrical,
        }
    }

    /// Storage code, identical to the serde form.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }

    /// Star run rendered in keyboard labels, one star per tier step.
    #[must_use]
    pub fn stars(self) -> String {
        STAR.to_string().repeat(self.tier() + 1)
    }
}

/// Catalog entry pairing a human name with a difficulty tier.
///
/// The `(name, difficulty)` pair is unique.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct TaskType {
    /// Opaque unique identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Difficulty tier.
    pub difficulty: Difficulty,
}

impl TaskType {
    /// Construct a catalog entry with a generated identifier.
    #[must_use]
    pub fn new(name: String, difficulty: Difficulty) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            difficulty,
        }
    }

    /// Keyboard label: `"{name} ({stars})"`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.difficulty.stars())
    }
}

/// Parse a keyboard label back into `(name, difficulty)`.
///
/// The inverse of [`TaskType::label`]: the trailing parenthesized star run
/// encodes the tier by its length.
#[must_use]
pub fn parse_label(label: &str) -> Option<(String, Difficulty)> {
    let open = label.rfind(" (")?;
    let name = &label[..open];
    let stars = label[open + 2..].strip_suffix(')')?;
    if name.is_empty() || stars.is_empty() || !stars.chars().all(|c| c == STAR) {
        return None;
    }
    let difficulty = Difficulty::from_tier(stars.chars().count() - 1)?;
    Some((name.to_owned(), difficulty))
}
