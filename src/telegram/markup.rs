//! Keyboard builders for the bot's interactive messages.

use crate::i18n::Catalog;
use crate::models::task_type::STAR;
use crate::models::{Difficulty, ReportVerdict, SkillLevel, TaskType, Timeliness};
use crate::telegram::api::{
    InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, ReplyMarkup,
};
use crate::telegram::callback::CallbackData;

/// Action names carried in callback payloads.
pub mod actions {
    /// Worker takes an offered task.
    pub const CLAIM: &str = "claim";
    /// Worker confirms timeliness.
    pub const TIMELINESS: &str = "timeliness";
    /// Worker marks their task done.
    pub const TASK_DONE: &str = "task_done";
    /// Operator reviews a submitted report.
    pub const REVIEW: &str = "review";
    /// Wizard review → edit-selection state.
    pub const WIZ_EDIT: &str = "edit";
    /// Wizard review → finalize.
    pub const WIZ_CONFIRM: &str = "confirm";
    /// Wizard edit-selection → one step.
    pub const WIZ_STEP: &str = "edit_step";
    /// Wizard edit-selection → back to review.
    pub const WIZ_CANCEL: &str = "cancel_edit";
}

/// Reply keyboard with a single contact-request button.
#[must_use]
pub fn contact_keyboard(catalog: &Catalog, locale: Option<&str>) -> ReplyMarkup {
    ReplyMarkup::reply_row(vec![KeyboardButton::contact(
        catalog.text(locale, "send_contact"),
    )])
}

/// Star-prefixed localized label for a skill tier.
#[must_use]
pub fn skill_label(catalog: &Catalog, locale: Option<&str>, skill: SkillLevel) -> String {
    let stars = STAR.to_string().repeat(skill.tier() + 1);
    format!("{stars} {}", catalog.text(locale, skill.label_key()))
}

/// One-column reply keyboard of the three skill tiers.
#[must_use]
pub fn skill_keyboard(catalog: &Catalog, locale: Option<&str>) -> ReplyMarkup {
    ReplyMarkup::reply_column(
        SkillLevel::ALL
            .iter()
            .map(|skill| KeyboardButton::new(skill_label(catalog, locale, *skill)))
            .collect(),
    )
}

/// Single-row reply keyboard of star runs, one per difficulty tier.
#[must_use]
pub fn difficulty_keyboard() -> ReplyMarkup {
    ReplyMarkup::reply_row(
        Difficulty::ALL
            .iter()
            .map(|difficulty| KeyboardButton::new(difficulty.stars()))
            .collect(),
    )
}

/// One-column reply keyboard of task type labels.
#[must_use]
pub fn task_types_keyboard(task_types: &[TaskType]) -> ReplyMarkup {
    ReplyMarkup::reply_column(
        task_types
            .iter()
            .map(|task_type| KeyboardButton::new(task_type.label()))
            .collect(),
    )
}

/// Inline claim button bound to a task id.
#[must_use]
pub fn claim_keyboard(catalog: &Catalog, locale: Option<&str>, task_id: &str) -> ReplyMarkup {
    ReplyMarkup::inline_column(vec![InlineKeyboardButton::new(
        catalog.text(locale, "take_task"),
        CallbackData::new(actions::CLAIM).with("task", task_id).encode(),
    )])
}

/// Wizard review buttons: edit on the left, confirm on the right.
#[must_use]
pub fn review_keyboard(
    catalog: &Catalog,
    locale: Option<&str>,
    edit_label_key: &str,
    confirm_label_key: &str,
) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup {
        inline_keyboard: vec![vec![
            InlineKeyboardButton::new(
                catalog.text(locale, edit_label_key),
                CallbackData::new(actions::WIZ_EDIT).encode(),
            ),
            InlineKeyboardButton::new(
                catalog.text(locale, confirm_label_key),
                CallbackData::new(actions::WIZ_CONFIRM).encode(),
            ),
        ]],
    }
}

/// Edit-selection buttons: one numbered button per step plus cancel.
#[must_use]
pub fn edit_select_keyboard(
    catalog: &Catalog,
    locale: Option<&str>,
    step_keys: &[&str],
) -> InlineKeyboardMarkup {
    let numbered = step_keys
        .iter()
        .enumerate()
        .map(|(index, key)| {
            InlineKeyboardButton::new(
                (index + 1).to_string(),
                CallbackData::new(actions::WIZ_STEP).with("step", *key).encode(),
            )
        })
        .collect();
    InlineKeyboardMarkup {
        inline_keyboard: vec![
            numbered,
            vec![InlineKeyboardButton::new(
                catalog.text(locale, "cancel_edit"),
                CallbackData::new(actions::WIZ_CANCEL).encode(),
            )],
        ],
    }
}

/// Timeliness confirmation buttons, one per verdict.
#[must_use]
pub fn timeliness_keyboard(catalog: &Catalog, locale: Option<&str>) -> ReplyMarkup {
    let buttons = [
        ("on_time", Timeliness::OnTime),
        ("late", Timeliness::Late),
        ("very_late", Timeliness::VeryLate),
    ]
    .into_iter()
    .map(|(label_key, verdict)| {
        InlineKeyboardButton::new(
            catalog.text(locale, label_key),
            CallbackData::new(actions::TIMELINESS)
                .with("value", verdict.as_str())
                .encode(),
        )
    })
    .collect();
    ReplyMarkup::inline_column(buttons)
}

/// Single "done" button announcing task completion.
#[must_use]
pub fn done_keyboard(catalog: &Catalog, locale: Option<&str>) -> ReplyMarkup {
    ReplyMarkup::inline_column(vec![InlineKeyboardButton::new(
        catalog.text(locale, "task_done"),
        CallbackData::new(actions::TASK_DONE).encode(),
    )])
}

/// Operator review buttons for a submitted work report.
#[must_use]
pub fn review_job_keyboard(catalog: &Catalog, locale: Option<&str>, task_id: &str) -> ReplyMarkup {
    let buttons = [
        ("bad_job", ReportVerdict::BadJob),
        ("bad_photo", ReportVerdict::BadPhoto),
        ("good_job", ReportVerdict::GoodJob),
    ]
    .into_iter()
    .map(|(label_key, verdict)| {
        InlineKeyboardButton::new(
            catalog.text(locale, label_key),
            // Key kept short: the payload must stay under 64 bytes with a
            // UUID task id inside.
            CallbackData::new(actions::REVIEW)
                .with("task", task_id)
                .with("v", verdict.as_str())
                .encode(),
        )
    })
    .collect();
    ReplyMarkup::inline_column(buttons)
}
