//! Tagged field parsers and renderers for wizard steps.
//!
//! Each wizard step names a [`FieldKind`]; parsing and display dispatch
//! on the tag so every parser stays a plain function testable without
//! transport wiring.

use std::sync::OnceLock;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use regex::Regex;
use serde_json::Value;

use crate::dispatch::BotContext;
use crate::models::task_type::{self, STAR};
use crate::models::{Difficulty, SkillLevel};
use crate::phone;
use crate::telegram::api::ReplyMarkup;
use crate::telegram::markup;
use crate::{AppError, Result};

/// The kinds of input a wizard step can collect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Free text, title-cased per word.
    PersonName,
    /// Phone number, canonicalized.
    Phone,
    /// Skill tier picked from the star keyboard.
    Skill,
    /// Positive integer payment.
    Payment,
    /// Free text location.
    Location,
    /// Schedule instant parsed from `HH:MM` with optional `DD.MM`.
    Time,
    /// Free text contact.
    Contact,
    /// Optional free text; a lone `-` means none.
    Comment,
    /// Existing task type picked from the catalog keyboard.
    TaskType,
    /// New task type name, capitalized.
    TypeName,
    /// Difficulty tier picked from the star keyboard.
    Difficulty,
}

/// Outcome of parsing one raw input against a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed {
    /// Parsed value to write into the data bag.
    Ok(Value),
    /// Validation failed; the catalog key of the error to send.
    Invalid(&'static str),
}

/// Parse raw user input for a field.
///
/// Catalog-backed fields consult the store; plain fields never touch it.
///
/// # Errors
///
/// Returns `AppError::Db` if a catalog lookup fails.
pub async fn parse(ctx: &BotContext, field: FieldKind, raw: &str) -> Result<Parsed> {
    let text = raw.trim();
    Ok(match field {
        FieldKind::PersonName => Parsed::Ok(Value::String(title_case(text))),
        FieldKind::Phone => {
            match phone::canonicalize(text, &ctx.config.default_country_code) {
                Ok(canonical) => Parsed::Ok(Value::String(canonical)),
                Err(_) => Parsed::Invalid("phone_parse_error"),
            }
        }
        FieldKind::Skill => match parse_star_run(text.split_whitespace().next().unwrap_or("")) {
            Some(tier) => match SkillLevel::from_tier(tier) {
                Some(skill) => Parsed::Ok(Value::String(skill.as_str().to_owned())),
                None => Parsed::Invalid("skill_invalid_error"),
            },
            None => Parsed::Invalid("skill_invalid_error"),
        },
        FieldKind::Payment => match text.parse::<i64>() {
            Ok(payment) if payment > 0 => Parsed::Ok(Value::from(payment)),
            Ok(_) => Parsed::Invalid("not_positive_error"),
            Err(_) => Parsed::Invalid("not_integer_error"),
        },
        FieldKind::Location | FieldKind::Contact => Parsed::Ok(Value::String(text.to_owned())),
        FieldKind::Comment => {
            if text == "-" {
                Parsed::Ok(Value::Null)
            } else {
                Parsed::Ok(Value::String(text.to_owned()))
            }
        }
        FieldKind::Time => match parse_schedule(text, Utc::now(), ctx.config_tz()) {
            Ok(at) => Parsed::Ok(Value::String(at.to_rfc3339())),
            Err(TimeParseError::NoTime) => Parsed::Invalid("no_time_error"),
            Err(TimeParseError::InvalidDate) => Parsed::Invalid("invalid_date_error"),
        },
        FieldKind::TaskType => {
            let Some((name, difficulty)) = task_type::parse_label(text) else {
                return Ok(Parsed::Invalid("task_type_invalid_error"));
            };
            match ctx.task_types().find(&name, difficulty).await? {
                Some(task_type) => Parsed::Ok(Value::String(task_type.id)),
                None => Parsed::Invalid("task_type_not_found_error"),
            }
        }
        FieldKind::TypeName => Parsed::Ok(Value::String(capitalize(&text.to_lowercase()))),
        FieldKind::Difficulty => match parse_star_run(text) {
            Some(tier) => match Difficulty::from_tier(tier) {
                Some(difficulty) => Parsed::Ok(Value::String(difficulty.as_str().to_owned())),
                None => Parsed::Invalid("unknown_difficulty_error"),
            },
            None => Parsed::Invalid("unknown_difficulty_error"),
        },
    })
}

/// Render a bag value for review lines.
///
/// # Errors
///
/// Returns `AppError::Db` on catalog lookup failure and
/// `AppError::Validation` when the bag value has the wrong shape.
pub async fn display(
    ctx: &BotContext,
    locale: Option<&str>,
    field: FieldKind,
    value: &Value,
) -> Result<String> {
    match field {
        FieldKind::Payment => value
            .as_i64()
            .map(|payment| payment.to_string())
            .ok_or_else(|| AppError::Validation("payment bag value is not an integer".into())),
        FieldKind::Comment => Ok(value
            .as_str()
            .map_or_else(|| ctx.text(locale, "no_comment"), str::to_owned)),
        FieldKind::Time => {
            let raw = value
                .as_str()
                .ok_or_else(|| AppError::Validation("time bag value is not a string".into()))?;
            let at = DateTime::parse_from_rfc3339(raw)
                .map_err(|err| AppError::Validation(format!("bad stored time: {err}")))?;
            Ok(format_schedule(at.with_timezone(&Utc), ctx.config_tz()))
        }
        FieldKind::Skill => {
            let code = value
                .as_str()
                .ok_or_else(|| AppError::Validation("skill bag value is not a string".into()))?;
            let skill = SkillLevel::ALL
                .into_iter()
                .find(|skill| skill.as_str() == code)
                .ok_or_else(|| AppError::Validation(format!("unknown skill code {code}")))?;
            Ok(markup::skill_label(&ctx.catalog, locale, skill))
        }
        FieldKind::TaskType => {
            let id = value
                .as_str()
                .ok_or_else(|| AppError::Validation("type bag value is not a string".into()))?;
            Ok(ctx.task_types().get(id).await?.label())
        }
        _ => value
            .as_str()
            .map(str::to_owned)
            .ok_or_else(|| AppError::Validation("bag value is not a string".into())),
    }
}

/// Reply keyboard to attach to a field's prompt, when it has one.
///
/// # Errors
///
/// Returns `AppError::Db` if the catalog listing fails.
pub async fn keyboard(
    ctx: &BotContext,
    locale: Option<&str>,
    field: FieldKind,
) -> Result<Option<ReplyMarkup>> {
    Ok(match field {
        FieldKind::Skill => Some(markup::skill_keyboard(&ctx.catalog, locale)),
        FieldKind::Difficulty => Some(markup::difficulty_keyboard()),
        FieldKind::TaskType => {
            let task_types = ctx.task_types().list_ordered().await?;
            if task_types.is_empty() {
                None
            } else {
                Some(markup::task_types_keyboard(&task_types))
            }
        }
        _ => None,
    })
}

// ── Plain parsing helpers ────────────────────────────────

/// Title-case every whitespace-separated word.
#[must_use]
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| capitalize(&word.to_lowercase()))
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Tier index encoded as a star run; `None` unless the token is 1-3 stars.
fn parse_star_run(token: &str) -> Option<usize> {
    let count = token.chars().count();
    if (1..=3).contains(&count) && token.chars().all(|c| c == STAR) {
        Some(count - 1)
    } else {
        None
    }
}

/// Time parsing failures, each mapped to its own error message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeParseError {
    /// No `HH:MM` pattern found.
    NoTime,
    /// The named instant does not exist on the calendar.
    InvalidDate,
}

static TIME_RE: OnceLock<Regex> = OnceLock::new();
static DATE_RE: OnceLock<Regex> = OnceLock::new();

fn time_re() -> &'static Regex {
    TIME_RE.get_or_init(|| {
        Regex::new(r"(\d{1,2}):(\d{1,2})")
            .unwrap_or_else(|err| unreachable!("time regex: {err}"))
    })
}

fn date_re() -> &'static Regex {
    DATE_RE.get_or_init(|| {
        Regex::new(r"(\d{1,2})[./-](\d{1,2})")
            .unwrap_or_else(|err| unreachable!("date regex: {err}"))
    })
}

/// Parse `HH:MM` with an optional `DD.MM` date into a UTC instant.
///
/// Without a date the next occurrence of that wall-clock time is used;
/// a dated instant already in the past rolls to the next year.
///
/// # Errors
///
/// Returns [`TimeParseError`] when no time is present or the instant
/// does not exist.
pub fn parse_schedule(
    text: &str,
    now: DateTime<Utc>,
    tz: FixedOffset,
) -> std::result::Result<DateTime<Utc>, TimeParseError> {
    let time_caps = time_re().captures(text).ok_or(TimeParseError::NoTime)?;
    let hour: u32 = time_caps[1].parse().map_err(|_| TimeParseError::NoTime)?;
    let minute: u32 = time_caps[2].parse().map_err(|_| TimeParseError::NoTime)?;
    let time = NaiveTime::from_hms_opt(hour, minute, 0).ok_or(TimeParseError::InvalidDate)?;

    let now_local = now.with_timezone(&tz);

    let local = if let Some(date_caps) = date_re().captures(text) {
        let day: u32 = date_caps[1].parse().map_err(|_| TimeParseError::InvalidDate)?;
        let month: u32 = date_caps[2].parse().map_err(|_| TimeParseError::InvalidDate)?;
        let dated = |year: i32| {
            NaiveDate::from_ymd_opt(year, month, day)
                .map(|date| date.and_time(time))
                .and_then(|naive| tz.from_local_datetime(&naive).single())
        };
        let this_year = dated(now_local.year()).ok_or(TimeParseError::InvalidDate)?;
        if this_year <= now_local {
            dated(now_local.year() + 1).ok_or(TimeParseError::InvalidDate)?
        } else {
            this_year
        }
    } else {
        let today = now_local.date_naive().and_time(time);
        let today = tz
            .from_local_datetime(&today)
            .single()
            .ok_or(TimeParseError::InvalidDate)?;
        if today <= now_local {
            today + chrono::Duration::days(1)
        } else {
            today
        }
    };

    Ok(local.with_timezone(&Utc))
}

/// Render an instant as `DD.MM HH:MM` in the configured offset.
#[must_use]
pub fn format_schedule(at: DateTime<Utc>, tz: FixedOffset) -> String {
    at.with_timezone(&tz).format("%d.%m %H:%M").to_string()
}
