//! Generic multi-step data entry engine.
//!
//! A wizard is a named, ordered list of steps consulted by one dispatch
//! path: on entry a step sends its prompt; the next message is parsed by
//! the step's field, re-prompting on failure and advancing on success.
//! After the last step the wizard either enters a review state (numbered
//! summary with edit/confirm buttons and arbitrary-order field edits) or
//! signals the caller to finalize directly.
//!
//! State names are `"<wizard>:<step>"`, `"<wizard>:review"`, and
//! `"<wizard>:edit"`; the step being edited travels in the data bag.

pub mod fields;
pub mod task;
pub mod task_type;
pub mod worker;

use serde_json::Value;
use tracing::warn;

use crate::dispatch::BotContext;
use crate::telegram::api::CallbackQuery;
use crate::telegram::callback::CallbackData;
use crate::telegram::markup::{self, actions};
use crate::Result;

use fields::{FieldKind, Parsed};

/// State suffix for the review state.
pub const REVIEW_SUFFIX: &str = "review";
/// State suffix for the edit-selection / edit-input state.
pub const EDIT_SUFFIX: &str = "edit";
/// Data-bag key holding the step under edit.
pub const EDIT_STEP_KEY: &str = "edit_step";

/// One wizard step definition.
#[derive(Debug, Clone, Copy)]
pub struct Step {
    /// Data-bag key the parsed value is written under; also the state
    /// suffix and the summary-line placeholder name.
    pub key: &'static str,
    /// Parser/renderer dispatch tag.
    pub field: FieldKind,
    /// Catalog key of the entry prompt.
    pub prompt_key: &'static str,
    /// Catalog key of the prompt used when re-entering from review.
    pub edit_prompt_key: &'static str,
    /// Catalog key of the summary line template.
    pub line_key: &'static str,
}

/// A complete wizard definition.
#[derive(Debug, Clone, Copy)]
pub struct WizardSpec {
    /// State-name prefix.
    pub name: &'static str,
    /// Ordered steps.
    pub steps: &'static [Step],
    /// Whether the wizard ends in a review state. When false the engine
    /// reports [`EngineOutcome::ReadyToFinalize`] after the last step.
    pub review: bool,
    /// Catalog key of the review header.
    pub check_key: &'static str,
    /// Catalog key of the edit-selection header.
    pub editing_key: &'static str,
    /// Catalog key of the review "edit" button label.
    pub edit_label_key: &'static str,
    /// Catalog key of the review "confirm" button label.
    pub confirm_label_key: &'static str,
}

impl WizardSpec {
    /// Full state name for a suffix.
    #[must_use]
    pub fn state_for(&self, suffix: &str) -> String {
        format!("{}:{suffix}", self.name)
    }

    /// Locate a step by key.
    #[must_use]
    pub fn step(&self, key: &str) -> Option<(usize, &Step)> {
        self.steps
            .iter()
            .enumerate()
            .find(|(_, step)| step.key == key)
    }

    /// Step keys in order.
    #[must_use]
    pub fn step_keys(&self) -> Vec<&'static str> {
        self.steps.iter().map(|step| step.key).collect()
    }
}

/// What the dispatcher should do after a message was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineOutcome {
    /// Nothing further; the engine advanced or re-prompted.
    Continue,
    /// A no-review wizard consumed its last step; finalize now.
    ReadyToFinalize,
}

/// Start a wizard: clear any previous state and enter the first step.
///
/// # Errors
///
/// Returns an error if persistence or the transport fails.
pub async fn start(
    ctx: &BotContext,
    spec: &WizardSpec,
    chat_id: i64,
    locale: Option<&str>,
) -> Result<()> {
    ctx.states().reset(chat_id, true).await?;
    let Some(first) = spec.steps.first() else {
        return Ok(());
    };
    enter_step(ctx, spec, chat_id, locale, first).await
}

/// Send a step's prompt and move the state onto it.
async fn enter_step(
    ctx: &BotContext,
    spec: &WizardSpec,
    chat_id: i64,
    locale: Option<&str>,
    step: &Step,
) -> Result<()> {
    let keyboard = fields::keyboard(ctx, locale, step.field).await?;
    if step.field == FieldKind::TaskType && keyboard.is_none() {
        // The catalog emptied out mid-wizard; abort to a stable state.
        ctx.states().reset(chat_id, true).await?;
        ctx.transport
            .send_message(chat_id, &ctx.text(locale, "no_task_types"), None)
            .await?;
        return Ok(());
    }

    ctx.states()
        .set_state(chat_id, Some(&spec.state_for(step.key)))
        .await?;
    ctx.transport
        .send_message(chat_id, &ctx.text(locale, step.prompt_key), keyboard)
        .await?;
    Ok(())
}

/// Handle a message while a wizard state is active.
///
/// `suffix` is the state name with the wizard prefix stripped.
///
/// # Errors
///
/// Returns an error if persistence or the transport fails; validation
/// failures are reported to the user and are not errors.
pub async fn handle_message(
    ctx: &BotContext,
    spec: &WizardSpec,
    chat_id: i64,
    locale: Option<&str>,
    suffix: &str,
    text: &str,
) -> Result<EngineOutcome> {
    if suffix == EDIT_SUFFIX {
        return handle_edit_message(ctx, spec, chat_id, locale, text).await;
    }

    let Some((index, step)) = spec.step(suffix) else {
        warn!(wizard = spec.name, suffix, "message in unknown wizard state");
        return Ok(EngineOutcome::Continue);
    };

    match fields::parse(ctx, step.field, text).await? {
        Parsed::Invalid(error_key) => {
            ctx.transport
                .send_message(chat_id, &ctx.text(locale, error_key), None)
                .await?;
            Ok(EngineOutcome::Continue)
        }
        Parsed::Ok(value) => {
            ctx.states().merge_one(chat_id, step.key, value).await?;
            if let Some(next) = spec.steps.get(index + 1) {
                enter_step(ctx, spec, chat_id, locale, next).await?;
                Ok(EngineOutcome::Continue)
            } else if spec.review {
                send_review(ctx, spec, chat_id, locale, None).await?;
                Ok(EngineOutcome::Continue)
            } else {
                Ok(EngineOutcome::ReadyToFinalize)
            }
        }
    }
}

/// Handle the message carrying a replacement value for an edited step.
///
/// Unlike normal progression this returns straight to review after one
/// successful validation.
async fn handle_edit_message(
    ctx: &BotContext,
    spec: &WizardSpec,
    chat_id: i64,
    locale: Option<&str>,
    text: &str,
) -> Result<EngineOutcome> {
    let (_, bag) = ctx.states().get(chat_id).await?;
    let step = bag
        .get(EDIT_STEP_KEY)
        .and_then(Value::as_str)
        .and_then(|key| spec.step(key))
        .map(|(_, step)| step);

    let Some(step) = step else {
        warn!(wizard = spec.name, "edit state without a valid edit_step");
        send_review(ctx, spec, chat_id, locale, None).await?;
        return Ok(EngineOutcome::Continue);
    };

    match fields::parse(ctx, step.field, text).await? {
        Parsed::Invalid(error_key) => {
            ctx.transport
                .send_message(chat_id, &ctx.text(locale, error_key), None)
                .await?;
        }
        Parsed::Ok(value) => {
            ctx.states().merge_one(chat_id, step.key, value).await?;
            send_review(ctx, spec, chat_id, locale, None).await?;
        }
    }
    Ok(EngineOutcome::Continue)
}

/// Render the review summary and enter the review state.
///
/// Edits the given message in place when a message id is provided,
/// otherwise sends a fresh message.
///
/// # Errors
///
/// Returns an error if persistence or the transport fails.
pub async fn send_review(
    ctx: &BotContext,
    spec: &WizardSpec,
    chat_id: i64,
    locale: Option<&str>,
    edit_message: Option<i64>,
) -> Result<()> {
    ctx.states()
        .set_state(chat_id, Some(&spec.state_for(REVIEW_SUFFIX)))
        .await?;

    let lines = render_lines(ctx, spec, chat_id, locale).await?;
    let text = format!("{}\n{}", ctx.text(locale, spec.check_key), lines.join("\n"));
    let keyboard = markup::review_keyboard(
        &ctx.catalog,
        locale,
        spec.edit_label_key,
        spec.confirm_label_key,
    );

    match edit_message {
        Some(message_id) => {
            ctx.transport
                .edit_message_text(chat_id, message_id, &text, Some(keyboard))
                .await?;
        }
        None => {
            ctx.transport
                .send_message(
                    chat_id,
                    &text,
                    Some(crate::telegram::api::ReplyMarkup::Inline(keyboard)),
                )
                .await?;
        }
    }
    Ok(())
}

/// Render one localized summary line per step, in step order.
///
/// # Errors
///
/// Returns an error on persistence failure or a malformed bag value.
pub async fn render_lines(
    ctx: &BotContext,
    spec: &WizardSpec,
    chat_id: i64,
    locale: Option<&str>,
) -> Result<Vec<String>> {
    let (_, bag) = ctx.states().get(chat_id).await?;
    let mut lines = Vec::with_capacity(spec.steps.len());
    for step in spec.steps {
        let value = bag.get(step.key).unwrap_or(&Value::Null);
        let display = fields::display(ctx, locale, step.field, value).await?;
        lines.push(ctx.text_with(locale, step.line_key, &[(step.key, display.as_str())]));
    }
    Ok(lines)
}

/// Handle wizard navigation button presses (edit, step select, cancel).
///
/// The confirm action is wizard-specific and is dispatched by the
/// caller, not here.
///
/// # Errors
///
/// Returns an error if persistence or the transport fails.
pub async fn handle_callback(
    ctx: &BotContext,
    spec: &WizardSpec,
    chat_id: i64,
    locale: Option<&str>,
    suffix: &str,
    call: &CallbackQuery,
    data: &CallbackData,
) -> Result<()> {
    let message_id = call.message.as_ref().map(|message| message.message_id);

    match data.action.as_str() {
        actions::WIZ_EDIT if suffix == REVIEW_SUFFIX => {
            ctx.transport.answer_callback(&call.id, None, false).await?;
            ctx.states()
                .set_state(chat_id, Some(&spec.state_for(EDIT_SUFFIX)))
                .await?;

            let lines = render_lines(ctx, spec, chat_id, locale).await?;
            let numbered: Vec<String> = lines
                .iter()
                .enumerate()
                .map(|(index, line)| format!("{}. {line}", index + 1))
                .collect();
            let text = format!(
                "{}\n{}",
                ctx.text(locale, spec.editing_key),
                numbered.join("\n")
            );
            let keyboard =
                markup::edit_select_keyboard(&ctx.catalog, locale, &spec.step_keys());
            match message_id {
                Some(message_id) => {
                    ctx.transport
                        .edit_message_text(chat_id, message_id, &text, Some(keyboard))
                        .await?;
                }
                None => {
                    ctx.transport
                        .send_message(
                            chat_id,
                            &text,
                            Some(crate::telegram::api::ReplyMarkup::Inline(keyboard)),
                        )
                        .await?;
                }
            }
        }
        actions::WIZ_STEP if suffix == EDIT_SUFFIX => {
            let step = data
                .arg("step")
                .and_then(|key| spec.step(key))
                .map(|(_, step)| step);
            let Some(step) = step else {
                ctx.transport
                    .answer_callback(&call.id, Some(&ctx.text(locale, "unknown_step")), false)
                    .await?;
                return send_review(ctx, spec, chat_id, locale, message_id).await;
            };

            ctx.states()
                .merge_one(chat_id, EDIT_STEP_KEY, Value::String(step.key.to_owned()))
                .await?;
            ctx.transport.answer_callback(&call.id, None, false).await?;

            let prompt = ctx.text(locale, step.edit_prompt_key);
            let keyboard = fields::keyboard(ctx, locale, step.field).await?;
            match (message_id, keyboard) {
                (Some(message_id), None) => {
                    ctx.transport
                        .edit_message_text(chat_id, message_id, &prompt, None)
                        .await?;
                }
                (Some(message_id), Some(keyboard)) => {
                    // Reply keyboards cannot ride on a message edit.
                    ctx.transport.delete_message(chat_id, message_id).await?;
                    ctx.transport
                        .send_message(chat_id, &prompt, Some(keyboard))
                        .await?;
                }
                (None, keyboard) => {
                    ctx.transport
                        .send_message(chat_id, &prompt, keyboard)
                        .await?;
                }
            }
        }
        actions::WIZ_CANCEL if suffix == EDIT_SUFFIX => {
            ctx.transport.answer_callback(&call.id, None, false).await?;
            send_review(ctx, spec, chat_id, locale, message_id).await?;
        }
        other => {
            warn!(wizard = spec.name, suffix, action = other, "unexpected wizard callback");
            ctx.transport.answer_callback(&call.id, None, false).await?;
        }
    }
    Ok(())
}
