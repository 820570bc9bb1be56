//! Task-type creation wizard: name, difficulty, persist. No review
//! state; the last step finalizes directly.

use serde::Deserialize;
use serde_json::Value;

use crate::dispatch::BotContext;
use crate::models::{Difficulty, TaskType};
use crate::telegram::api::ReplyMarkup;
use crate::wizard::fields::FieldKind;
use crate::wizard::{Step, WizardSpec};
use crate::{AppError, Result};

/// Task-type wizard definition.
pub const SPEC: WizardSpec = WizardSpec {
    name: "type",
    steps: &[
        Step {
            key: "name",
            field: FieldKind::TypeName,
            prompt_key: "ask_type_to_create",
            edit_prompt_key: "ask_type_to_create",
            line_key: "line_name",
        },
        Step {
            key: "difficulty",
            field: FieldKind::Difficulty,
            prompt_key: "ask_type_difficulty",
            edit_prompt_key: "ask_type_difficulty",
            line_key: "line_type",
        },
    ],
    review: false,
    check_key: "",
    editing_key: "",
    edit_label_key: "",
    confirm_label_key: "",
};

/// Typed shape of the completed data bag.
#[derive(Debug, Deserialize)]
struct TypeDraft {
    name: String,
    difficulty: Difficulty,
}

/// Persist the new catalog entry and clear the wizard state.
///
/// A `(name, difficulty)` uniqueness conflict is reported and the wizard
/// aborts to idle; anything else propagates.
///
/// # Errors
///
/// Returns an error on persistence or transport failure, or when the
/// data bag does not decode into the expected shape.
pub async fn finalize(ctx: &BotContext, chat_id: i64, locale: Option<&str>) -> Result<()> {
    let (_, bag) = ctx.states().get(chat_id).await?;
    let draft: TypeDraft = serde_json::from_value(Value::Object(bag))
        .map_err(|err| AppError::Validation(format!("type draft shape mismatch: {err}")))?;

    let created = ctx
        .task_types()
        .create(&TaskType::new(draft.name, draft.difficulty))
        .await;
    ctx.states().reset(chat_id, true).await?;

    let reply_key = match created {
        Ok(()) => "task_type_created",
        Err(AppError::Conflict(_)) => "task_type_exists_error",
        Err(err) => return Err(err),
    };
    ctx.transport
        .send_message(
            chat_id,
            &ctx.text(locale, reply_key),
            Some(ReplyMarkup::remove()),
        )
        .await?;
    Ok(())
}
