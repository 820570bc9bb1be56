//! Worker-creation wizard: name, phone, skill, review, persist.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use crate::dispatch::BotContext;
use crate::models::{SkillLevel, Worker};
use crate::telegram::api::CallbackQuery;
use crate::wizard::fields::FieldKind;
use crate::wizard::{Step, WizardSpec};
use crate::{AppError, Result};

/// Worker wizard definition.
pub const SPEC: WizardSpec = WizardSpec {
    name: "worker",
    steps: &[
        Step {
            key: "name",
            field: FieldKind::PersonName,
            prompt_key: "ask_worker_name",
            edit_prompt_key: "ask_new_name",
            line_key: "line_name",
        },
        Step {
            key: "phone",
            field: FieldKind::Phone,
            prompt_key: "ask_worker_phone",
            edit_prompt_key: "ask_new_phone",
            line_key: "line_phone",
        },
        Step {
            key: "skill",
            field: FieldKind::Skill,
            prompt_key: "ask_worker_skill",
            edit_prompt_key: "ask_new_skill",
            line_key: "line_skill",
        },
    ],
    review: true,
    check_key: "check_worker",
    editing_key: "worker_editing",
    edit_label_key: "edit_worker",
    confirm_label_key: "save_worker",
};

/// Typed shape of the completed data bag.
#[derive(Debug, Deserialize)]
struct WorkerDraft {
    name: String,
    phone: String,
    skill: SkillLevel,
}

/// Persist the reviewed worker and clear the wizard state.
///
/// A phone-uniqueness conflict is reported on the pressed button and the
/// review stays open so the operator can edit the phone.
///
/// # Errors
///
/// Returns an error on persistence or transport failure, or when the
/// data bag does not decode into the expected shape.
pub async fn finalize(
    ctx: &Arc<BotContext>,
    chat_id: i64,
    locale: Option<&str>,
    call: &CallbackQuery,
) -> Result<()> {
    let (_, bag) = ctx.states().get(chat_id).await?;
    let draft: WorkerDraft = serde_json::from_value(Value::Object(bag))
        .map_err(|err| AppError::Validation(format!("worker draft shape mismatch: {err}")))?;

    let worker = Worker::new(draft.name, draft.phone, draft.skill);
    match ctx.workers().create(&worker).await {
        Ok(()) => {
            ctx.states().reset(chat_id, true).await?;
            ctx.transport.answer_callback(&call.id, None, false).await?;
            ctx.transport
                .send_message(chat_id, &ctx.text(locale, "worker_saved"), None)
                .await?;
            Ok(())
        }
        Err(AppError::Conflict(_)) => {
            ctx.transport
                .answer_callback(
                    &call.id,
                    Some(&ctx.text(locale, "worker_phone_exists_error")),
                    true,
                )
                .await?;
            Ok(())
        }
        Err(err) => Err(err),
    }
}
