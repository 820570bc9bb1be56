//! Task-creation wizard: payment, location, time, contact, comment,
//! type, review, persist, broadcast.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::dispatch::BotContext;
use crate::models::Task;
use crate::orchestrator::broadcast;
use crate::telegram::api::CallbackQuery;
use crate::wizard::fields::FieldKind;
use crate::wizard::{Step, WizardSpec};
use crate::{AppError, Result};

/// Task wizard definition.
pub const SPEC: WizardSpec = WizardSpec {
    name: "task",
    steps: &[
        Step {
            key: "payment",
            field: FieldKind::Payment,
            prompt_key: "ask_task_payment",
            edit_prompt_key: "ask_new_payment",
            line_key: "line_payment",
        },
        Step {
            key: "location",
            field: FieldKind::Location,
            prompt_key: "ask_task_location",
            edit_prompt_key: "ask_new_location",
            line_key: "line_location",
        },
        Step {
            key: "time",
            field: FieldKind::Time,
            prompt_key: "ask_task_time",
            edit_prompt_key: "ask_new_time",
            line_key: "line_time",
        },
        Step {
            key: "contact",
            field: FieldKind::Contact,
            prompt_key: "ask_task_contact",
            edit_prompt_key: "ask_new_contact",
            line_key: "line_contact",
        },
        Step {
            key: "comment",
            field: FieldKind::Comment,
            prompt_key: "ask_task_comment",
            edit_prompt_key: "ask_new_comment",
            line_key: "line_comment",
        },
        Step {
            key: "type",
            field: FieldKind::TaskType,
            prompt_key: "ask_task_type",
            edit_prompt_key: "ask_new_type",
            line_key: "line_type",
        },
    ],
    review: true,
    check_key: "check_task",
    editing_key: "task_editing",
    edit_label_key: "edit_task",
    confirm_label_key: "broadcast_task",
};

/// Typed shape of the completed data bag.
#[derive(Debug, Deserialize)]
struct TaskDraft {
    payment: i64,
    location: String,
    time: String,
    contact: String,
    comment: Option<String>,
    #[serde(rename = "type")]
    type_id: String,
}

/// Persist the reviewed task, clear the wizard state, and hand the new
/// task to the broadcast protocol on a tracked background job.
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
    let draft: TaskDraft = serde_json::from_value(Value::Object(bag))
        .map_err(|err| AppError::Validation(format!("task draft shape mismatch: {err}")))?;
    let scheduled_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&draft.time)
        .map_err(|err| AppError::Validation(format!("task draft time: {err}")))?
        .with_timezone(&Utc);

    let task = Task::new(
        draft.location,
        scheduled_at,
        draft.contact,
        draft.comment,
        draft.payment,
        draft.type_id,
    );
    ctx.tasks().create(&task).await?;
    ctx.states().reset(chat_id, true).await?;

    broadcast::spawn_broadcast(Arc::clone(ctx), task.id);

    ctx.transport.answer_callback(&call.id, None, false).await?;
    ctx.transport
        .send_message(chat_id, &ctx.text(locale, "task_broadcasted"), None)
        .await?;
    Ok(())
}
