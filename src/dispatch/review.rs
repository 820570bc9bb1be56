//! Operator review of submitted work reports.

use tracing::warn;

use crate::dispatch::{worker_actions, BotContext};
use crate::models::{ReportVerdict, Worker};
use crate::telegram::api::CallbackQuery;
use crate::telegram::callback::CallbackData;
use crate::telegram::markup;
use crate::{AppError, Result};

/// Localized summary of a worker, used for the payment prompt.
#[must_use]
pub fn worker_summary(ctx: &BotContext, locale: Option<&str>, worker: &Worker) -> String {
    [
        ctx.text_with(locale, "line_name", &[("name", &worker.name)]),
        ctx.text_with(locale, "line_phone", &[("phone", &worker.phone)]),
        ctx.text_with(
            locale,
            "line_skill",
            &[("skill", &markup::skill_label(&ctx.catalog, locale, worker.skill))],
        ),
    ]
    .join("\n")
}

/// Handle an operator verdict on a submitted report.
///
/// Redo verdicts push the worker back into the photo state; acceptance
/// releases the worker for new offers and shows the operator a payment
/// summary. The verdict is stamped on the pending report either way.
///
/// # Errors
///
/// Returns an error on persistence or transport failure.
pub async fn handle_review(
    ctx: &BotContext,
    call: &CallbackQuery,
    data: &CallbackData,
    locale: Option<&str>,
) -> Result<()> {
    let task_id = data.arg("task");
    let verdict = data.arg("v").and_then(ReportVerdict::from_str_code);
    let (Some(task_id), Some(verdict)) = (task_id, verdict) else {
        warn!("review callback with malformed payload");
        return ctx.transport.answer_callback(&call.id, None, false).await;
    };

    let worker = match ctx.workers().get_for_task(task_id).await {
        Ok(worker) => worker,
        Err(AppError::NotFound(_)) => {
            warn!(task_id, "review for a task without an assigned worker");
            return ctx.transport.answer_callback(&call.id, None, false).await;
        }
        Err(err) => return Err(err),
    };

    ctx.transport.answer_callback(&call.id, None, false).await?;
    if let Some(message) = &call.message {
        if let Err(err) = ctx
            .transport
            .clear_reply_markup(message.chat.id, message.message_id)
            .await
        {
            warn!(task_id, %err, "failed to strip review buttons");
        }
    }

    ctx.reports().set_verdict(task_id, verdict).await?;

    let operator_id = ctx.config.operator_id;
    let worker_chat = worker.chat_id();
    let worker_locale = match worker_chat {
        Some(chat_id) => ctx.users().locale(chat_id).await?,
        None => None,
    };
    let worker_locale = worker_locale.as_deref();

    match verdict {
        ReportVerdict::BadJob | ReportVerdict::BadPhoto => {
            let redo_key = if verdict == ReportVerdict::BadJob {
                "redo_job"
            } else {
                "redo_photo"
            };
            if let Some(chat_id) = worker_chat {
                ctx.states()
                    .set_state(chat_id, Some(worker_actions::PHOTO_STATE))
                    .await?;
                ctx.transport
                    .send_message(chat_id, &ctx.text(worker_locale, redo_key), None)
                    .await?;
            }
            ctx.transport
                .send_message(operator_id, &ctx.text(locale, "task_reviewed"), None)
                .await?;
        }
        ReportVerdict::GoodJob => {
            ctx.workers().release(&worker.id).await?;
            let summary = worker_summary(ctx, locale, &worker);
            ctx.transport
                .send_message(
                    operator_id,
                    &format!("{}\n{summary}", ctx.text(locale, "pay_worker")),
                    None,
                )
                .await?;
            if let Some(chat_id) = worker_chat {
                ctx.transport
                    .send_message(chat_id, &ctx.text(worker_locale, "task_successful"), None)
                    .await?;
            }
        }
    }
    Ok(())
}
