//! Worker-side button handlers: claim, timeliness confirmation, and the
//! done/photo completion flow.

use std::sync::Arc;

use chrono::Utc;
use tracing::warn;

use crate::dispatch::BotContext;
use crate::models::{Report, Timeliness};
use crate::orchestrator::broadcast;
use crate::persistence::task_repo::ClaimOutcome;
use crate::telegram::api::{CallbackQuery, Message};
use crate::telegram::callback::CallbackData;
use crate::telegram::markup;
use crate::{AppError, Result};

/// Conversation state awaiting the completion photo.
pub const PHOTO_STATE: &str = "photo";

/// Handle a claim button press.
///
/// The task repository's conditional update arbitrates the race; this
/// handler classifies the outcome for the claimant, removes the offer
/// affordance from their message, and kicks off best-effort retraction
/// of the losers' offers off the critical path.
///
/// # Errors
///
/// Returns an error on persistence or transport failure.
pub async fn handle_claim(
    ctx: &Arc<BotContext>,
    call: &CallbackQuery,
    data: &CallbackData,
    user_id: i64,
    locale: Option<&str>,
) -> Result<()> {
    let Some(task_id) = data.arg("task") else {
        warn!(user_id, "claim callback without a task id");
        return ctx.transport.answer_callback(&call.id, None, false).await;
    };
    let worker_id = user_id.to_string();
    let message_id = call.message.as_ref().map(|message| message.message_id);

    let outcome = ctx.tasks().claim(task_id, &worker_id, Utc::now()).await?;
    let answer_key = match outcome {
        ClaimOutcome::Won => "task_taken",
        ClaimOutcome::AlreadyTaken => "task_already_taken",
        ClaimOutcome::Expired => "task_expired",
        ClaimOutcome::Gone => "task_gone",
    };
    ctx.transport
        .answer_callback(&call.id, Some(&ctx.text(locale, answer_key)), true)
        .await?;

    // Win or lose, the claimant's offer affordance goes away.
    if let Some(message_id) = message_id {
        if let Err(err) = ctx.transport.clear_reply_markup(user_id, message_id).await {
            warn!(user_id, %err, "failed to strip offer buttons");
        }
        ctx.offers()
            .delete_for_message(&worker_id, message_id)
            .await?;
    }

    if outcome == ClaimOutcome::Won {
        let losers = ctx.offers().take_losers(task_id, &worker_id).await?;
        broadcast::spawn_retraction(Arc::clone(ctx), losers);
    }
    Ok(())
}

/// Handle a timeliness confirmation button press.
///
/// # Errors
///
/// Returns an error on persistence or transport failure.
pub async fn handle_timeliness(
    ctx: &BotContext,
    call: &CallbackQuery,
    data: &CallbackData,
    user_id: i64,
    locale: Option<&str>,
) -> Result<()> {
    let verdict = data.arg("value").and_then(Timeliness::from_str_code);
    let Some(verdict) = verdict else {
        warn!(user_id, "timeliness callback without a valid value");
        return ctx.transport.answer_callback(&call.id, None, false).await;
    };

    ctx.tasks()
        .confirm_timeliness(&user_id.to_string(), verdict)
        .await?;
    ctx.transport
        .answer_callback(&call.id, Some(&ctx.text(locale, "task_verified")), false)
        .await?;
    if let Some(message) = &call.message {
        if let Err(err) = ctx
            .transport
            .clear_reply_markup(user_id, message.message_id)
            .await
        {
            warn!(user_id, %err, "failed to strip timeliness buttons");
        }
    }
    Ok(())
}

/// Handle the done button: move the worker into the photo state.
///
/// # Errors
///
/// Returns an error on persistence or transport failure.
pub async fn handle_task_done(
    ctx: &BotContext,
    call: &CallbackQuery,
    user_id: i64,
    locale: Option<&str>,
) -> Result<()> {
    ctx.states()
        .set_state(user_id, Some(PHOTO_STATE))
        .await?;
    ctx.transport.answer_callback(&call.id, None, false).await?;
    ctx.transport
        .send_message(user_id, &ctx.text(locale, "make_photo"), None)
        .await?;
    Ok(())
}

/// Handle a photo submitted while in the photo state.
///
/// Records a report, forwards the photo to the operator with a review
/// keyboard, and acknowledges the worker.
///
/// # Errors
///
/// Returns an error on persistence or transport failure.
pub async fn handle_photo(
    ctx: &BotContext,
    message: &Message,
    user_id: i64,
    locale: Option<&str>,
) -> Result<()> {
    if message.photo.is_none() {
        // Only photos advance this state.
        return Ok(());
    }

    let worker = match ctx.workers().get(&user_id.to_string()).await {
        Ok(worker) => worker,
        Err(AppError::NotFound(_)) => {
            warn!(user_id, "photo from a non-worker; leaving photo state");
            ctx.states().reset(user_id, true).await?;
            return Ok(());
        }
        Err(err) => return Err(err),
    };
    let Some(task_id) = worker.task_id.clone() else {
        warn!(user_id, "photo without a current task; leaving photo state");
        ctx.states().reset(user_id, true).await?;
        return Ok(());
    };

    ctx.reports()
        .create(&Report::new(
            task_id.clone(),
            worker.id.clone(),
            message.message_id,
        ))
        .await?;

    let operator_id = ctx.config.operator_id;
    ctx.transport
        .forward_message(operator_id, user_id, message.message_id)
        .await?;
    let operator_locale = ctx.users().locale(operator_id).await?;
    let operator_locale = operator_locale.as_deref();
    ctx.transport
        .send_message(
            operator_id,
            &ctx.text(operator_locale, "review_job"),
            Some(markup::review_job_keyboard(
                &ctx.catalog,
                operator_locale,
                &task_id,
            )),
        )
        .await?;

    ctx.transport
        .send_message(user_id, &ctx.text(locale, "photo_forwarded"), None)
        .await?;
    ctx.states().reset(user_id, true).await?;
    Ok(())
}
