//! Task broadcast fan-out and offer retraction.
//!
//! Eligibility, rendering, and delivery for new-task offers. The claim
//! arbitration itself lives in the task repository (a single conditional
//! UPDATE); the claim button handler in `dispatch::worker_actions` drives
//! it and calls back into [`spawn_retraction`] for the losers.

use std::sync::Arc;

use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::dispatch::BotContext;
use crate::models::{Offer, Task, TaskType};
use crate::telegram::markup;
use crate::wizard::fields;
use crate::Result;

/// Localized multi-line task summary.
#[must_use]
pub fn task_summary(
    ctx: &BotContext,
    locale: Option<&str>,
    task: &Task,
    task_type: &TaskType,
) -> String {
    let time = fields::format_schedule(task.scheduled_at, ctx.config_tz());
    let comment = task
        .comment
        .clone()
        .unwrap_or_else(|| ctx.text(locale, "no_comment"));
    [
        ctx.text_with(locale, "line_payment", &[("payment", &task.payment.to_string())]),
        ctx.text_with(locale, "line_location", &[("location", &task.location)]),
        ctx.text_with(locale, "line_time", &[("time", &time)]),
        ctx.text_with(locale, "line_contact", &[("contact", &task.contact)]),
        ctx.text_with(locale, "line_comment", &[("comment", &comment)]),
        ctx.text_with(locale, "line_type", &[("type", &task_type.label())]),
    ]
    .join("\n")
}

/// Fan an offer out to every eligible worker.
///
/// Eligible means the worker's skill tier equals the task's difficulty
/// tier and the worker has no current task. Each successful send records
/// an offer row keyed by the delivered message; a delivery failure is
/// logged and skipped without aborting the rest of the fan-out. Sends
/// are spaced by the configured minimum delay.
///
/// # Errors
///
/// Returns an error only for persistence failures; delivery failures
/// are isolated per worker.
pub async fn broadcast_task(ctx: &BotContext, task_id: &str) -> Result<()> {
    let task = ctx.tasks().get(task_id).await?;
    let task_type = ctx.task_types().get(&task.type_id).await?;
    let eligible = ctx.workers().eligible_for(task_type.difficulty).await?;
    info!(task_id, count = eligible.len(), "broadcasting task to eligible workers");

    for worker in eligible {
        let Some(chat_id) = worker.chat_id() else {
            warn!(worker_id = %worker.id, "worker has not registered; skipping offer");
            continue;
        };
        let locale = ctx.users().locale(chat_id).await?;
        let locale = locale.as_deref();
        let text = format!(
            "{}\n{}",
            ctx.text(locale, "new_task"),
            task_summary(ctx, locale, &task, &task_type)
        );
        let keyboard = markup::claim_keyboard(&ctx.catalog, locale, task_id);

        match ctx.transport.send_message(chat_id, &text, Some(keyboard)).await {
            Ok(message_id) => {
                ctx.offers()
                    .record(&Offer {
                        worker_id: worker.id.clone(),
                        message_id,
                        task_id: task_id.to_owned(),
                    })
                    .await?;
                sleep(ctx.config.send_spacing()).await;
            }
            Err(err) => {
                error!(task_id, worker_id = %worker.id, %err, "offer delivery failed; skipping");
            }
        }
    }
    Ok(())
}

/// Run the broadcast on a tracked background job.
pub fn spawn_broadcast(ctx: Arc<BotContext>, task_id: String) {
    let jobs = ctx.jobs.clone();
    let _handle = jobs.spawn(async move {
        if let Err(err) = broadcast_task(&ctx, &task_id).await {
            error!(task_id, %err, "task broadcast failed");
        }
    });
}

/// Delete the losers' offer messages, best-effort.
///
/// Runs after the claim response has been sent so the winner never waits
/// on the losers' network calls. Per-message failures are logged and do
/// not stop the remaining retractions.
pub async fn retract_offers(ctx: &BotContext, offers: &[Offer]) {
    for offer in offers {
        let Ok(chat_id) = offer.worker_id.parse::<i64>() else {
            warn!(worker_id = %offer.worker_id, "offer without a numeric chat id");
            continue;
        };
        if let Err(err) = ctx.transport.delete_message(chat_id, offer.message_id).await {
            error!(
                task_id = %offer.task_id,
                worker_id = %offer.worker_id,
                %err,
                "offer retraction failed"
            );
        }
        sleep(ctx.config.send_spacing()).await;
    }
}

/// Run retraction on a tracked background job.
pub fn spawn_retraction(ctx: Arc<BotContext>, offers: Vec<Offer>) {
    if offers.is_empty() {
        return;
    }
    let jobs = ctx.jobs.clone();
    let _handle = jobs.spawn(async move {
        retract_offers(&ctx, &offers).await;
    });
}
