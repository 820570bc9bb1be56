//! Scheduled-time reminder sweep.
//!
//! A single background task ticks on a fixed interval. Each pass runs
//! two conditional updates in one committed transaction (see
//! `TaskRepo::sweep_due`), then fans the resulting notifications out
//! with per-recipient fault isolation and rate-limited spacing. Running
//! a pass twice in a row affects zero rows the second time.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::dispatch::BotContext;
use crate::telegram::api::ReplyMarkup;
use crate::telegram::markup;
use crate::Result;

/// Spawn the reminder sweep background task.
///
/// The task runs until the token is cancelled; cancellation waits for
/// the in-flight pass rather than interrupting it mid-send.
#[must_use]
pub fn spawn_reminder_task(ctx: Arc<BotContext>, cancel: CancellationToken) -> JoinHandle<()> {
    let interval_duration = Duration::from_secs(ctx.config.reminder.sweep_interval_seconds);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(interval_duration);
        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    info!("reminder task shutting down");
                    break;
                }
                _ = interval.tick() => {
                    if let Err(err) = sweep(&ctx).await {
                        error!(%err, "reminder sweep failed");
                    }
                }
            }
        }
    })
}

/// Run one sweep pass: stamp due rows, then notify the affected workers.
///
/// # Errors
///
/// Returns an error for persistence failures; notification delivery
/// failures are isolated per worker.
pub async fn sweep(ctx: &BotContext) -> Result<()> {
    let lookahead = Duration::from_secs(u64::from(ctx.config.reminder.lookahead_minutes) * 60);
    let due = ctx.tasks().sweep_due(Utc::now(), lookahead).await?;

    for worker_id in &due.confirm {
        notify(ctx, worker_id, "verify_task", |locale| {
            markup::timeliness_keyboard(&ctx.catalog, locale)
        })
        .await;
    }
    for worker_id in &due.started {
        notify(ctx, worker_id, "task_started", |locale| {
            markup::done_keyboard(&ctx.catalog, locale)
        })
        .await;
    }
    Ok(())
}

/// Send one reminder, isolating any failure to this worker.
async fn notify<F>(ctx: &BotContext, worker_id: &str, text_key: &str, keyboard: F)
where
    F: Fn(Option<&str>) -> ReplyMarkup,
{
    let Ok(chat_id) = worker_id.parse::<i64>() else {
        error!(worker_id, "assigned worker without a numeric chat id");
        return;
    };
    let locale = match ctx.users().locale(chat_id).await {
        Ok(locale) => locale,
        Err(err) => {
            error!(worker_id, %err, "locale lookup failed; using default");
            None
        }
    };
    let locale = locale.as_deref();
    let text = ctx.text(locale, text_key);
    if let Err(err) = ctx
        .transport
        .send_message(chat_id, &text, Some(keyboard(locale)))
        .await
    {
        error!(worker_id, %err, "reminder delivery failed; continuing sweep");
        return;
    }
    sleep(ctx.config.send_spacing()).await;
}
