//! Reminder sweep behaviour through the context: escalation prompts,
//! start announcements, idempotence, and cooperative shutdown.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crewcall::dispatch::{self, BotContext};
use crewcall::models::{Difficulty, SkillLevel, Timeliness};
use crewcall::orchestrator::reminder;
use crewcall::telegram::api::Update;

use super::test_helpers::{callback_update, seed_registered_worker, seed_task, seed_task_type, test_ctx};

async fn drive(ctx: &Arc<BotContext>, update: Update) {
    dispatch::handle_update(Arc::clone(ctx), update).await;
}

#[tokio::test]
async fn sweep_prompts_timeliness_within_the_lookahead() {
    let (ctx, transport) = test_ctx().await;
    let worker = seed_registered_worker(&ctx, 100, SkillLevel::Basic).await;
    let task_type = seed_task_type(&ctx, "Leak repair", Difficulty::Medium).await;
    let task = seed_task(&ctx, &task_type.id, 10).await;
    ctx.tasks().claim(&task.id, &worker.id, Utc::now()).await.expect("claim");

    reminder::sweep(&ctx).await.expect("sweep");

    let prompts = transport.sent_to(100);
    assert_eq!(prompts.len(), 1);
    assert_eq!(prompts[0].text, "Your task starts soon. Will you be on time?");
    assert!(prompts[0].markup.is_some(), "three verdict buttons attached");
    assert_eq!(
        ctx.tasks().get(&task.id).await.expect("task").timeliness,
        Some(Timeliness::Unknown),
        "fallback stamped"
    );
}

#[tokio::test]
async fn sweep_announces_started_tasks_once() {
    let (ctx, transport) = test_ctx().await;
    let worker = seed_registered_worker(&ctx, 100, SkillLevel::Basic).await;
    let task_type = seed_task_type(&ctx, "Leak repair", Difficulty::Medium).await;
    let task = seed_task(&ctx, &task_type.id, -5).await;
    // Claim before the scheduled time so the expiry guard passes.
    ctx.tasks()
        .claim(
            &task.id,
            &worker.id,
            task.scheduled_at - chrono::Duration::hours(1),
        )
        .await
        .expect("claim");

    reminder::sweep(&ctx).await.expect("sweep");

    let texts: Vec<String> = transport
        .sent_to(100)
        .into_iter()
        .map(|message| message.text)
        .collect();
    assert!(
        texts.contains(&"Your task has started. Press Done when you finish.".to_owned()),
        "got: {texts:?}"
    );
    assert!(ctx.tasks().get(&task.id).await.expect("task").start_notified);
}

#[tokio::test]
async fn consecutive_sweeps_send_nothing_new() {
    let (ctx, transport) = test_ctx().await;
    let worker = seed_registered_worker(&ctx, 100, SkillLevel::Basic).await;
    let task_type = seed_task_type(&ctx, "Leak repair", Difficulty::Medium).await;
    let task = seed_task(&ctx, &task_type.id, 10).await;
    ctx.tasks().claim(&task.id, &worker.id, Utc::now()).await.expect("claim");

    reminder::sweep(&ctx).await.expect("first sweep");
    let after_first = transport.sent_count();
    reminder::sweep(&ctx).await.expect("second sweep");
    assert_eq!(transport.sent_count(), after_first, "second pass affects zero rows");
}

#[tokio::test]
async fn one_unreachable_worker_does_not_stop_the_sweep() {
    let (ctx, transport) = test_ctx().await;
    let first = seed_registered_worker(&ctx, 100, SkillLevel::Basic).await;
    let second = seed_registered_worker(&ctx, 200, SkillLevel::Basic).await;
    let task_type = seed_task_type(&ctx, "Leak repair", Difficulty::Medium).await;
    let task_a = seed_task(&ctx, &task_type.id, 10).await;
    let task_b = seed_task(&ctx, &task_type.id, 10).await;
    ctx.tasks().claim(&task_a.id, &first.id, Utc::now()).await.expect("claim");
    ctx.tasks().claim(&task_b.id, &second.id, Utc::now()).await.expect("claim");
    transport.fail_chat(100);

    reminder::sweep(&ctx).await.expect("sweep");
    assert_eq!(transport.sent_to(200).len(), 1, "delivery failure is isolated");
}

#[tokio::test]
async fn timeliness_button_records_the_verdict() {
    let (ctx, transport) = test_ctx().await;
    let worker = seed_registered_worker(&ctx, 100, SkillLevel::Basic).await;
    let task_type = seed_task_type(&ctx, "Leak repair", Difficulty::Medium).await;
    let task = seed_task(&ctx, &task_type.id, 10).await;
    ctx.tasks().claim(&task.id, &worker.id, Utc::now()).await.expect("claim");
    reminder::sweep(&ctx).await.expect("sweep");

    drive(&ctx, callback_update(10, 100, "timeliness:value=on_time", 60)).await;

    assert_eq!(
        ctx.tasks().get(&task.id).await.expect("task").timeliness,
        Some(Timeliness::OnTime)
    );
    let (_, answer, _) = transport.last_answer().expect("answer");
    assert_eq!(answer.as_deref(), Some("Thanks, noted."));
    assert!(transport.cleared.lock().expect("lock").contains(&(100, 60)));
}

#[tokio::test]
async fn reminder_task_shuts_down_cooperatively() {
    let (ctx, _transport) = test_ctx().await;
    let cancel = CancellationToken::new();
    let handle = reminder::spawn_reminder_task(Arc::clone(&ctx), cancel.clone());

    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("reminder task must stop after cancellation")
        .expect("join");
}
