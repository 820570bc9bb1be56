//! Broadcast eligibility and delivery fault isolation.

use chrono::Utc;

use crewcall::models::{Difficulty, SkillLevel, Worker};
use crewcall::orchestrator::broadcast;

use super::test_helpers::{seed_registered_worker, seed_task, seed_task_type, test_ctx};

#[tokio::test]
async fn only_matching_tier_unassigned_workers_get_offers() {
    let (ctx, transport) = test_ctx().await;
    seed_registered_worker(&ctx, 100, SkillLevel::None).await;
    let basic_free = seed_registered_worker(&ctx, 200, SkillLevel::Basic).await;
    let basic_busy = seed_registered_worker(&ctx, 300, SkillLevel::Basic).await;
    seed_registered_worker(&ctx, 400, SkillLevel::Electrical).await;

    let task_type = seed_task_type(&ctx, "Leak repair", Difficulty::Medium).await;
    // Tie up one basic worker with an earlier task.
    let earlier = seed_task(&ctx, &task_type.id, 30).await;
    ctx.tasks()
        .claim(&earlier.id, &basic_busy.id, Utc::now())
        .await
        .expect("claim earlier");

    let task = seed_task(&ctx, &task_type.id, 60).await;
    broadcast::broadcast_task(&ctx, &task.id).await.expect("broadcast");

    assert_eq!(transport.sent_to(200).len(), 1, "free basic worker offered");
    assert!(transport.sent_to(100).is_empty(), "wrong tier skipped");
    assert!(transport.sent_to(400).is_empty(), "wrong tier skipped");
    assert!(transport.sent_to(300).is_empty(), "busy worker skipped");

    let offer_text = &transport.sent_to(200)[0].text;
    assert!(offer_text.contains("New task:"), "got: {offer_text}");
    assert!(offer_text.contains("Block A"));
    assert!(offer_text.contains("1500"));
    assert!(offer_text.contains("Leak repair"));

    let offers = ctx.offers().list_for_task(&task.id).await.expect("offers");
    assert_eq!(offers.len(), 1);
    assert_eq!(offers[0].worker_id, basic_free.id);
}

#[tokio::test]
async fn one_failed_delivery_does_not_abort_the_fan_out() {
    let (ctx, transport) = test_ctx().await;
    seed_registered_worker(&ctx, 200, SkillLevel::Basic).await;
    seed_registered_worker(&ctx, 300, SkillLevel::Basic).await;
    transport.fail_chat(200);

    let task_type = seed_task_type(&ctx, "Leak repair", Difficulty::Medium).await;
    let task = seed_task(&ctx, &task_type.id, 60).await;
    broadcast::broadcast_task(&ctx, &task.id).await.expect("broadcast");

    assert!(transport.sent_to(200).is_empty());
    assert_eq!(transport.sent_to(300).len(), 1, "remaining worker still offered");

    // Only the delivered offer leaves a row behind.
    let offers = ctx.offers().list_for_task(&task.id).await.expect("offers");
    assert_eq!(offers.len(), 1);
    assert_eq!(offers[0].worker_id, "300");
}

#[tokio::test]
async fn unregistered_workers_are_skipped() {
    let (ctx, transport) = test_ctx().await;
    let unregistered = Worker::new("Ghost".into(), "+79995554433".into(), SkillLevel::Basic);
    ctx.workers().create(&unregistered).await.expect("create");

    let task_type = seed_task_type(&ctx, "Leak repair", Difficulty::Medium).await;
    let task = seed_task(&ctx, &task_type.id, 60).await;
    broadcast::broadcast_task(&ctx, &task.id).await.expect("broadcast");

    assert_eq!(transport.sent_count(), 0, "no deliverable chat, no sends");
    assert!(ctx.offers().list_for_task(&task.id).await.expect("offers").is_empty());
}
