//! Full scenario: catalog entry → task wizard → broadcast → claim race.

use std::sync::Arc;

use crewcall::dispatch::{self, BotContext};
use crewcall::models::task_type::STAR;
use crewcall::models::SkillLevel;
use crewcall::telegram::api::Update;

use super::test_helpers::{
    callback_update, seed_registered_worker, test_ctx, text_update, OPERATOR_ID,
};

async fn drive(ctx: &Arc<BotContext>, update: Update) {
    dispatch::handle_update(Arc::clone(ctx), update).await;
}

fn stars(count: usize) -> String {
    std::iter::repeat(STAR).take(count).collect()
}

#[tokio::test]
async fn create_type_create_task_broadcast_and_claim() {
    let (ctx, transport) = test_ctx().await;
    seed_registered_worker(&ctx, 100, SkillLevel::None).await;
    seed_registered_worker(&ctx, 200, SkillLevel::Basic).await;
    seed_registered_worker(&ctx, 300, SkillLevel::Basic).await;
    seed_registered_worker(&ctx, 400, SkillLevel::Electrical).await;

    // Operator creates the catalog entry.
    drive(&ctx, text_update(1, OPERATOR_ID, "/create_type")).await;
    drive(&ctx, text_update(2, OPERATOR_ID, "Leak repair")).await;
    drive(&ctx, text_update(3, OPERATOR_ID, &stars(2))).await;

    // Operator walks the task wizard and confirms the broadcast.
    drive(&ctx, text_update(4, OPERATOR_ID, "/create_task")).await;
    drive(&ctx, text_update(5, OPERATOR_ID, "1500")).await;
    drive(&ctx, text_update(6, OPERATOR_ID, "Block A")).await;
    drive(&ctx, text_update(7, OPERATOR_ID, "18:30")).await;
    drive(&ctx, text_update(8, OPERATOR_ID, "+79995551122")).await;
    drive(&ctx, text_update(9, OPERATOR_ID, "-")).await;
    drive(
        &ctx,
        text_update(10, OPERATOR_ID, &format!("Leak repair ({})", stars(2))),
    )
    .await;

    let (state, _) = ctx.states().get(OPERATOR_ID).await.expect("state");
    assert_eq!(state.as_deref(), Some("task:review"));
    drive(&ctx, callback_update(11, OPERATOR_ID, "confirm", 50)).await;

    let (state, _) = ctx.states().get(OPERATOR_ID).await.expect("state");
    assert_eq!(state, None, "wizard finished");

    // Wait for the tracked broadcast job.
    ctx.jobs.close();
    ctx.jobs.wait().await;

    // Exactly the basic-tier unassigned workers got one offer each.
    assert_eq!(transport.sent_to(200).len(), 1);
    assert_eq!(transport.sent_to(300).len(), 1);
    assert!(transport.sent_to(100).is_empty());
    assert!(transport.sent_to(400).is_empty());

    let offers: Vec<(String, i64, String)> =
        sqlx::query_as("SELECT worker_id, message_id, task_id FROM offers")
            .fetch_all(&*ctx.db)
            .await
            .expect("offers");
    assert_eq!(offers.len(), 2);
    let task_id = offers[0].2.clone();
    let message_for = |worker: &str| {
        offers
            .iter()
            .find(|(worker_id, _, _)| worker_id == worker)
            .map(|(_, message_id, _)| *message_id)
            .expect("offer for worker")
    };
    let (offer_200, offer_300) = (message_for("200"), message_for("300"));

    // First worker claims and wins.
    let payload = format!("claim:task={task_id}");
    drive(&ctx, callback_update(12, 200, &payload, offer_200)).await;
    let claimed = ctx.tasks().get(&task_id).await.expect("task");
    assert_eq!(claimed.worker_id.as_deref(), Some("200"));
    let (_, answer, _) = transport.last_answer().expect("answer");
    assert_eq!(answer.as_deref(), Some("The task is yours."));

    // All other offers are gone and their messages retracted.
    assert!(ctx.offers().list_for_task(&task_id).await.expect("offers").is_empty());
    ctx.jobs.wait().await;
    assert!(transport
        .deleted
        .lock()
        .expect("lock")
        .contains(&(300, offer_300)));

    // Second worker's claim is refused with the specific reason.
    drive(&ctx, callback_update(13, 300, &payload, offer_300)).await;
    let (_, answer, _) = transport.last_answer().expect("answer");
    assert_eq!(answer.as_deref(), Some("Someone already took this task."));
    let still = ctx.tasks().get(&task_id).await.expect("task");
    assert_eq!(still.worker_id.as_deref(), Some("200"), "no mutation");
    assert_eq!(ctx.workers().get("300").await.expect("worker").task_id, None);
}
