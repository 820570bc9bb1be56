//! Unit tests for the broadcast offer repository.

use std::sync::Arc;

use crewcall::models::Offer;
use crewcall::persistence::db;
use crewcall::persistence::offer_repo::OfferRepo;

async fn repo() -> OfferRepo {
    let database = Arc::new(db::connect_memory().await.expect("db"));
    OfferRepo::new(database)
}

fn offer(worker_id: &str, message_id: i64, task_id: &str) -> Offer {
    Offer {
        worker_id: worker_id.to_owned(),
        message_id,
        task_id: task_id.to_owned(),
    }
}

#[tokio::test]
async fn record_and_list_roundtrip() {
    let repo = repo().await;
    repo.record(&offer("100", 11, "t-1")).await.expect("record");
    repo.record(&offer("200", 12, "t-1")).await.expect("record");
    repo.record(&offer("100", 13, "t-2")).await.expect("record");

    let offers = repo.list_for_task("t-1").await.expect("list");
    assert_eq!(offers.len(), 2);
}

#[tokio::test]
async fn take_losers_spares_the_winner() {
    let repo = repo().await;
    repo.record(&offer("100", 11, "t-1")).await.expect("record");
    repo.record(&offer("200", 12, "t-1")).await.expect("record");
    repo.record(&offer("300", 13, "t-1")).await.expect("record");
    repo.record(&offer("400", 14, "t-2")).await.expect("record");

    let losers = repo.take_losers("t-1", "200").await.expect("take");
    let mut loser_ids: Vec<&str> = losers.iter().map(|o| o.worker_id.as_str()).collect();
    loser_ids.sort_unstable();
    assert_eq!(loser_ids, vec!["100", "300"]);

    // The winner's own row and unrelated tasks are untouched.
    let remaining = repo.list_for_task("t-1").await.expect("list");
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].worker_id, "200");
    assert_eq!(repo.list_for_task("t-2").await.expect("list").len(), 1);
}

#[tokio::test]
async fn delete_for_message_removes_one_row() {
    let repo = repo().await;
    repo.record(&offer("100", 11, "t-1")).await.expect("record");
    repo.record(&offer("100", 12, "t-1")).await.expect("record");

    repo.delete_for_message("100", 11).await.expect("delete");
    let remaining = repo.list_for_task("t-1").await.expect("list");
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].message_id, 12);
}
