//! Long-poll update loop.
//!
//! Pulls update batches via `getUpdates` and spawns one independent
//! task per update so a slow handler never blocks the poll loop or
//! other users.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::dispatch::{self, BotContext};
use crate::telegram::client::BotClient;

const RETRY_DELAY: Duration = Duration::from_secs(2);

/// Spawn the polling background task.
///
/// The task runs until the token is cancelled. Poll failures back off
/// briefly and retry; they never terminate the loop.
#[must_use]
pub fn spawn_poller(
    ctx: Arc<BotContext>,
    client: Arc<BotClient>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut offset = 0_i64;
        loop {
            let batch = tokio::select! {
                () = cancel.cancelled() => {
                    info!("update poller shutting down");
                    break;
                }
                result = client.get_updates(offset) => result,
            };

            match batch {
                Ok(updates) => {
                    for update in updates {
                        offset = offset.max(update.update_id + 1);
                        tokio::spawn(dispatch::handle_update(Arc::clone(&ctx), update));
                    }
                }
                Err(err) => {
                    error!(%err, "getUpdates failed; backing off");
                    tokio::select! {
                        () = cancel.cancelled() => break,
                        () = sleep(RETRY_DELAY) => {}
                    }
                }
            }
        }
    })
}
