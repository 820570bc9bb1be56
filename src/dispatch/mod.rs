//! Inbound update dispatch.
//!
//! One router consumes every update: it upserts the sender, then routes
//! by command, conversation state, or callback action prefix. Any error
//! escaping a handler is logged with the update id and swallowed so the
//! process keeps serving other users.

pub mod registration;
pub mod review;
pub mod worker_actions;

use std::sync::Arc;

use chrono::{FixedOffset, Offset, Utc};
use sqlx::SqlitePool;
use tokio_util::task::TaskTracker;
use tracing::{error, warn};

use crate::config::GlobalConfig;
use crate::i18n::Catalog;
use crate::models::User;
use crate::persistence::offer_repo::OfferRepo;
use crate::persistence::report_repo::ReportRepo;
use crate::persistence::state_store::ConversationStore;
use crate::persistence::task_repo::TaskRepo;
use crate::persistence::task_type_repo::TaskTypeRepo;
use crate::persistence::user_repo::UserRepo;
use crate::persistence::worker_repo::WorkerRepo;
use crate::telegram::api::{CallbackQuery, Message, ReplyMarkup, TgUser, Update};
use crate::telegram::callback::CallbackData;
use crate::telegram::markup::{self, actions};
use crate::telegram::transport::ChatTransport;
use crate::wizard::{self, EngineOutcome};
use crate::Result;

/// Conversation state name for the type-deletion prompt.
pub const TYPE_DELETE_STATE: &str = "type_delete";

/// Shared application context passed into every handler and background
/// protocol, replacing process-wide singletons.
pub struct BotContext {
    /// Parsed global configuration.
    pub config: Arc<GlobalConfig>,
    /// Shared connection pool.
    pub db: Arc<SqlitePool>,
    /// Outbound chat transport.
    pub transport: Arc<dyn ChatTransport>,
    /// Locale catalog.
    pub catalog: Arc<Catalog>,
    /// Tracker for fire-and-forget broadcast/retraction jobs so shutdown
    /// can await them.
    pub jobs: TaskTracker,
}

impl BotContext {
    /// Conversation state store handle.
    #[must_use]
    pub fn states(&self) -> ConversationStore {
        ConversationStore::new(Arc::clone(&self.db))
    }

    /// User repository handle.
    #[must_use]
    pub fn users(&self) -> UserRepo {
        UserRepo::new(Arc::clone(&self.db))
    }

    /// Worker repository handle.
    #[must_use]
    pub fn workers(&self) -> WorkerRepo {
        WorkerRepo::new(Arc::clone(&self.db))
    }

    /// Task type repository handle.
    #[must_use]
    pub fn task_types(&self) -> TaskTypeRepo {
        TaskTypeRepo::new(Arc::clone(&self.db))
    }

    /// Task repository handle.
    #[must_use]
    pub fn tasks(&self) -> TaskRepo {
        TaskRepo::new(Arc::clone(&self.db))
    }

    /// Offer repository handle.
    #[must_use]
    pub fn offers(&self) -> OfferRepo {
        OfferRepo::new(Arc::clone(&self.db))
    }

    /// Report repository handle.
    #[must_use]
    pub fn reports(&self) -> ReportRepo {
        ReportRepo::new(Arc::clone(&self.db))
    }

    /// Localized string lookup.
    #[must_use]
    pub fn text(&self, locale: Option<&str>, key: &str) -> String {
        self.catalog.text(locale, key)
    }

    /// Localized string lookup with placeholder substitution.
    #[must_use]
    pub fn text_with(&self, locale: Option<&str>, key: &str, args: &[(&str, &str)]) -> String {
        self.catalog.text_with(locale, key, args)
    }

    /// Fixed offset used to interpret and render wall-clock times.
    #[must_use]
    pub fn config_tz(&self) -> FixedOffset {
        FixedOffset::east_opt(i32::from(self.config.utc_offset_hours) * 3600)
            .unwrap_or_else(|| Utc.fix())
    }
}

/// Entry point for one inbound update.
///
/// Errors never escape: they are logged with the update id so one bad
/// update cannot take the poller down or starve other users.
pub async fn handle_update(ctx: Arc<BotContext>, update: Update) {
    let update_id = update.update_id;
    if let Err(err) = route(&ctx, update).await {
        error!(update_id, %err, "update handler failed");
    }
}

async fn route(ctx: &Arc<BotContext>, update: Update) -> Result<()> {
    if let Some(message) = update.message {
        let Some(from) = message.from.clone() else {
            return Ok(());
        };
        upsert_user(ctx, &from).await?;
        handle_message(ctx, &message, from.id, from.language_code.as_deref()).await?;
    } else if let Some(call) = update.callback_query {
        let from = call.from.clone();
        upsert_user(ctx, &from).await?;
        handle_callback(ctx, &call, from.id, from.language_code.as_deref()).await?;
    }
    Ok(())
}

/// Create the sender on first contact or refresh their name fields.
///
/// New non-operator users are seeded into the registration flow.
async fn upsert_user(ctx: &BotContext, from: &TgUser) -> Result<()> {
    let user = User {
        id: from.id,
        first_name: from.first_name.clone(),
        last_name: from.last_name.clone(),
        username: from.username.clone(),
        locale: from.language_code.clone(),
    };
    let initial_state = if ctx.config.is_operator(from.id) {
        None
    } else {
        Some(registration::FIRST_STATE)
    };
    ctx.users().upsert(&user, initial_state).await
}

async fn handle_message(
    ctx: &Arc<BotContext>,
    message: &Message,
    user_id: i64,
    locale: Option<&str>,
) -> Result<()> {
    if let Some(text) = message.text.as_deref() {
        if let Some(rest) = text.strip_prefix('/') {
            let command = rest.split_whitespace().next().unwrap_or("");
            if handle_command(ctx, command, user_id, locale).await? {
                return Ok(());
            }
        }
    }

    let (state, _) = ctx.states().get(user_id).await?;
    let Some(state) = state else {
        return Ok(());
    };

    match state.as_str() {
        registration::FIRST_STATE => registration::first_message(ctx, user_id, locale).await,
        registration::CONTACT_STATE => {
            registration::handle_contact(ctx, message, user_id, locale).await
        }
        worker_actions::PHOTO_STATE => {
            worker_actions::handle_photo(ctx, message, user_id, locale).await
        }
        TYPE_DELETE_STATE => handle_type_deletion(ctx, message, user_id, locale).await,
        other => handle_wizard_message(ctx, other, message, user_id, locale).await,
    }
}

async fn handle_wizard_message(
    ctx: &Arc<BotContext>,
    state: &str,
    message: &Message,
    user_id: i64,
    locale: Option<&str>,
) -> Result<()> {
    let Some(text) = message.text.as_deref() else {
        return Ok(());
    };
    let Some((wizard_name, suffix)) = state.split_once(':') else {
        warn!(state, "message in unknown conversation state");
        return Ok(());
    };
    let spec = match wizard_name {
        "worker" => &wizard::worker::SPEC,
        "task" => &wizard::task::SPEC,
        "type" => &wizard::task_type::SPEC,
        _ => {
            warn!(state, "message in unknown wizard state");
            return Ok(());
        }
    };

    let outcome = wizard::handle_message(ctx, spec, user_id, locale, suffix, text).await?;
    if outcome == EngineOutcome::ReadyToFinalize {
        // Only the no-review type wizard finalizes from a message.
        wizard::task_type::finalize(ctx, user_id, locale).await?;
    }
    Ok(())
}

/// Run a recognized command. Returns false when the text should fall
/// through to state-based dispatch instead.
async fn handle_command(
    ctx: &Arc<BotContext>,
    command: &str,
    user_id: i64,
    locale: Option<&str>,
) -> Result<bool> {
    let operator = ctx.config.is_operator(user_id);
    match command {
        "start" => {
            ctx.states().reset(user_id, true).await?;
            ctx.transport
                .send_message(
                    user_id,
                    &ctx.text(locale, "start_message"),
                    Some(ReplyMarkup::remove()),
                )
                .await?;
        }
        "create_task" if operator => {
            let task_types = ctx.task_types().list_ordered().await?;
            if task_types.is_empty() {
                ctx.transport
                    .send_message(user_id, &ctx.text(locale, "no_task_types"), None)
                    .await?;
            } else {
                wizard::start(ctx, &wizard::task::SPEC, user_id, locale).await?;
            }
        }
        "enter_worker" if operator => {
            wizard::start(ctx, &wizard::worker::SPEC, user_id, locale).await?;
        }
        "create_type" if operator => {
            wizard::start(ctx, &wizard::task_type::SPEC, user_id, locale).await?;
        }
        "delete_type" if operator => {
            let task_types = ctx.task_types().list_ordered().await?;
            if task_types.is_empty() {
                ctx.transport
                    .send_message(user_id, &ctx.text(locale, "no_types_to_delete"), None)
                    .await?;
            } else {
                ctx.states().reset(user_id, true).await?;
                ctx.states()
                    .set_state(user_id, Some(TYPE_DELETE_STATE))
                    .await?;
                ctx.transport
                    .send_message(
                        user_id,
                        &ctx.text(locale, "ask_type_to_delete"),
                        Some(markup::task_types_keyboard(&task_types)),
                    )
                    .await?;
            }
        }
        _ => return Ok(false),
    }
    Ok(true)
}

/// One-step type deletion: a catalog label selects the row to delete.
async fn handle_type_deletion(
    ctx: &BotContext,
    message: &Message,
    user_id: i64,
    locale: Option<&str>,
) -> Result<()> {
    let Some(text) = message.text.as_deref() else {
        return Ok(());
    };
    let Some((name, difficulty)) = crate::models::task_type::parse_label(text.trim()) else {
        ctx.transport
            .send_message(user_id, &ctx.text(locale, "task_type_invalid_error"), None)
            .await?;
        return Ok(());
    };

    if ctx.task_types().delete(&name, difficulty).await?.is_none() {
        ctx.transport
            .send_message(user_id, &ctx.text(locale, "task_type_not_found_error"), None)
            .await?;
        return Ok(());
    }

    ctx.states().reset(user_id, true).await?;
    ctx.transport
        .send_message(
            user_id,
            &ctx.text(locale, "task_type_deleted"),
            Some(ReplyMarkup::remove()),
        )
        .await?;
    Ok(())
}

async fn handle_callback(
    ctx: &Arc<BotContext>,
    call: &CallbackQuery,
    user_id: i64,
    locale: Option<&str>,
) -> Result<()> {
    let Some(data) = call.data.as_deref().and_then(CallbackData::decode) else {
        warn!(user_id, "callback with undecodable payload");
        return ctx.transport.answer_callback(&call.id, None, false).await;
    };

    match data.action.as_str() {
        actions::CLAIM => worker_actions::handle_claim(ctx, call, &data, user_id, locale).await,
        actions::TIMELINESS => {
            worker_actions::handle_timeliness(ctx, call, &data, user_id, locale).await
        }
        actions::TASK_DONE => worker_actions::handle_task_done(ctx, call, user_id, locale).await,
        actions::REVIEW => {
            if !ctx.config.is_operator(user_id) {
                warn!(user_id, "non-operator attempted a review action");
                return ctx.transport.answer_callback(&call.id, None, false).await;
            }
            review::handle_review(ctx, call, &data, locale).await
        }
        actions::WIZ_CONFIRM | actions::WIZ_EDIT | actions::WIZ_STEP | actions::WIZ_CANCEL => {
            handle_wizard_callback(ctx, call, &data, user_id, locale).await
        }
        other => {
            warn!(user_id, action = other, "unknown callback action");
            ctx.transport.answer_callback(&call.id, None, false).await
        }
    }
}

async fn handle_wizard_callback(
    ctx: &Arc<BotContext>,
    call: &CallbackQuery,
    data: &CallbackData,
    user_id: i64,
    locale: Option<&str>,
) -> Result<()> {
    let (state, _) = ctx.states().get(user_id).await?;
    let Some(state) = state else {
        // Wizard already finished or abandoned; the button is stale.
        return ctx.transport.answer_callback(&call.id, None, false).await;
    };
    let Some((wizard_name, suffix)) = state.split_once(':') else {
        return ctx.transport.answer_callback(&call.id, None, false).await;
    };
    let spec = match wizard_name {
        "worker" => &wizard::worker::SPEC,
        "task" => &wizard::task::SPEC,
        _ => {
            warn!(state, "wizard callback in non-wizard state");
            return ctx.transport.answer_callback(&call.id, None, false).await;
        }
    };

    if data.action == actions::WIZ_CONFIRM {
        if suffix != wizard::REVIEW_SUFFIX {
            return ctx.transport.answer_callback(&call.id, None, false).await;
        }
        return match wizard_name {
            "worker" => wizard::worker::finalize(ctx, user_id, locale, call).await,
            _ => wizard::task::finalize(ctx, user_id, locale, call).await,
        };
    }

    wizard::handle_callback(ctx, spec, user_id, locale, suffix, call, data).await
}
