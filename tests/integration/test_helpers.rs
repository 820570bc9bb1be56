//! Shared test helpers for handler-level integration tests.
//!
//! Provides reusable construction of `BotContext`, a recording chat
//! transport double, seeded entities, and inbound update builders so
//! individual test modules can focus on behaviour rather than
//! boilerplate.

use std::collections::HashSet;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio_util::task::TaskTracker;

use crewcall::config::GlobalConfig;
use crewcall::dispatch::BotContext;
use crewcall::i18n::Catalog;
use crewcall::models::{Difficulty, SkillLevel, Task, TaskType, User, Worker};
use crewcall::persistence::db;
use crewcall::telegram::api::{
    CallbackQuery, Chat, Contact, InlineKeyboardMarkup, Message, PhotoSize, ReplyMarkup, TgUser,
    Update,
};
use crewcall::telegram::transport::ChatTransport;
use crewcall::{AppError, Result};

/// Operator id used by the test configuration.
pub const OPERATOR_ID: i64 = 1;

/// One recorded outbound message.
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub chat_id: i64,
    pub text: String,
    pub markup: Option<ReplyMarkup>,
}

/// Chat transport double that records every outbound operation.
#[derive(Default)]
pub struct RecordingTransport {
    next_message_id: AtomicI64,
    pub sent: Mutex<Vec<SentMessage>>,
    pub edited: Mutex<Vec<(i64, i64, String)>>,
    pub cleared: Mutex<Vec<(i64, i64)>>,
    pub deleted: Mutex<Vec<(i64, i64)>>,
    pub forwarded: Mutex<Vec<(i64, i64, i64)>>,
    pub answered: Mutex<Vec<(String, Option<String>, bool)>>,
    /// Chats whose sends fail, for delivery fault isolation tests.
    pub failing_chats: Mutex<HashSet<i64>>,
}

impl RecordingTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            next_message_id: AtomicI64::new(100),
            ..Self::default()
        })
    }

    pub fn fail_chat(&self, chat_id: i64) {
        self.failing_chats.lock().expect("lock").insert(chat_id);
    }

    pub fn sent_to(&self, chat_id: i64) -> Vec<SentMessage> {
        self.sent
            .lock()
            .expect("lock")
            .iter()
            .filter(|message| message.chat_id == chat_id)
            .cloned()
            .collect()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().expect("lock").len()
    }

    pub fn last_sent(&self) -> Option<SentMessage> {
        self.sent.lock().expect("lock").last().cloned()
    }

    pub fn last_answer(&self) -> Option<(String, Option<String>, bool)> {
        self.answered.lock().expect("lock").last().cloned()
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        markup: Option<ReplyMarkup>,
    ) -> Result<i64> {
        if self.failing_chats.lock().expect("lock").contains(&chat_id) {
            return Err(AppError::Telegram(format!("chat {chat_id} unreachable")));
        }
        let message_id = self.next_message_id.fetch_add(1, Ordering::SeqCst);
        self.sent.lock().expect("lock").push(SentMessage {
            chat_id,
            text: text.to_owned(),
            markup,
        });
        Ok(message_id)
    }

    async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        _markup: Option<InlineKeyboardMarkup>,
    ) -> Result<()> {
        self.edited
            .lock()
            .expect("lock")
            .push((chat_id, message_id, text.to_owned()));
        Ok(())
    }

    async fn clear_reply_markup(&self, chat_id: i64, message_id: i64) -> Result<()> {
        self.cleared.lock().expect("lock").push((chat_id, message_id));
        Ok(())
    }

    async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<()> {
        if self.failing_chats.lock().expect("lock").contains(&chat_id) {
            return Err(AppError::Telegram(format!("chat {chat_id} unreachable")));
        }
        self.deleted.lock().expect("lock").push((chat_id, message_id));
        Ok(())
    }

    async fn forward_message(
        &self,
        to_chat_id: i64,
        from_chat_id: i64,
        message_id: i64,
    ) -> Result<i64> {
        self.forwarded
            .lock()
            .expect("lock")
            .push((to_chat_id, from_chat_id, message_id));
        Ok(self.next_message_id.fetch_add(1, Ordering::SeqCst))
    }

    async fn answer_callback(
        &self,
        callback_id: &str,
        text: Option<&str>,
        show_alert: bool,
    ) -> Result<()> {
        self.answered.lock().expect("lock").push((
            callback_id.to_owned(),
            text.map(str::to_owned),
            show_alert,
        ));
        Ok(())
    }
}

/// Build the test configuration (zero send spacing keeps tests fast).
pub fn test_config() -> GlobalConfig {
    GlobalConfig::from_toml_str(
        r#"
db_path = "unused.db"
operator_id = 1
default_country_code = "+7"
send_spacing_ms = 0

[telegram]
"#,
    )
    .expect("valid test config")
}

/// Build a complete `BotContext` over in-memory `SQLite` and a
/// recording transport.
pub async fn test_ctx() -> (Arc<BotContext>, Arc<RecordingTransport>) {
    let config = Arc::new(test_config());
    let database = Arc::new(db::connect_memory().await.expect("db connect"));
    let transport = RecordingTransport::new();
    let catalog = Arc::new(Catalog::embedded(&config.default_locale).expect("catalog"));
    let ctx = Arc::new(BotContext {
        config,
        db: database,
        transport: Arc::clone(&transport) as Arc<dyn ChatTransport>,
        catalog,
        jobs: TaskTracker::new(),
    });
    (ctx, transport)
}

/// Upsert a plain user row (needed for locale lookup and state storage).
pub async fn seed_user(ctx: &BotContext, id: i64) {
    let user = User {
        id,
        first_name: format!("User{id}"),
        last_name: None,
        username: None,
        locale: Some("en".into()),
    };
    ctx.users().upsert(&user, None).await.expect("upsert user");
}

/// Create a worker and bind it to the given chat id (registered).
pub async fn seed_registered_worker(ctx: &BotContext, chat_id: i64, skill: SkillLevel) -> Worker {
    seed_user(ctx, chat_id).await;
    let worker = Worker::new(
        format!("Worker {chat_id}"),
        format!("+7999000{chat_id:04}"),
        skill,
    );
    ctx.workers().create(&worker).await.expect("create worker");
    ctx.workers()
        .register_by_phone(&worker.phone, chat_id)
        .await
        .expect("register worker")
        .expect("worker row matched");
    ctx.workers()
        .get(&chat_id.to_string())
        .await
        .expect("registered worker")
}

/// Create a catalog entry.
pub async fn seed_task_type(ctx: &BotContext, name: &str, difficulty: Difficulty) -> TaskType {
    let task_type = TaskType::new(name.to_owned(), difficulty);
    ctx.task_types()
        .create(&task_type)
        .await
        .expect("create task type");
    task_type
}

/// Create an unclaimed task scheduled relative to now.
pub async fn seed_task(ctx: &BotContext, type_id: &str, minutes_from_now: i64) -> Task {
    let task = Task::new(
        "Block A".into(),
        Utc::now() + Duration::minutes(minutes_from_now),
        "+79990001122".into(),
        None,
        1500,
        type_id.to_owned(),
    );
    ctx.tasks().create(&task).await.expect("create task");
    task
}

fn tg_user(id: i64) -> TgUser {
    TgUser {
        id,
        first_name: format!("User{id}"),
        last_name: None,
        username: None,
        language_code: Some("en".into()),
    }
}

fn base_message(user_id: i64) -> Message {
    Message {
        message_id: 1,
        from: Some(tg_user(user_id)),
        chat: Chat { id: user_id },
        text: None,
        contact: None,
        photo: None,
    }
}

/// Inbound text message update.
pub fn text_update(update_id: i64, user_id: i64, text: &str) -> Update {
    let mut message = base_message(user_id);
    message.text = Some(text.to_owned());
    Update {
        update_id,
        message: Some(message),
        callback_query: None,
    }
}

/// Inbound contact card update.
pub fn contact_update(update_id: i64, user_id: i64, phone: &str) -> Update {
    let mut message = base_message(user_id);
    message.contact = Some(Contact {
        phone_number: phone.to_owned(),
    });
    Update {
        update_id,
        message: Some(message),
        callback_query: None,
    }
}

/// Inbound photo update.
pub fn photo_update(update_id: i64, user_id: i64, message_id: i64) -> Update {
    let mut message = base_message(user_id);
    message.message_id = message_id;
    message.photo = Some(vec![PhotoSize {
        file_id: "photo-file".into(),
    }]);
    Update {
        update_id,
        message: Some(message),
        callback_query: None,
    }
}

/// Inbound button press update.
pub fn callback_update(update_id: i64, user_id: i64, data: &str, message_id: i64) -> Update {
    let mut message = base_message(user_id);
    message.message_id = message_id;
    message.from = None;
    Update {
        update_id,
        message: None,
        callback_query: Some(CallbackQuery {
            id: format!("cb-{update_id}"),
            from: tg_user(user_id),
            message: Some(message),
            data: Some(data.to_owned()),
        }),
    }
}
