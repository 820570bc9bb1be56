//! Chat transport seam.
//!
//! Protocol code (broadcast, claim, reminders, wizards) talks to this
//! trait instead of the concrete Bot API client so tests can substitute
//! a recording double.

use async_trait::async_trait;

use crate::telegram::api::{InlineKeyboardMarkup, ReplyMarkup};
use crate::Result;

/// Outbound message operations the workflow core needs.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send a text message, optionally with a keyboard. Returns the new
    /// message id.
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        markup: Option<ReplyMarkup>,
    ) -> Result<i64>;

    /// Replace the text (and inline keyboard) of an existing message.
    async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        markup: Option<InlineKeyboardMarkup>,
    ) -> Result<()>;

    /// Strip the inline keyboard from an existing message.
    async fn clear_reply_markup(&self, chat_id: i64, message_id: i64) -> Result<()>;

    /// Delete an existing message.
    async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<()>;

    /// Forward a message between chats. Returns the forwarded message id.
    async fn forward_message(
        &self,
        to_chat_id: i64,
        from_chat_id: i64,
        message_id: i64,
    ) -> Result<i64>;

    /// Acknowledge a button press, optionally with a toast or alert.
    async fn answer_callback(
        &self,
        callback_id: &str,
        text: Option<&str>,
        show_alert: bool,
    ) -> Result<()>;
}
