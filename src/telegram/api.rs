//! Telegram Bot API wire types.
//!
//! Only the fields this bot reads are modeled; everything else in the
//! upstream objects is ignored during deserialization.

use serde::{Deserialize, Serialize};

/// One inbound update from `getUpdates`.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    /// Monotonic update identifier used for long-poll offsets.
    pub update_id: i64,
    /// Present for plain message updates.
    pub message: Option<Message>,
    /// Present for inline-button presses.
    pub callback_query: Option<CallbackQuery>,
}

/// An inbound chat message.
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    /// Message identifier, unique within the chat.
    pub message_id: i64,
    /// Sender; absent for channel posts, which this bot ignores.
    pub from: Option<TgUser>,
    /// Chat the message was posted in.
    pub chat: Chat,
    /// Text content, if any.
    pub text: Option<String>,
    /// Attached contact card, if any.
    pub contact: Option<Contact>,
    /// Attached photo size variants, if any.
    pub photo: Option<Vec<PhotoSize>>,
}

/// Sender identity attached to messages and callback queries.
#[derive(Debug, Clone, Deserialize)]
pub struct TgUser {
    /// Platform-assigned stable identifier.
    pub id: i64,
    /// First name.
    pub first_name: String,
    /// Last name, when set.
    pub last_name: Option<String>,
    /// Public username, when set.
    pub username: Option<String>,
    /// IETF language tag reported by the client.
    pub language_code: Option<String>,
}

/// Chat reference.
#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    /// Chat identifier; equals the user id for private chats.
    pub id: i64,
}

/// Shared contact card.
#[derive(Debug, Clone, Deserialize)]
pub struct Contact {
    /// Phone number as entered by the sharing client.
    pub phone_number: String,
}

/// One size variant of an attached photo.
#[derive(Debug, Clone, Deserialize)]
pub struct PhotoSize {
    /// File identifier usable for downloads and re-sends.
    pub file_id: String,
}

/// An inline-button press.
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    /// Query identifier to acknowledge via `answerCallbackQuery`.
    pub id: String,
    /// User who pressed the button.
    pub from: TgUser,
    /// Message the button was attached to.
    pub message: Option<Message>,
    /// Compact payload bound to the button.
    pub data: Option<String>,
}

// ── Outbound keyboards ───────────────────────────────────

/// Any reply-markup payload accepted by `sendMessage`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ReplyMarkup {
    /// Inline buttons attached to the message.
    Inline(InlineKeyboardMarkup),
    /// One-time reply keyboard shown under the input field.
    Reply(ReplyKeyboardMarkup),
    /// Removal of any visible reply keyboard.
    Remove(ReplyKeyboardRemove),
}

/// Inline keyboard: rows of callback buttons.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct InlineKeyboardMarkup {
    /// Button rows.
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

/// One inline button carrying a compact callback payload.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct InlineKeyboardButton {
    /// Visible label.
    pub text: String,
    /// Opaque payload returned on press.
    pub callback_data: String,
}

impl InlineKeyboardButton {
    /// Build a button from a label and payload.
    #[must_use]
    pub fn new(text: impl Into<String>, callback_data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            callback_data: callback_data.into(),
        }
    }
}

/// Reply keyboard shown under the input field.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ReplyKeyboardMarkup {
    /// Button rows.
    pub keyboard: Vec<Vec<KeyboardButton>>,
    /// Shrink buttons to fit their labels.
    pub resize_keyboard: bool,
    /// Hide the keyboard after one use.
    pub one_time_keyboard: bool,
}

/// One reply keyboard button.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct KeyboardButton {
    /// Visible label, also sent back as the message text on tap.
    pub text: String,
    /// Request the user's contact card instead of sending text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_contact: Option<bool>,
}

impl KeyboardButton {
    /// Plain text button.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            request_contact: None,
        }
    }

    /// Contact-request button.
    #[must_use]
    pub fn contact(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            request_contact: Some(true),
        }
    }
}

/// Removal payload for a visible reply keyboard.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ReplyKeyboardRemove {
    /// Always true.
    pub remove_keyboard: bool,
}

impl ReplyMarkup {
    /// One-column inline keyboard.
    #[must_use]
    pub fn inline_column(buttons: Vec<InlineKeyboardButton>) -> Self {
        Self::Inline(InlineKeyboardMarkup {
            inline_keyboard: buttons.into_iter().map(|b| vec![b]).collect(),
        })
    }

    /// Inline keyboard with explicit rows.
    #[must_use]
    pub fn inline_rows(rows: Vec<Vec<InlineKeyboardButton>>) -> Self {
        Self::Inline(InlineKeyboardMarkup {
            inline_keyboard: rows,
        })
    }

    /// One-column one-time reply keyboard.
    #[must_use]
    pub fn reply_column(buttons: Vec<KeyboardButton>) -> Self {
        Self::Reply(ReplyKeyboardMarkup {
            keyboard: buttons.into_iter().map(|b| vec![b]).collect(),
            resize_keyboard: true,
            one_time_keyboard: true,
        })
    }

    /// Single-row one-time reply keyboard.
    #[must_use]
    pub fn reply_row(buttons: Vec<KeyboardButton>) -> Self {
        Self::Reply(ReplyKeyboardMarkup {
            keyboard: vec![buttons],
            resize_keyboard: true,
            one_time_keyboard: true,
        })
    }

    /// Keyboard removal marker.
    #[must_use]
    pub fn remove() -> Self {
        Self::Remove(ReplyKeyboardRemove {
            remove_keyboard: true,
        })
    }
}
