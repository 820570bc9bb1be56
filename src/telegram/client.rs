//! Telegram Bot API client over HTTPS long polling.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::config::TelegramConfig;
use crate::telegram::api::{InlineKeyboardMarkup, ReplyMarkup, Update};
use crate::telegram::transport::ChatTransport;
use crate::{AppError, Result};

/// Concrete Bot API client.
pub struct BotClient {
    http: reqwest::Client,
    api_base: String,
    bot_token: String,
    poll_timeout_seconds: u64,
}

impl BotClient {
    /// Build a client from the Telegram configuration.
    #[must_use]
    pub fn new(config: &TelegramConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_owned(),
            bot_token: config.bot_token.clone(),
            poll_timeout_seconds: config.poll_timeout_seconds,
        }
    }

    fn api_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.api_base, self.bot_token)
    }

    /// Call one Bot API method and unwrap the `{ok, result}` envelope.
    async fn call(&self, method: &str, body: Value) -> Result<Value> {
        let response = self
            .http
            .post(self.api_url(method))
            .json(&body)
            .send()
            .await
            .map_err(|err| AppError::Telegram(format!("{method} request failed: {err}")))?;

        let envelope: Value = response
            .json()
            .await
            .map_err(|err| AppError::Telegram(format!("{method} returned non-json: {err}")))?;

        if envelope["ok"].as_bool() == Some(true) {
            Ok(envelope["result"].clone())
        } else {
            let description = envelope["description"].as_str().unwrap_or("unknown error");
            Err(AppError::Telegram(format!("{method}: {description}")))
        }
    }

    /// Long-poll for the next batch of updates.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Telegram` if the call or decoding fails.
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>> {
        let result = self
            .call(
                "getUpdates",
                json!({
                    "offset": offset,
                    "timeout": self.poll_timeout_seconds,
                    "allowed_updates": ["message", "callback_query"],
                }),
            )
            .await?;
        serde_json::from_value(result)
            .map_err(|err| AppError::Telegram(format!("getUpdates decode failed: {err}")))
    }
}

#[async_trait]
impl ChatTransport for BotClient {
    async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        markup: Option<ReplyMarkup>,
    ) -> Result<i64> {
        let mut body = json!({ "chat_id": chat_id, "text": text });
        if let Some(markup) = markup {
            body["reply_markup"] = serde_json::to_value(markup)
                .map_err(|err| AppError::Telegram(format!("bad reply markup: {err}")))?;
        }
        let result = self.call("sendMessage", body).await?;
        result["message_id"]
            .as_i64()
            .ok_or_else(|| AppError::Telegram("sendMessage result missing message_id".into()))
    }

    async fn edit_message_text(
        &self,
        chat_id: i64,
        message_id: i64,
        text: &str,
        markup: Option<InlineKeyboardMarkup>,
    ) -> Result<()> {
        let mut body = json!({
            "chat_id": chat_id,
            "message_id": message_id,
            "text": text,
        });
        if let Some(markup) = markup {
            body["reply_markup"] = serde_json::to_value(markup)
                .map_err(|err| AppError::Telegram(format!("bad reply markup: {err}")))?;
        }
        self.call("editMessageText", body).await?;
        Ok(())
    }

    async fn clear_reply_markup(&self, chat_id: i64, message_id: i64) -> Result<()> {
        self.call(
            "editMessageReplyMarkup",
            json!({ "chat_id": chat_id, "message_id": message_id }),
        )
        .await?;
        Ok(())
    }

    async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<()> {
        self.call(
            "deleteMessage",
            json!({ "chat_id": chat_id, "message_id": message_id }),
        )
        .await?;
        Ok(())
    }

    async fn forward_message(
        &self,
        to_chat_id: i64,
        from_chat_id: i64,
        message_id: i64,
    ) -> Result<i64> {
        let result = self
            .call(
                "forwardMessage",
                json!({
                    "chat_id": to_chat_id,
                    "from_chat_id": from_chat_id,
                    "message_id": message_id,
                }),
            )
            .await?;
        result["message_id"]
            .as_i64()
            .ok_or_else(|| AppError::Telegram("forwardMessage result missing message_id".into()))
    }

    async fn answer_callback(
        &self,
        callback_id: &str,
        text: Option<&str>,
        show_alert: bool,
    ) -> Result<()> {
        let mut body = json!({ "callback_query_id": callback_id, "show_alert": show_alert });
        if let Some(text) = text {
            body["text"] = Value::String(text.to_owned());
        }
        self.call("answerCallbackQuery", body).await?;
        Ok(())
    }
}
