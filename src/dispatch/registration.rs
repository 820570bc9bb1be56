//! Worker registration flow.
//!
//! A new non-operator user is greeted and asked for their phone (contact
//! card or typed). The canonical phone is matched against an
//! operator-created worker row with a conditional update that binds the
//! chat identity to the worker record.

use crate::dispatch::BotContext;
use crate::phone;
use crate::telegram::api::{Message, ReplyMarkup};
use crate::telegram::markup;
use crate::Result;

/// State seeded for brand-new non-operator users.
pub const FIRST_STATE: &str = "register:first";
/// State awaiting the phone number.
pub const CONTACT_STATE: &str = "register:contact";

/// Greet a first-time user and request their contact.
///
/// # Errors
///
/// Returns an error on persistence or transport failure.
pub async fn first_message(ctx: &BotContext, user_id: i64, locale: Option<&str>) -> Result<()> {
    ctx.states()
        .set_state(user_id, Some(CONTACT_STATE))
        .await?;
    ctx.transport
        .send_message(
            user_id,
            &ctx.text(locale, "first_message"),
            Some(markup::contact_keyboard(&ctx.catalog, locale)),
        )
        .await?;
    Ok(())
}

/// Match the provided phone against the worker roster.
///
/// Success binds the user id to the worker row and leaves the
/// registration flow; an unknown phone re-prompts in place.
///
/// # Errors
///
/// Returns an error on persistence or transport failure.
pub async fn handle_contact(
    ctx: &BotContext,
    message: &Message,
    user_id: i64,
    locale: Option<&str>,
) -> Result<()> {
    let raw = message
        .contact
        .as_ref()
        .map(|contact| contact.phone_number.clone())
        .or_else(|| message.text.clone());
    let Some(raw) = raw else {
        return Ok(());
    };

    let Ok(canonical) = phone::canonicalize(&raw, &ctx.config.default_country_code) else {
        ctx.transport
            .send_message(user_id, &ctx.text(locale, "contact_parse_error"), None)
            .await?;
        return Ok(());
    };

    match ctx.workers().register_by_phone(&canonical, user_id).await? {
        Some(name) => {
            ctx.states().reset(user_id, true).await?;
            ctx.transport
                .send_message(
                    user_id,
                    &ctx.text_with(locale, "welcome_message", &[("name", &name)]),
                    Some(ReplyMarkup::remove()),
                )
                .await?;
        }
        None => {
            ctx.transport
                .send_message(user_id, &ctx.text(locale, "worker_not_found"), None)
                .await?;
        }
    }
    Ok(())
}
