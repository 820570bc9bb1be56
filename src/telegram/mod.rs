//! Telegram Bot API boundary: wire types, client, transport trait,
//! callback payload codec, keyboard builders, and the update poller.

pub mod api;
pub mod callback;
pub mod client;
pub mod markup;
pub mod poller;
pub mod transport;

pub use callback::CallbackData;
pub use client::BotClient;
pub use transport::ChatTransport;
