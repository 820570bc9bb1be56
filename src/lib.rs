#![forbid(unsafe_code)]

pub mod config;
pub mod dispatch;
pub mod errors;
pub mod i18n;
pub mod models;
pub mod orchestrator;
pub mod persistence;
pub mod phone;
pub mod telegram;
pub mod wizard;

pub use config::GlobalConfig;
pub use errors::{AppError, Result};
