//! Solend watcher API clients for external services.
//!
//! This crate provides HTTP clients for:
//! - Solend: market, reserve and obligation data
//! - Telegram: alert delivery with inline link buttons

mod error;
mod solend;
mod telegram;

pub use error::{ApiError, ApiResult};
pub use solend::{Deposit, Market, Obligation, Reserve, SolendClient, DEFAULT_MARKETS_URL};
pub use telegram::{
    TelegramNotifier, CHAT_ID_ENV, DEFAULT_API_BASE, DEFAULT_EXPLORER_ACCOUNT_URL,
    DEFAULT_PROTOCOL_URL, TOKEN_ENV,
};
