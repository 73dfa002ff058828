//! Telegram delivery and bot commands

pub mod client;
pub mod commands;
pub mod messages;

pub use client::TelegramClient;
pub use commands::{Command, CommandHandler};
