//! Bot command handling: `/start` subscribes a chat, `/stop` removes it.
//!
//! Runs as its own task next to the scan loop and shares nothing with it
//! but the [`SubscriberRegistry`].

use super::client::TelegramClient;
use super::messages::Update;
use crate::subscribers::SubscriberRegistry;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

pub const SUBSCRIBED_REPLY: &str = "✅ Subscribed to OI accumulation alerts";
pub const UNSUBSCRIBED_REPLY: &str = "❌ Subscription disabled";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
}

impl Command {
    /// Parse the leading command word, tolerating `@botname` suffixes
    pub fn parse(text: &str) -> Option<Self> {
        let word = text.split_whitespace().next()?;
        let name = word.split('@').next()?;
        match name {
            "/start" => Some(Command::Start),
            "/stop" => Some(Command::Stop),
            _ => None,
        }
    }
}

pub struct CommandHandler {
    client: Arc<TelegramClient>,
    subscribers: Arc<SubscriberRegistry>,
    poll_timeout: Duration,
    error_backoff: Duration,
}

impl CommandHandler {
    pub fn new(client: Arc<TelegramClient>, subscribers: Arc<SubscriberRegistry>) -> Self {
        Self {
            client,
            subscribers,
            poll_timeout: Duration::from_secs(25),
            error_backoff: Duration::from_secs(5),
        }
    }

    /// Apply one update. Returns the command that was handled, if any.
    pub async fn handle_update(&self, update: &Update) -> Option<Command> {
        let message = update.message.as_ref()?;
        let command = Command::parse(message.text.as_deref()?)?;
        let chat_id = message.chat.id;

        let reply = match command {
            Command::Start => {
                if self.subscribers.subscribe(chat_id).await {
                    info!(chat_id = chat_id, "Telegram: chat subscribed");
                }
                SUBSCRIBED_REPLY
            }
            Command::Stop => {
                if self.subscribers.unsubscribe(chat_id).await {
                    info!(chat_id = chat_id, "Telegram: chat unsubscribed");
                }
                UNSUBSCRIBED_REPLY
            }
        };

        if let Err(e) = self.client.send_message(chat_id, reply).await {
            warn!(chat_id = chat_id, error = %e, "Telegram: failed to reply to command");
        }
        Some(command)
    }

    /// Poll for updates until `shutdown` flips to true
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!("Telegram: command handler started");
        let mut offset: Option<i64> = None;

        while !*shutdown.borrow() {
            let updates = tokio::select! {
                _ = shutdown.changed() => break,
                result = self.client.get_updates(offset, self.poll_timeout) => result,
            };

            match updates {
                Ok(updates) => {
                    for update in &updates {
                        offset = Some(update.update_id + 1);
                        self.handle_update(update).await;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Telegram: getUpdates failed");
                    tokio::select! {
                        _ = shutdown.changed() => break,
                        _ = tokio::time::sleep(self.error_backoff) => {}
                    }
                }
            }
        }

        info!("Telegram: command handler stopped");
    }
}
