use crate::config::TelegramConfig;
use crate::error::{AppError, AppResult};
use crate::models::{Contribution, Event, RoomKind, User};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};

const SEND_TIMEOUT: Duration = Duration::from_secs(5);

/// Best-effort Telegram notifications.
///
/// Sending never fails the operation that triggered it: errors are logged
/// and dropped.
pub struct Notifier {
    client: Client,
    api_url: String,
    bot_token: Option<String>,
}

impl Notifier {
    pub fn new(config: &TelegramConfig) -> Self {
        Self {
            client: Client::new(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            bot_token: config.bot_token.clone(),
        }
    }

    /// A notifier that never sends anything
    pub fn disabled() -> Self {
        Self {
            client: Client::new(),
            api_url: String::new(),
            bot_token: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.bot_token.is_some()
    }

    /// Call `sendMessage` for one chat
    pub async fn send(&self, chat_id: i64, text: &str) -> AppResult<()> {
        let Some(token) = &self.bot_token else {
            return Ok(());
        };

        let response = self
            .client
            .post(format!("{}/bot{}/sendMessage", self.api_url, token))
            .json(&serde_json::json!({ "chat_id": chat_id, "text": text }))
            .timeout(SEND_TIMEOUT)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Telegram request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::ExternalService(format!(
                "Telegram returned {}",
                response.status()
            )));
        }
        Ok(())
    }

    /// Send `text` to every user with a Telegram id, logging failures
    pub async fn broadcast(&self, users: &[User], text: &str) {
        if !self.is_enabled() {
            debug!("Notifications disabled, skipping {} recipients", users.len());
            return;
        }

        let mut sent = 0usize;
        for user in users {
            let Some(chat_id) = user.telegram_id else {
                continue;
            };
            match self.send(chat_id, text).await {
                Ok(()) => sent += 1,
                Err(e) => warn!("Failed to notify user {}: {}", user.id, e),
            }
        }
        info!("Sent {} notifications", sent);
    }
}

pub fn draw_completed_message(kind: RoomKind, room_title: &str) -> String {
    let game = match kind {
        RoomKind::SecretSanta => "Secret Santa",
        RoomKind::AngelGuardian => "Angel Guardian",
    };
    format!(
        "🎁 The {} draw for \"{}\" is done! Open the app to see who you are gifting.",
        game, room_title
    )
}

pub fn contribution_confirmed_message(event: &Event, contribution: &Contribution) -> String {
    format!(
        "✅ Your contribution of {} {} to \"{}\" was confirmed. Thank you!",
        contribution.amount, event.currency, event.title
    )
}

pub fn contribution_rejected_message(event: &Event, contribution: &Contribution) -> String {
    format!(
        "⚠️ The organizer could not find your payment of {} {} to \"{}\". Please check the transfer.",
        contribution.amount, event.currency, event.title
    )
}
