use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    domain::{RequiredChannel, UserId},
    formatting::escape_html,
    messaging::{
        actions::CallbackAction,
        port::MessagingPort,
        types::{InlineButton, InlineKeyboard},
    },
    ports::DirectoryStore,
    Result,
};

/// Subscription gate: which required channels is a user missing?
///
/// One membership query per channel, every time. A failed query counts as
/// "not subscribed" so the gate never opens on errors.
pub struct SubscriptionGate {
    directory: Arc<dyn DirectoryStore>,
    messenger: Arc<dyn MessagingPort>,
}

impl SubscriptionGate {
    pub fn new(directory: Arc<dyn DirectoryStore>, messenger: Arc<dyn MessagingPort>) -> Self {
        Self {
            directory,
            messenger,
        }
    }

    /// Channels the user has not joined, in listing order. Empty means fully subscribed.
    pub async fn missing_channels(&self, user: UserId) -> Result<Vec<RequiredChannel>> {
        let channels = self.directory.list_channels()?;
        let mut missing = Vec::new();

        for channel in channels {
            match self.messenger.member_status(channel.id, user).await {
                Ok(status) if status.is_subscribed() => {}
                Ok(status) => {
                    info!(
                        user = user.0,
                        channel = %channel.handle,
                        ?status,
                        "user is not subscribed"
                    );
                    missing.push(channel);
                }
                Err(e) => {
                    warn!(
                        user = user.0,
                        channel_id = channel.id.0,
                        channel = %channel.handle,
                        "membership check failed: {e}"
                    );
                    missing.push(channel);
                }
            }
        }

        Ok(missing)
    }
}

/// Text + keyboard asking the user to join `missing`.
pub fn subscription_prompt(missing: &[RequiredChannel]) -> (String, InlineKeyboard) {
    let mut keyboard = InlineKeyboard::default();
    let mut lines = Vec::with_capacity(missing.len());

    for channel in missing {
        let name = channel.display_name();
        keyboard.push(InlineButton::url(
            format!("➕ Join {name}"),
            channel.join_url(),
        ));
        lines.push(format!("• {}", escape_html(name)));
    }
    keyboard.push(InlineButton::callback(
        "✅ Check subscription",
        CallbackAction::CheckSubscription,
    ));

    let text = format!(
        "📢 To use this bot, please subscribe to our channels:\n\n{}",
        lines.join("\n")
    );
    (text, keyboard)
}
