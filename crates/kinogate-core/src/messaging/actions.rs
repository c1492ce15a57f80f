use crate::domain::ChatId;

/// Every button the bot renders maps to exactly one of these.
///
/// The wire form (`encode`) must stay within Telegram's 64-byte callback data limit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallbackAction {
    /// Re-run the subscription gate after the user joined channels.
    CheckSubscription,
    AdminMenu,
    AdminStats,
    AdminMovies,
    AdminChannels,
    AdminBroadcast,
    AddChannelHelp,
    DeleteChannelMenu,
    DeleteChannel(ChatId),
}

const DELETE_CHANNEL_PREFIX: &str = "delete_channel:";

impl CallbackAction {
    pub fn encode(&self) -> String {
        match self {
            CallbackAction::CheckSubscription => "check_subscription".to_string(),
            CallbackAction::AdminMenu => "admin_back".to_string(),
            CallbackAction::AdminStats => "admin_stats".to_string(),
            CallbackAction::AdminMovies => "admin_movies".to_string(),
            CallbackAction::AdminChannels => "admin_channels".to_string(),
            CallbackAction::AdminBroadcast => "admin_broadcast".to_string(),
            CallbackAction::AddChannelHelp => "add_channel".to_string(),
            CallbackAction::DeleteChannelMenu => "delete_channel".to_string(),
            CallbackAction::DeleteChannel(id) => format!("{DELETE_CHANNEL_PREFIX}{}", id.0),
        }
    }

    pub fn parse(data: &str) -> Option<Self> {
        let action = match data {
            "check_subscription" => CallbackAction::CheckSubscription,
            "admin_back" => CallbackAction::AdminMenu,
            "admin_stats" => CallbackAction::AdminStats,
            "admin_movies" => CallbackAction::AdminMovies,
            "admin_channels" => CallbackAction::AdminChannels,
            "admin_broadcast" => CallbackAction::AdminBroadcast,
            "add_channel" => CallbackAction::AddChannelHelp,
            "delete_channel" => CallbackAction::DeleteChannelMenu,
            other => {
                let id = other.strip_prefix(DELETE_CHANNEL_PREFIX)?;
                CallbackAction::DeleteChannel(ChatId(id.parse().ok()?))
            }
        };
        Some(action)
    }

    /// Everything except the subscription re-check is console-only.
    pub fn requires_admin(&self) -> bool {
        !matches!(self, CallbackAction::CheckSubscription)
    }
}
