use crate::{
    domain::{MessageRef, UserId},
    messaging::actions::CallbackAction,
};

/// Incoming update model.
///
/// Telegram-specific fields live in the Telegram adapter.
#[derive(Clone, Debug)]
pub enum IncomingUpdate {
    Command(Command),
    Text(TextMessage),
    Media(MediaMessage),
    Callback(CallbackQuery),
}

impl IncomingUpdate {
    pub fn sender(&self) -> &Sender {
        match self {
            IncomingUpdate::Command(c) => &c.from,
            IncomingUpdate::Text(t) => &t.from,
            IncomingUpdate::Media(m) => &m.from,
            IncomingUpdate::Callback(q) => &q.from,
        }
    }
}

/// Who sent an update.
#[derive(Clone, Debug)]
pub struct Sender {
    pub id: UserId,
    pub username: Option<String>,
    pub first_name: String,
}

#[derive(Clone, Debug)]
pub struct Command {
    pub from: Sender,
    pub message: MessageRef,
    pub name: String,
    pub args: String,
    /// The message this command replies to, if any (used by `/broadcast`).
    pub reply_to: Option<MessageRef>,
}

impl Command {
    /// Split `/cmd@botname arg1 ...` into a lowercase name and the trimmed rest.
    pub fn parse(text: &str) -> Option<(String, String)> {
        let text = text.trim();
        if !text.starts_with('/') {
            return None;
        }
        let mut parts = text.splitn(2, char::is_whitespace);
        let first = parts.next().unwrap_or("");
        let rest = parts.next().unwrap_or("").trim().to_string();

        let name = first
            .trim_start_matches('/')
            .split('@')
            .next()
            .unwrap_or("")
            .to_lowercase();
        if name.is_empty() {
            return None;
        }
        Some((name, rest))
    }
}

#[derive(Clone, Debug)]
pub struct TextMessage {
    pub from: Sender,
    pub message: MessageRef,
    pub text: String,
}

/// Video or document message.
#[derive(Clone, Debug)]
pub struct MediaMessage {
    pub from: Sender,
    pub message: MessageRef,
    pub payload: MediaPayload,
    pub caption: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MediaPayload {
    Video {
        file_id: String,
    },
    Document {
        file_id: String,
        mime_type: Option<String>,
    },
}

#[derive(Clone, Debug)]
pub struct CallbackQuery {
    pub from: Sender,
    pub callback_id: String,
    pub data: String,
    /// Message carrying the pressed keyboard.
    pub message: Option<MessageRef>,
}

/// Result of a chat membership lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemberStatus {
    Owner,
    Administrator,
    Member,
    Restricted,
    Left,
    Kicked,
}

impl MemberStatus {
    /// `left` and `kicked` are the only statuses that count as not subscribed.
    pub fn is_subscribed(self) -> bool {
        !matches!(self, MemberStatus::Left | MemberStatus::Kicked)
    }
}

/// Inline keyboard, one row per entry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InlineKeyboard {
    pub rows: Vec<Vec<InlineButton>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineButton {
    pub label: String,
    pub target: ButtonTarget,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ButtonTarget {
    Callback(CallbackAction),
    Url(String),
}

impl InlineButton {
    pub fn callback(label: impl Into<String>, action: CallbackAction) -> Self {
        Self {
            label: label.into(),
            target: ButtonTarget::Callback(action),
        }
    }

    pub fn url(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            target: ButtonTarget::Url(url.into()),
        }
    }
}

impl InlineKeyboard {
    /// Convenience for "one button per row" layouts.
    pub fn one_per_row(buttons: Vec<InlineButton>) -> Self {
        Self {
            rows: buttons.into_iter().map(|b| vec![b]).collect(),
        }
    }

    pub fn push(&mut self, button: InlineButton) {
        self.rows.push(vec![button]);
    }

    pub fn buttons(&self) -> impl Iterator<Item = &InlineButton> {
        self.rows.iter().flatten()
    }
}

/// Capabilities / limits of a messenger implementation.
#[derive(Clone, Copy, Debug)]
pub struct MessagingCapabilities {
    pub max_message_len: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_commands_with_bot_suffix_and_args() {
        assert_eq!(
            Command::parse("/AddChannel@kino_bot -100 @films  My films "),
            Some(("addchannel".to_string(), "-100 @films  My films".to_string()))
        );
        assert_eq!(
            Command::parse("/start"),
            Some(("start".to_string(), String::new()))
        );
        assert_eq!(Command::parse("start"), None);
        assert_eq!(Command::parse("/"), None);
    }

    #[test]
    fn only_left_and_kicked_are_unsubscribed() {
        assert!(MemberStatus::Owner.is_subscribed());
        assert!(MemberStatus::Administrator.is_subscribed());
        assert!(MemberStatus::Member.is_subscribed());
        assert!(MemberStatus::Restricted.is_subscribed());
        assert!(!MemberStatus::Left.is_subscribed());
        assert!(!MemberStatus::Kicked.is_subscribed());
    }
}
