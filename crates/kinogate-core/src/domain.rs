use chrono::{DateTime, Utc};

/// Telegram user id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UserId(pub i64);

/// Telegram chat id (numeric). Channels use negative ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

/// Telegram message id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(pub i32);

/// A stable reference to a Telegram message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

impl UserId {
    /// Private chats share the user's id.
    pub fn private_chat(self) -> ChatId {
        ChatId(self.0)
    }
}

/// How a catalog file was uploaded; delivery must use the matching send call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Document,
}

impl MediaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Video => "video",
            MediaKind::Document => "document",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "video" => Some(MediaKind::Video),
            "document" => Some(MediaKind::Document),
            _ => None,
        }
    }
}

/// Opaque handle to media already stored on Telegram's side.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaRef {
    pub kind: MediaKind,
    pub file_id: String,
}

impl MediaRef {
    pub fn video(file_id: impl Into<String>) -> Self {
        Self {
            kind: MediaKind::Video,
            file_id: file_id.into(),
        }
    }

    pub fn document(file_id: impl Into<String>) -> Self {
        Self {
            kind: MediaKind::Document,
            file_id: file_id.into(),
        }
    }
}

/// One catalog entry, keyed by its code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Movie {
    pub code: String,
    pub media: MediaRef,
    pub caption: Option<String>,
    pub added_at: DateTime<Utc>,
}

/// Row of the catalog listing (`code`, `caption`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogEntry {
    pub code: String,
    pub caption: Option<String>,
}

/// A user the bot has seen at least once.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KnownUser {
    pub id: UserId,
    pub handle: Option<String>,
}

/// A channel users must join before the catalog opens up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequiredChannel {
    pub id: ChatId,
    pub handle: String,
    pub title: Option<String>,
}

impl RequiredChannel {
    /// Name shown on buttons and in listings.
    pub fn display_name(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(&self.handle)
    }

    /// Public link to the channel (`https://t.me/<handle>`).
    pub fn join_url(&self) -> String {
        format!("https://t.me/{}", self.handle.trim_start_matches('@'))
    }
}

/// Normalize a channel handle to exactly one leading `@`.
///
/// `"foo"`, `"@foo"` and `"@@foo"` all become `"@foo"`.
pub fn normalize_handle(raw: &str) -> String {
    format!("@{}", raw.trim().trim_start_matches('@'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_forms_normalize_to_single_at() {
        assert_eq!(normalize_handle("foo"), "@foo");
        assert_eq!(normalize_handle("@foo"), "@foo");
        assert_eq!(normalize_handle("@@foo"), "@foo");
        assert_eq!(normalize_handle("@@@foo"), "@foo");
        assert_eq!(normalize_handle("  @foo \n"), "@foo");
    }

    #[test]
    fn handle_normalization_is_idempotent() {
        for raw in ["foo", "@foo", "@@foo", "@@@foo", " bar_channel "] {
            let once = normalize_handle(raw);
            assert_eq!(normalize_handle(&once), once);
        }
    }

    #[test]
    fn display_name_prefers_title() {
        let mut ch = RequiredChannel {
            id: ChatId(-100),
            handle: "@films".to_string(),
            title: Some("Films".to_string()),
        };
        assert_eq!(ch.display_name(), "Films");
        assert_eq!(ch.join_url(), "https://t.me/films");

        ch.title = Some("  ".to_string());
        assert_eq!(ch.display_name(), "@films");
        ch.title = None;
        assert_eq!(ch.display_name(), "@films");
    }

    #[test]
    fn media_kind_round_trips_through_str() {
        for kind in [MediaKind::Video, MediaKind::Document] {
            assert_eq!(MediaKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(MediaKind::parse("audio"), None);
    }
}
