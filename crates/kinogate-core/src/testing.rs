//! In-crate fakes for the messenger and store ports.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use chrono::Utc;

use crate::{
    config::Config,
    domain::{
        normalize_handle, CatalogEntry, ChatId, KnownUser, MediaRef, MessageId, MessageRef, Movie,
        RequiredChannel, UserId,
    },
    errors::Error,
    messaging::{
        port::MessagingPort,
        types::{InlineKeyboard, MemberStatus, MessagingCapabilities},
    },
    ports::{CatalogStore, DirectoryStore},
    Result,
};

pub const ADMIN: i64 = 1;
pub const ARCHIVE: i64 = -500;

pub fn test_config() -> Config {
    Config {
        bot_token: "x".to_string(),
        admin_ids: vec![ADMIN],
        archive_channel_id: ChatId(ARCHIVE),
        codes_channel: "@codes".to_string(),
        required_channels: vec![],
        database_path: ":memory:".into(),
        protect_content: true,
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Sent {
    Html {
        chat: ChatId,
        html: String,
    },
    Keyboard {
        chat: ChatId,
        html: String,
        keyboard: InlineKeyboard,
    },
    Edit {
        msg: MessageRef,
        html: String,
        keyboard: Option<InlineKeyboard>,
    },
    Delete(MessageRef),
    Media {
        chat: ChatId,
        media: MediaRef,
        caption: Option<String>,
        protect: bool,
    },
    Copy {
        to: ChatId,
        source: MessageRef,
    },
    Answer {
        callback_id: String,
        text: Option<String>,
    },
}

#[derive(Default)]
pub struct FakeMessenger {
    next_id: Mutex<i32>,
    sent: Mutex<Vec<Sent>>,
    /// `(channel, user) -> status`; anything missing answers `Left`.
    members: Mutex<HashMap<(i64, i64), MemberStatus>>,
    /// Channels whose membership query errors out.
    broken_channels: Mutex<Vec<i64>>,
    /// Chats every send/copy to fails.
    unreachable: Mutex<Vec<i64>>,
    fail_deletes: Mutex<bool>,
    membership_queries: Mutex<Vec<(ChatId, UserId)>>,
}

impl FakeMessenger {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_member(&self, channel: i64, user: i64, status: MemberStatus) {
        self.members
            .lock()
            .unwrap()
            .insert((channel, user), status);
    }

    pub fn break_channel(&self, channel: i64) {
        self.broken_channels.lock().unwrap().push(channel);
    }

    pub fn make_unreachable(&self, chat: i64) {
        self.unreachable.lock().unwrap().push(chat);
    }

    pub fn fail_deletes(&self) {
        *self.fail_deletes.lock().unwrap() = true;
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn membership_queries(&self) -> Vec<(ChatId, UserId)> {
        self.membership_queries.lock().unwrap().clone()
    }

    /// Every HTML text that went out (plain, keyboard or edit).
    pub fn texts(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Html { html, .. }
                | Sent::Keyboard { html, .. }
                | Sent::Edit { html, .. } => Some(html),
                _ => None,
            })
            .collect()
    }

    fn alloc(&self, chat_id: ChatId) -> MessageRef {
        let mut guard = self.next_id.lock().unwrap();
        *guard += 1;
        MessageRef {
            chat_id,
            message_id: MessageId(1000 + *guard),
        }
    }

    fn check_reachable(&self, chat: ChatId) -> Result<()> {
        if self.unreachable.lock().unwrap().contains(&chat.0) {
            return Err(Error::External("telegram error: Forbidden: bot was blocked".to_string()));
        }
        Ok(())
    }

    fn record(&self, s: Sent) {
        self.sent.lock().unwrap().push(s);
    }
}

#[async_trait]
impl MessagingPort for FakeMessenger {
    fn capabilities(&self) -> MessagingCapabilities {
        MessagingCapabilities {
            max_message_len: 4096,
        }
    }

    async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<MessageRef> {
        self.check_reachable(chat_id)?;
        self.record(Sent::Html {
            chat: chat_id,
            html: html.to_string(),
        });
        Ok(self.alloc(chat_id))
    }

    async fn send_inline_keyboard(
        &self,
        chat_id: ChatId,
        html: &str,
        keyboard: InlineKeyboard,
    ) -> Result<MessageRef> {
        self.check_reachable(chat_id)?;
        self.record(Sent::Keyboard {
            chat: chat_id,
            html: html.to_string(),
            keyboard,
        });
        Ok(self.alloc(chat_id))
    }

    async fn edit_html(
        &self,
        msg: MessageRef,
        html: &str,
        keyboard: Option<InlineKeyboard>,
    ) -> Result<()> {
        self.record(Sent::Edit {
            msg,
            html: html.to_string(),
            keyboard,
        });
        Ok(())
    }

    async fn delete_message(&self, msg: MessageRef) -> Result<()> {
        if *self.fail_deletes.lock().unwrap() {
            return Err(Error::External("telegram error: message can't be deleted".to_string()));
        }
        self.record(Sent::Delete(msg));
        Ok(())
    }

    async fn send_media(
        &self,
        chat_id: ChatId,
        media: &MediaRef,
        caption: Option<&str>,
        protect_content: bool,
    ) -> Result<MessageRef> {
        self.check_reachable(chat_id)?;
        self.record(Sent::Media {
            chat: chat_id,
            media: media.clone(),
            caption: caption.map(|s| s.to_string()),
            protect: protect_content,
        });
        Ok(self.alloc(chat_id))
    }

    async fn copy_message(&self, to: ChatId, source: MessageRef) -> Result<()> {
        self.check_reachable(to)?;
        self.record(Sent::Copy { to, source });
        Ok(())
    }

    async fn answer_callback_query(&self, callback_id: &str, text: Option<&str>) -> Result<()> {
        self.record(Sent::Answer {
            callback_id: callback_id.to_string(),
            text: text.map(|s| s.to_string()),
        });
        Ok(())
    }

    async fn member_status(&self, channel: ChatId, user: UserId) -> Result<MemberStatus> {
        self.membership_queries
            .lock()
            .unwrap()
            .push((channel, user));
        if self.broken_channels.lock().unwrap().contains(&channel.0) {
            return Err(Error::External(
                "telegram error: Bad Request: member list is inaccessible".to_string(),
            ));
        }
        Ok(self
            .members
            .lock()
            .unwrap()
            .get(&(channel.0, user.0))
            .copied()
            .unwrap_or(MemberStatus::Left))
    }
}

/// In-memory stand-in for the SQLite store.
#[derive(Default)]
pub struct MemoryStore {
    movies: Mutex<Vec<Movie>>,
    users: Mutex<Vec<KnownUser>>,
    channels: Mutex<Vec<RequiredChannel>>,
    fail_puts: Mutex<bool>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_puts(&self) {
        *self.fail_puts.lock().unwrap() = true;
    }
}

impl CatalogStore for MemoryStore {
    fn put(&self, code: &str, media: &MediaRef, caption: Option<&str>) -> Result<()> {
        if *self.fail_puts.lock().unwrap() {
            return Err(Error::Store("disk I/O error".to_string()));
        }
        let mut movies = self.movies.lock().unwrap();
        movies.retain(|m| m.code != code);
        movies.push(Movie {
            code: code.to_string(),
            media: media.clone(),
            caption: caption.map(|s| s.to_string()),
            added_at: Utc::now(),
        });
        Ok(())
    }

    fn get(&self, code: &str) -> Result<Option<Movie>> {
        Ok(self
            .movies
            .lock()
            .unwrap()
            .iter()
            .find(|m| m.code == code)
            .cloned())
    }

    fn delete(&self, code: &str) -> Result<bool> {
        let mut movies = self.movies.lock().unwrap();
        let before = movies.len();
        movies.retain(|m| m.code != code);
        Ok(movies.len() != before)
    }

    fn list_all(&self) -> Result<Vec<CatalogEntry>> {
        let mut out: Vec<CatalogEntry> = self
            .movies
            .lock()
            .unwrap()
            .iter()
            .map(|m| CatalogEntry {
                code: m.code.clone(),
                caption: m.caption.clone(),
            })
            .collect();
        out.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(out)
    }

    fn count(&self) -> Result<u64> {
        Ok(self.movies.lock().unwrap().len() as u64)
    }

    fn recent(&self, limit: usize) -> Result<Vec<String>> {
        Ok(self
            .movies
            .lock()
            .unwrap()
            .iter()
            .rev()
            .take(limit)
            .map(|m| m.code.clone())
            .collect())
    }
}

impl DirectoryStore for MemoryStore {
    fn register_user(&self, id: UserId, handle: Option<&str>) -> Result<bool> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.id == id) {
            return Ok(false);
        }
        users.push(KnownUser {
            id,
            handle: handle.map(|s| s.to_string()),
        });
        Ok(true)
    }

    fn touch_activity(&self, _id: UserId) -> Result<()> {
        Ok(())
    }

    fn user_count(&self) -> Result<u64> {
        Ok(self.users.lock().unwrap().len() as u64)
    }

    fn list_users(&self) -> Result<Vec<KnownUser>> {
        Ok(self.users.lock().unwrap().clone())
    }

    fn add_channel(
        &self,
        id: ChatId,
        handle: &str,
        title: Option<&str>,
    ) -> Result<RequiredChannel> {
        let record = RequiredChannel {
            id,
            handle: normalize_handle(handle),
            title: title.map(|s| s.to_string()),
        };
        let mut channels = self.channels.lock().unwrap();
        match channels.iter_mut().find(|c| c.id == id) {
            Some(existing) => *existing = record.clone(),
            None => channels.push(record.clone()),
        }
        Ok(record)
    }

    fn remove_channel(&self, id: ChatId) -> Result<bool> {
        let mut channels = self.channels.lock().unwrap();
        let before = channels.len();
        channels.retain(|c| c.id != id);
        Ok(channels.len() != before)
    }

    fn list_channels(&self) -> Result<Vec<RequiredChannel>> {
        Ok(self.channels.lock().unwrap().clone())
    }
}
