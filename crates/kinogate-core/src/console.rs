//! Administrator console: menu screens, catalog/channel commands and broadcast.

use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    config::Config,
    domain::{ChatId, MessageRef},
    formatting::{escape_html, preview},
    messaging::{
        actions::CallbackAction,
        port::MessagingPort,
        types::{InlineButton, InlineKeyboard},
    },
    ports::{CatalogStore, DirectoryStore},
    Result,
};

const RECENT_CODES: usize = 5;
const CAPTION_PREVIEW_CHARS: usize = 30;

const ADD_CHANNEL_SYNTAX: &str = "/addchannel &lt;id&gt; &lt;@username&gt; [title]\n\n\
Example: /addchannel -100123456789 @my_channel \"My channel\"";

/// A rendered console screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Screen {
    pub text: String,
    pub keyboard: InlineKeyboard,
}

/// Outcome of a broadcast run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BroadcastTally {
    pub delivered: usize,
    pub failed: usize,
}

pub struct AdminConsole {
    cfg: Arc<Config>,
    catalog: Arc<dyn CatalogStore>,
    directory: Arc<dyn DirectoryStore>,
    messenger: Arc<dyn MessagingPort>,
}

impl AdminConsole {
    pub fn new(
        cfg: Arc<Config>,
        catalog: Arc<dyn CatalogStore>,
        directory: Arc<dyn DirectoryStore>,
        messenger: Arc<dyn MessagingPort>,
    ) -> Self {
        Self {
            cfg,
            catalog,
            directory,
            messenger,
        }
    }

    // ============== Screens ==============

    pub fn main_menu(&self) -> Screen {
        Screen {
            text: "👨‍💻 Admin panel:".to_string(),
            keyboard: InlineKeyboard::one_per_row(vec![
                InlineButton::callback("📊 Statistics", CallbackAction::AdminStats),
                InlineButton::callback("🎬 Movies", CallbackAction::AdminMovies),
                InlineButton::callback("📌 Required channels", CallbackAction::AdminChannels),
                InlineButton::callback("📢 Broadcast", CallbackAction::AdminBroadcast),
            ]),
        }
    }

    pub fn stats_screen(&self) -> Result<Screen> {
        let movies = self.catalog.count()?;
        let users = self.directory.user_count()?;
        let channels = self.directory.list_channels()?;
        let recent = self.catalog.recent(RECENT_CODES)?;

        let mut text = format!(
            "📊 Bot statistics:\n\n🎬 Movies: {movies}\n👥 Users: {users}\n📺 Required channels: {}\n\
🗄 Archive channel: <code>{}</code>\n",
            channels.len(),
            self.cfg.archive_channel_id.0
        );
        if !channels.is_empty() {
            text.push_str("\nChannels:\n");
            for ch in &channels {
                text.push_str(&format!("• {}\n", escape_html(ch.display_name())));
            }
        }
        if !recent.is_empty() {
            text.push_str("\n🔥 Recently added codes:\n");
            for code in &recent {
                text.push_str(&format!("• {}\n", escape_html(code)));
            }
        }

        Ok(Screen {
            text,
            keyboard: back_to(CallbackAction::AdminMenu),
        })
    }

    pub fn movies_screen(&self) -> Result<Screen> {
        let entries = self.catalog.list_all()?;
        if entries.is_empty() {
            return Ok(Screen {
                text: "📭 No movies yet".to_string(),
                keyboard: back_to(CallbackAction::AdminMenu),
            });
        }

        let footer = "\n🗑️ Delete a movie: /delete &lt;code&gt;";
        // Reserve room for the footer and an "...and N more" line.
        let budget = self
            .messenger
            .capabilities()
            .max_message_len
            .saturating_sub(footer.chars().count() + 40);

        let mut text = "🎬 Movies:\n\n".to_string();
        let mut used = text.chars().count();
        let mut shown = 0usize;
        for entry in &entries {
            let line = match &entry.caption {
                Some(caption) if !caption.trim().is_empty() => format!(
                    "• #{} - {}\n",
                    escape_html(&entry.code),
                    escape_html(&preview(caption, CAPTION_PREVIEW_CHARS))
                ),
                _ => format!("• #{}\n", escape_html(&entry.code)),
            };
            let len = line.chars().count();
            if used + len > budget {
                break;
            }
            used += len;
            text.push_str(&line);
            shown += 1;
        }
        if shown < entries.len() {
            text.push_str(&format!("...and {} more\n", entries.len() - shown));
        }
        text.push_str(footer);

        Ok(Screen {
            text,
            keyboard: back_to(CallbackAction::AdminMenu),
        })
    }

    pub fn channels_screen(&self) -> Result<Screen> {
        let channels = self.directory.list_channels()?;

        let mut text = "📌 Current required channels:\n\n".to_string();
        if channels.is_empty() {
            text.push_str("📭 No channels yet\n");
        }
        for ch in &channels {
            text.push_str(&format!(
                "• {} ({}, <code>{}</code>)\n",
                escape_html(ch.display_name()),
                escape_html(&ch.handle),
                ch.id.0
            ));
        }
        text.push_str("\n👇 Choose an action:");

        Ok(Screen {
            text,
            keyboard: InlineKeyboard::one_per_row(vec![
                InlineButton::callback("➕ Add channel", CallbackAction::AddChannelHelp),
                InlineButton::callback("🗑️ Remove channel", CallbackAction::DeleteChannelMenu),
                InlineButton::callback("🔙 Back", CallbackAction::AdminMenu),
            ]),
        })
    }

    /// One button per channel; `None` when there is nothing to delete.
    pub fn delete_channel_screen(&self) -> Result<Option<Screen>> {
        let channels = self.directory.list_channels()?;
        if channels.is_empty() {
            return Ok(None);
        }

        let mut keyboard = InlineKeyboard::default();
        for ch in &channels {
            keyboard.push(InlineButton::callback(
                format!("🗑️ {}", ch.display_name()),
                CallbackAction::DeleteChannel(ch.id),
            ));
        }
        keyboard.push(InlineButton::callback(
            "🔙 Back",
            CallbackAction::AdminChannels,
        ));

        Ok(Some(Screen {
            text: "📌 Choose a channel to remove:".to_string(),
            keyboard,
        }))
    }

    // ============== Entry points ==============

    /// `/start` for administrators.
    pub async fn greet(&self, chat: ChatId, first_name: &str) -> Result<()> {
        let movies = self.catalog.count()?;
        let users = self.directory.user_count()?;
        let text = format!(
            "👨‍💻 Welcome, administrator {}!\n\n📊 Statistics:\n🎬 Movies: {movies}\n👥 Users: {users}\n\n\
Use /admin to open the control panel\nSend a video captioned with #code to add a movie\n\n\
📺 Codes channel: {}",
            escape_html(first_name),
            escape_html(&self.cfg.codes_channel)
        );
        self.messenger.send_html(chat, &text).await?;
        Ok(())
    }

    /// `/admin`: send the main menu as a new message.
    pub async fn open(&self, chat: ChatId) -> Result<()> {
        let menu = self.main_menu();
        self.messenger
            .send_inline_keyboard(chat, &menu.text, menu.keyboard)
            .await?;
        Ok(())
    }

    /// Handle a console button. `message` is the message that carried the keyboard.
    pub async fn handle_action(
        &self,
        action: CallbackAction,
        chat: ChatId,
        message: Option<MessageRef>,
    ) -> Result<()> {
        match action {
            CallbackAction::CheckSubscription => Ok(()),
            CallbackAction::AdminMenu => self.show(chat, message, self.main_menu()).await,
            CallbackAction::AdminStats => self.show(chat, message, self.stats_screen()?).await,
            CallbackAction::AdminMovies => self.show(chat, message, self.movies_screen()?).await,
            CallbackAction::AdminChannels => {
                self.show(chat, message, self.channels_screen()?).await
            }
            CallbackAction::AdminBroadcast => {
                self.messenger
                    .send_html(chat, "📢 To broadcast, reply to a message with /broadcast")
                    .await?;
                Ok(())
            }
            CallbackAction::AddChannelHelp => {
                let text = format!("📝 To add a channel use:\n{ADD_CHANNEL_SYNTAX}");
                self.messenger.send_html(chat, &text).await?;
                Ok(())
            }
            CallbackAction::DeleteChannelMenu => match self.delete_channel_screen()? {
                Some(screen) => self.show(chat, message, screen).await,
                None => {
                    self.messenger
                        .send_html(chat, "📭 No channels to remove")
                        .await?;
                    Ok(())
                }
            },
            CallbackAction::DeleteChannel(id) => {
                let removed = self.directory.remove_channel(id)?;
                let reply = if removed {
                    info!(channel_id = id.0, "required channel removed");
                    "✅ Channel removed!"
                } else {
                    "❌ Channel not found"
                };
                self.messenger.send_html(chat, reply).await?;
                self.show(chat, message, self.channels_screen()?).await
            }
        }
    }

    /// Copy `source` to every known user, one at a time. A failed recipient never stops the run.
    pub async fn broadcast(&self, source: MessageRef) -> Result<BroadcastTally> {
        let users = self.directory.list_users()?;
        let mut tally = BroadcastTally::default();

        for user in users {
            match self
                .messenger
                .copy_message(user.id.private_chat(), source)
                .await
            {
                Ok(()) => tally.delivered += 1,
                Err(e) => {
                    warn!(user = user.id.0, "broadcast copy failed: {e}");
                    tally.failed += 1;
                }
            }
        }

        info!(
            delivered = tally.delivered,
            failed = tally.failed,
            "broadcast finished"
        );
        Ok(tally)
    }

    // ============== Commands ==============

    /// `/broadcast` (must reply to the message to replicate).
    pub async fn broadcast_command(&self, chat: ChatId, reply_to: Option<MessageRef>) -> Result<()> {
        let Some(source) = reply_to else {
            self.messenger
                .send_html(chat, "❌ Reply to the message you want to broadcast")
                .await?;
            return Ok(());
        };

        let tally = self.broadcast(source).await?;
        self.messenger
            .send_html(
                chat,
                &format!(
                    "✅ Broadcast finished\nDelivered: {}\nFailed: {}",
                    tally.delivered, tally.failed
                ),
            )
            .await?;
        Ok(())
    }

    /// `/delete <code>`
    pub async fn delete_movie_command(&self, chat: ChatId, args: &str) -> Result<()> {
        let Some(code) = args.split_whitespace().next() else {
            self.messenger
                .send_html(chat, "❌ Specify the movie code: /delete &lt;code&gt;")
                .await?;
            return Ok(());
        };

        let reply = if self.catalog.delete(code)? {
            info!(code, "movie deleted");
            format!("✅ Movie #{} deleted", escape_html(code))
        } else {
            format!("❌ Movie #{} not found", escape_html(code))
        };
        self.messenger.send_html(chat, &reply).await?;
        Ok(())
    }

    /// `/addchannel <id> <handle> [title...]`
    pub async fn add_channel_command(&self, chat: ChatId, args: &str) -> Result<()> {
        let mut parts = args.split_whitespace();
        let (Some(id), Some(handle)) = (parts.next(), parts.next()) else {
            let usage = format!("❌ Usage: {ADD_CHANNEL_SYNTAX}");
            self.messenger.send_html(chat, &usage).await?;
            return Ok(());
        };
        let Ok(id) = id.parse::<i64>() else {
            self.messenger
                .send_html(chat, "❌ Channel id must be a number")
                .await?;
            return Ok(());
        };
        let title = parse_title(&parts.collect::<Vec<_>>().join(" "));

        let channel = self
            .directory
            .add_channel(ChatId(id), handle, title.as_deref())?;
        info!(channel_id = id, handle = %channel.handle, "required channel added");
        self.messenger
            .send_html(
                chat,
                &format!("✅ Channel {} added!", escape_html(&channel.handle)),
            )
            .await?;
        Ok(())
    }

    /// `/deletechannel <id>`
    pub async fn delete_channel_command(&self, chat: ChatId, args: &str) -> Result<()> {
        let Some(raw) = args.split_whitespace().next() else {
            self.messenger
                .send_html(chat, "❌ Specify the channel id: /deletechannel &lt;id&gt;")
                .await?;
            return Ok(());
        };
        let Ok(id) = raw.parse::<i64>() else {
            self.messenger
                .send_html(chat, "❌ Channel id must be a number")
                .await?;
            return Ok(());
        };

        let reply = if self.directory.remove_channel(ChatId(id))? {
            info!(channel_id = id, "required channel removed");
            "✅ Channel removed!"
        } else {
            "❌ Channel not found"
        };
        self.messenger.send_html(chat, reply).await?;
        Ok(())
    }

    /// Edit the keyboard message in place when there is one, otherwise send a new message.
    async fn show(&self, chat: ChatId, message: Option<MessageRef>, screen: Screen) -> Result<()> {
        match message {
            Some(msg) => {
                self.messenger
                    .edit_html(msg, &screen.text, Some(screen.keyboard))
                    .await
            }
            None => {
                self.messenger
                    .send_inline_keyboard(chat, &screen.text, screen.keyboard)
                    .await?;
                Ok(())
            }
        }
    }
}

fn back_to(action: CallbackAction) -> InlineKeyboard {
    InlineKeyboard::one_per_row(vec![InlineButton::callback("🔙 Back", action)])
}

/// Title argument of `/addchannel`; surrounding quotes are dropped, blank means none.
fn parse_title(raw: &str) -> Option<String> {
    let t = raw.trim();
    let t = t
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(t)
        .trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}
