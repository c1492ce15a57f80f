//! Per-update request routing.
//!
//! Every update is classified on its own: who sent it (admin or not) and what
//! it carries (command, text, media, button press). There is no conversation
//! state between updates.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::{
    codes::{caption_code, parse_lookup_code},
    config::Config,
    console::AdminConsole,
    domain::{ChatId, MediaRef, MessageRef, Movie},
    formatting::escape_html,
    gate::{subscription_prompt, SubscriptionGate},
    messaging::{
        actions::CallbackAction,
        port::MessagingPort,
        types::{
            CallbackQuery, Command, IncomingUpdate, MediaMessage, MediaPayload, Sender,
            TextMessage,
        },
    },
    ports::{CatalogStore, DirectoryStore},
    security::is_admin,
    Result,
};

pub struct Router {
    cfg: Arc<Config>,
    catalog: Arc<dyn CatalogStore>,
    directory: Arc<dyn DirectoryStore>,
    messenger: Arc<dyn MessagingPort>,
    gate: SubscriptionGate,
    console: AdminConsole,
}

impl Router {
    pub fn new(
        cfg: Arc<Config>,
        catalog: Arc<dyn CatalogStore>,
        directory: Arc<dyn DirectoryStore>,
        messenger: Arc<dyn MessagingPort>,
    ) -> Self {
        let gate = SubscriptionGate::new(directory.clone(), messenger.clone());
        let console = AdminConsole::new(
            cfg.clone(),
            catalog.clone(),
            directory.clone(),
            messenger.clone(),
        );
        Self {
            cfg,
            catalog,
            directory,
            messenger,
            gate,
            console,
        }
    }

    /// Insert configured required channels that the store does not know yet.
    ///
    /// Existing rows are left alone so titles set by admins survive restarts.
    pub fn seed_required_channels(&self) -> Result<usize> {
        let existing = self.directory.list_channels()?;
        let mut added = 0usize;
        for seed in &self.cfg.required_channels {
            if existing.iter().any(|c| c.id == seed.id) {
                continue;
            }
            self.directory.add_channel(seed.id, &seed.handle, None)?;
            added += 1;
        }
        if added > 0 {
            info!(added, "seeded required channels from config");
        }
        Ok(added)
    }

    pub async fn dispatch(&self, update: IncomingUpdate) -> Result<()> {
        self.record_visit(update.sender());

        match update {
            IncomingUpdate::Command(cmd) => self.handle_command(cmd).await,
            IncomingUpdate::Text(msg) => {
                if self.is_admin(&msg.from) {
                    self.handle_admin_text(msg).await
                } else {
                    self.handle_user_text(msg).await
                }
            }
            IncomingUpdate::Media(msg) => {
                if self.is_admin(&msg.from) {
                    self.handle_admin_media(msg).await
                } else {
                    self.delete_quietly(msg.message).await;
                    Ok(())
                }
            }
            IncomingUpdate::Callback(q) => self.handle_callback(q).await,
        }
    }

    fn is_admin(&self, sender: &Sender) -> bool {
        is_admin(Some(sender.id), &self.cfg.admin_ids)
    }

    /// Register on first sight, then bump activity. Store hiccups never block handling.
    fn record_visit(&self, sender: &Sender) {
        match self
            .directory
            .register_user(sender.id, sender.username.as_deref())
        {
            Ok(true) => info!(user = sender.id.0, username = ?sender.username, "new user"),
            Ok(false) => {}
            Err(e) => warn!(user = sender.id.0, "failed to register user: {e}"),
        }
        if let Err(e) = self.directory.touch_activity(sender.id) {
            warn!(user = sender.id.0, "failed to update activity: {e}");
        }
    }

    // ============== Commands ==============

    async fn handle_command(&self, cmd: Command) -> Result<()> {
        let chat = cmd.message.chat_id;
        let admin = self.is_admin(&cmd.from);

        match (cmd.name.as_str(), admin) {
            ("start", true) => self.console.greet(chat, &cmd.from.first_name).await,
            ("start", false) => {
                if self.ensure_subscribed(&cmd.from, chat).await? {
                    let text = self.welcome_text(&format!(
                        "🎬 Welcome, {}!",
                        escape_html(&cmd.from.first_name)
                    ));
                    self.messenger.send_html(chat, &text).await?;
                }
                Ok(())
            }
            ("admin", true) => self.console.open(chat).await,
            ("admin", false) => {
                self.messenger
                    .send_html(chat, "⛔ You don't have access to the admin panel")
                    .await?;
                Ok(())
            }
            ("broadcast", true) => self.console.broadcast_command(chat, cmd.reply_to).await,
            ("delete", true) => self.console.delete_movie_command(chat, &cmd.args).await,
            ("addchannel", true) => self.console.add_channel_command(chat, &cmd.args).await,
            ("deletechannel", true) => {
                self.console
                    .delete_channel_command(chat, &cmd.args)
                    .await
            }
            (name, _) => {
                debug!(user = cmd.from.id.0, command = name, "ignoring command");
                Ok(())
            }
        }
    }

    // ============== Text ==============

    async fn handle_admin_text(&self, msg: TextMessage) -> Result<()> {
        let chat = msg.message.chat_id;
        let Some(code) = parse_lookup_code(&msg.text) else {
            return Ok(());
        };

        match self.catalog.get(code)? {
            Some(movie) => {
                if let Err(e) = self.deliver(msg.from.id.private_chat(), &movie).await {
                    self.messenger
                        .send_html(chat, &format!("❌ Error: {}", escape_html(&e.to_string())))
                        .await?;
                }
            }
            None => {
                self.messenger.send_html(chat, "❌ Movie not found").await?;
            }
        }
        Ok(())
    }

    async fn handle_user_text(&self, msg: TextMessage) -> Result<()> {
        let chat = msg.message.chat_id;
        if !self.ensure_subscribed(&msg.from, chat).await? {
            return Ok(());
        }

        let Some(code) = parse_lookup_code(&msg.text) else {
            self.delete_quietly(msg.message).await;
            return Ok(());
        };

        let Some(movie) = self.catalog.get(code)? else {
            let text = self.with_codes_hint("❌ No video found for this code");
            self.messenger.send_html(chat, &text).await?;
            return Ok(());
        };

        let user_chat = msg.from.id.private_chat();
        match self.deliver(user_chat, &movie).await {
            Ok(_) => {
                info!(user = msg.from.id.0, code = %movie.code, "movie delivered");
                if let Some(hint) = self.codes_hint() {
                    self.messenger.send_html(user_chat, &hint).await?;
                }
            }
            Err(e) => {
                warn!(user = msg.from.id.0, code = %movie.code, "delivery failed: {e}");
                self.messenger
                    .send_html(chat, "❌ Failed to send the video")
                    .await?;
            }
        }
        Ok(())
    }

    // ============== Media ==============

    /// Admin upload: `#code` in the caption, republish to the archive, then store.
    async fn handle_admin_media(&self, msg: MediaMessage) -> Result<()> {
        let chat = msg.message.chat_id;
        let caption = msg.caption.as_deref().unwrap_or("");

        let Some(code) = caption_code(caption) else {
            self.messenger
                .send_html(chat, "❌ Add a code to the caption, e.g. #123")
                .await?;
            return Ok(());
        };

        let media = match &msg.payload {
            MediaPayload::Video { file_id } => MediaRef::video(file_id.clone()),
            MediaPayload::Document { file_id, mime_type }
                if mime_type.as_deref().is_some_and(|m| m.contains("video")) =>
            {
                MediaRef::document(file_id.clone())
            }
            MediaPayload::Document { .. } => {
                self.messenger
                    .send_html(chat, "❌ The message does not contain a video")
                    .await?;
                return Ok(());
            }
        };

        let caption = (!caption.is_empty()).then_some(caption);
        if let Err(e) = self
            .messenger
            .send_media(self.cfg.archive_channel_id, &media, caption, false)
            .await
        {
            error!(code, "archive publish failed: {e}");
            self.messenger
                .send_html(
                    chat,
                    &format!("❌ Publishing failed: {}", escape_html(&e.to_string())),
                )
                .await?;
            return Ok(());
        }

        match self.catalog.put(code, &media, caption) {
            Ok(()) => {
                info!(code, kind = media.kind.as_str(), "movie added");
                let mut reply = format!("✅ Movie #{} added and published!", escape_html(code));
                // Users can only type ASCII letters and digits.
                if parse_lookup_code(code).is_none() {
                    warn!(code, "stored code cannot be looked up by users");
                    reply.push_str(
                        "\n\n⚠️ Users can only request codes made of latin letters and digits, \
so this code cannot be looked up.",
                    );
                }
                self.messenger.send_html(chat, &reply).await?;
            }
            Err(e) => {
                error!(code, "catalog upsert failed: {e}");
                self.messenger
                    .send_html(chat, "❌ Failed to save the movie to the catalog")
                    .await?;
            }
        }
        Ok(())
    }

    // ============== Callbacks ==============

    async fn handle_callback(&self, q: CallbackQuery) -> Result<()> {
        let Some(action) = CallbackAction::parse(&q.data) else {
            debug!(data = %q.data, "ignoring unknown callback");
            self.answer_quietly(&q.callback_id, None).await;
            return Ok(());
        };

        let admin = self.is_admin(&q.from);
        if action.requires_admin() && !admin {
            self.answer_quietly(&q.callback_id, Some("⛔ Access denied"))
                .await;
            return Ok(());
        }
        self.answer_quietly(&q.callback_id, None).await;

        let chat = q
            .message
            .map(|m| m.chat_id)
            .unwrap_or_else(|| q.from.id.private_chat());

        match action {
            CallbackAction::CheckSubscription => {
                self.recheck_subscription(&q.from, admin, chat, q.message)
                    .await
            }
            other => self.console.handle_action(other, chat, q.message).await,
        }
    }

    async fn recheck_subscription(
        &self,
        from: &Sender,
        admin: bool,
        chat: ChatId,
        prompt: Option<MessageRef>,
    ) -> Result<()> {
        let missing = if admin {
            Vec::new()
        } else {
            self.gate.missing_channels(from.id).await?
        };

        if missing.is_empty() {
            let text = self.welcome_text("✅ Great! Now you can use the bot.");
            match prompt {
                Some(msg) => self.messenger.edit_html(msg, &text, None).await?,
                None => {
                    self.messenger.send_html(chat, &text).await?;
                }
            }
            return Ok(());
        }

        if let Some(msg) = prompt {
            self.delete_quietly(msg).await;
        }
        let (text, keyboard) = subscription_prompt(&missing);
        self.messenger
            .send_inline_keyboard(chat, &text, keyboard)
            .await?;
        Ok(())
    }

    // ============== Helpers ==============

    /// Run the gate; on missing channels send the join prompt and return `false`.
    async fn ensure_subscribed(&self, from: &Sender, chat: ChatId) -> Result<bool> {
        let missing = self.gate.missing_channels(from.id).await?;
        if missing.is_empty() {
            return Ok(true);
        }

        let (text, keyboard) = subscription_prompt(&missing);
        self.messenger
            .send_inline_keyboard(chat, &text, keyboard)
            .await?;
        Ok(false)
    }

    async fn deliver(&self, chat: ChatId, movie: &Movie) -> Result<MessageRef> {
        let fallback = format!("🎬 Movie by code {}", movie.code);
        let caption = movie
            .caption
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(&fallback);
        self.messenger
            .send_media(chat, &movie.media, Some(caption), self.cfg.protect_content)
            .await
    }

    fn codes_hint(&self) -> Option<String> {
        if self.cfg.codes_channel.is_empty() {
            return None;
        }
        Some(format!(
            "📺 Movie codes are posted in our channel: {}",
            escape_html(&self.cfg.codes_channel)
        ))
    }

    fn with_codes_hint(&self, head: &str) -> String {
        match self.codes_hint() {
            Some(hint) => format!("{head}\n\n{hint}"),
            None => head.to_string(),
        }
    }

    fn welcome_text(&self, head: &str) -> String {
        self.with_codes_hint(&format!("{head}\n\nSend a code to get the video."))
    }

    async fn delete_quietly(&self, msg: MessageRef) {
        if let Err(e) = self.messenger.delete_message(msg).await {
            debug!("delete failed (ignored): {e}");
        }
    }

    async fn answer_quietly(&self, callback_id: &str, text: Option<&str>) {
        if let Err(e) = self
            .messenger
            .answer_callback_query(callback_id, text)
            .await
        {
            warn!("answer_callback_query failed: {e}");
        }
    }
}
