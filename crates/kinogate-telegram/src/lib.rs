//! Telegram adapter (teloxide).
//!
//! This crate implements the `kinogate-core` MessagingPort over the Telegram Bot API
//! and feeds incoming updates into the core router.

use async_trait::async_trait;

use teloxide::{
    prelude::*,
    types::{ChatMemberKind, InlineKeyboardButton, InlineKeyboardMarkup, InputFile, ParseMode},
};

pub mod handlers;
pub mod router;

use kinogate_core::{
    domain::{ChatId, MediaKind, MediaRef, MessageId, MessageRef, UserId},
    errors::Error,
    messaging::{
        port::MessagingPort,
        types::{ButtonTarget, InlineKeyboard, MemberStatus, MessagingCapabilities},
    },
    Result,
};

#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    pub fn bot(&self) -> Bot {
        self.bot.clone()
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }

    fn tg_msg_id(message_id: MessageId) -> teloxide::types::MessageId {
        teloxide::types::MessageId(message_id.0)
    }

    fn tg_user(user: UserId) -> teloxide::types::UserId {
        teloxide::types::UserId(user.0 as u64)
    }

    fn map_err(e: teloxide::RequestError) -> Error {
        Error::External(format!("telegram error: {e}"))
    }

    fn markup(keyboard: InlineKeyboard) -> Result<InlineKeyboardMarkup> {
        let mut rows = Vec::with_capacity(keyboard.rows.len());
        for row in keyboard.rows {
            let mut buttons = Vec::with_capacity(row.len());
            for b in row {
                let button = match b.target {
                    ButtonTarget::Callback(action) => {
                        InlineKeyboardButton::callback(b.label, action.encode())
                    }
                    ButtonTarget::Url(url) => {
                        let url = reqwest::Url::parse(&url)
                            .map_err(|e| Error::External(format!("invalid button url {url}: {e}")))?;
                        InlineKeyboardButton::url(b.label, url)
                    }
                };
                buttons.push(button);
            }
            rows.push(buttons);
        }
        Ok(InlineKeyboardMarkup::new(rows))
    }

    fn sent(chat_id: ChatId, msg: &Message) -> MessageRef {
        MessageRef {
            chat_id,
            message_id: MessageId(msg.id.0),
        }
    }
}

#[async_trait]
impl MessagingPort for TelegramMessenger {
    fn capabilities(&self) -> MessagingCapabilities {
        MessagingCapabilities {
            max_message_len: 4096,
        }
    }

    async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<MessageRef> {
        let msg = self
            .bot
            .send_message(Self::tg_chat(chat_id), html.to_string())
            .parse_mode(ParseMode::Html)
            .await
            .map_err(Self::map_err)?;
        Ok(Self::sent(chat_id, &msg))
    }

    async fn send_inline_keyboard(
        &self,
        chat_id: ChatId,
        html: &str,
        keyboard: InlineKeyboard,
    ) -> Result<MessageRef> {
        let markup = Self::markup(keyboard)?;
        let msg = self
            .bot
            .send_message(Self::tg_chat(chat_id), html.to_string())
            .parse_mode(ParseMode::Html)
            .reply_markup(markup)
            .await
            .map_err(Self::map_err)?;
        Ok(Self::sent(chat_id, &msg))
    }

    async fn edit_html(
        &self,
        msg: MessageRef,
        html: &str,
        keyboard: Option<InlineKeyboard>,
    ) -> Result<()> {
        let mut req = self
            .bot
            .edit_message_text(
                Self::tg_chat(msg.chat_id),
                Self::tg_msg_id(msg.message_id),
                html.to_string(),
            )
            .parse_mode(ParseMode::Html);
        if let Some(keyboard) = keyboard {
            req = req.reply_markup(Self::markup(keyboard)?);
        }
        req.await.map_err(Self::map_err)?;
        Ok(())
    }

    async fn delete_message(&self, msg: MessageRef) -> Result<()> {
        self.bot
            .delete_message(Self::tg_chat(msg.chat_id), Self::tg_msg_id(msg.message_id))
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    // Captions go out as plain text: they are admin-authored and may contain `<`.
    async fn send_media(
        &self,
        chat_id: ChatId,
        media: &MediaRef,
        caption: Option<&str>,
        protect_content: bool,
    ) -> Result<MessageRef> {
        let file = InputFile::file_id(media.file_id.clone());
        let chat = Self::tg_chat(chat_id);

        let msg = match media.kind {
            MediaKind::Video => {
                let mut req = self.bot.send_video(chat, file).protect_content(protect_content);
                if let Some(c) = caption {
                    req = req.caption(c.to_string());
                }
                req.await
            }
            MediaKind::Document => {
                let mut req = self
                    .bot
                    .send_document(chat, file)
                    .protect_content(protect_content);
                if let Some(c) = caption {
                    req = req.caption(c.to_string());
                }
                req.await
            }
        }
        .map_err(Self::map_err)?;

        Ok(Self::sent(chat_id, &msg))
    }

    async fn copy_message(&self, to: ChatId, source: MessageRef) -> Result<()> {
        self.bot
            .copy_message(
                Self::tg_chat(to),
                Self::tg_chat(source.chat_id),
                Self::tg_msg_id(source.message_id),
            )
            .await
            .map_err(Self::map_err)?;
        Ok(())
    }

    async fn answer_callback_query(&self, callback_id: &str, text: Option<&str>) -> Result<()> {
        let mut req = self.bot.answer_callback_query(callback_id.to_string());
        if let Some(t) = text {
            req = req.text(t.to_string());
        }
        req.await.map_err(Self::map_err)?;
        Ok(())
    }

    async fn member_status(&self, channel: ChatId, user: UserId) -> Result<MemberStatus> {
        let member = self
            .bot
            .get_chat_member(Self::tg_chat(channel), Self::tg_user(user))
            .await
            .map_err(Self::map_err)?;

        Ok(match member.kind {
            ChatMemberKind::Owner(_) => MemberStatus::Owner,
            ChatMemberKind::Administrator(_) => MemberStatus::Administrator,
            ChatMemberKind::Member => MemberStatus::Member,
            ChatMemberKind::Restricted(_) => MemberStatus::Restricted,
            ChatMemberKind::Left => MemberStatus::Left,
            ChatMemberKind::Banned(_) => MemberStatus::Kicked,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kinogate_core::messaging::{actions::CallbackAction, types::InlineButton};
    use teloxide::types::InlineKeyboardButtonKind;

    #[test]
    fn keyboard_maps_callbacks_and_links() {
        let mut keyboard = InlineKeyboard::default();
        keyboard.push(InlineButton::url("Join", "https://t.me/films"));
        keyboard.push(InlineButton::callback(
            "Remove",
            CallbackAction::DeleteChannel(ChatId(-100)),
        ));

        let markup = TelegramMessenger::markup(keyboard).unwrap();
        let rows = markup.inline_keyboard;
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0][0].text, "Join");
        match &rows[0][0].kind {
            InlineKeyboardButtonKind::Url(url) => assert_eq!(url.as_str(), "https://t.me/films"),
            other => panic!("unexpected {other:?}"),
        }
        match &rows[1][0].kind {
            InlineKeyboardButtonKind::CallbackData(data) => assert_eq!(data, "delete_channel:-100"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn bad_link_is_an_error() {
        let keyboard = InlineKeyboard::one_per_row(vec![InlineButton::url("x", "not a url")]);
        assert!(matches!(
            TelegramMessenger::markup(keyboard),
            Err(Error::External(_))
        ));
    }
}
