use async_trait::async_trait;

use crate::{
    domain::{ChatId, MediaRef, MessageRef, UserId},
    messaging::types::{InlineKeyboard, MemberStatus, MessagingCapabilities},
    Result,
};

/// Outbound messenger port.
///
/// Telegram is the only implementation; tests drive the bot logic through fakes.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    fn capabilities(&self) -> MessagingCapabilities;

    async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<MessageRef>;

    async fn send_inline_keyboard(
        &self,
        chat_id: ChatId,
        html: &str,
        keyboard: InlineKeyboard,
    ) -> Result<MessageRef>;

    /// Replace a message's text, and its keyboard when one is given.
    async fn edit_html(
        &self,
        msg: MessageRef,
        html: &str,
        keyboard: Option<InlineKeyboard>,
    ) -> Result<()>;

    async fn delete_message(&self, msg: MessageRef) -> Result<()>;

    /// Send previously uploaded media by file id.
    async fn send_media(
        &self,
        chat_id: ChatId,
        media: &MediaRef,
        caption: Option<&str>,
        protect_content: bool,
    ) -> Result<MessageRef>;

    /// Copy an existing message into another chat.
    async fn copy_message(&self, to: ChatId, source: MessageRef) -> Result<()>;

    async fn answer_callback_query(&self, callback_id: &str, text: Option<&str>) -> Result<()>;

    async fn member_status(&self, channel: ChatId, user: UserId) -> Result<MemberStatus>;
}
