use teloxide::types::{CallbackQuery, Message, User};

use kinogate_core::{
    domain::{ChatId, MessageId, MessageRef, UserId},
    messaging::types::{
        CallbackQuery as CoreCallback, Command, IncomingUpdate, MediaMessage, MediaPayload,
        Sender, TextMessage,
    },
};

fn sender(user: &User) -> Sender {
    Sender {
        id: UserId(user.id.0 as i64),
        username: user.username.clone(),
        first_name: user.first_name.clone(),
    }
}

fn message_ref(msg: &Message) -> MessageRef {
    MessageRef {
        chat_id: ChatId(msg.chat.id.0),
        message_id: MessageId(msg.id.0),
    }
}

/// Classify a Telegram message. `None` for senderless or unsupported messages.
pub fn message_update(msg: &Message) -> Option<IncomingUpdate> {
    let from = sender(msg.from()?);
    let message = message_ref(msg);

    if let Some(text) = msg.text() {
        if let Some((name, args)) = Command::parse(text) {
            return Some(IncomingUpdate::Command(Command {
                from,
                message,
                name,
                args,
                reply_to: msg.reply_to_message().map(message_ref),
            }));
        }
        return Some(IncomingUpdate::Text(TextMessage {
            from,
            message,
            text: text.to_string(),
        }));
    }

    let payload = if let Some(video) = msg.video() {
        MediaPayload::Video {
            file_id: video.file.id.clone(),
        }
    } else if let Some(doc) = msg.document() {
        MediaPayload::Document {
            file_id: doc.file.id.clone(),
            mime_type: doc.mime_type.as_ref().map(|m| m.to_string()),
        }
    } else {
        return None;
    };

    Some(IncomingUpdate::Media(MediaMessage {
        from,
        message,
        payload,
        caption: msg.caption().map(str::to_string),
    }))
}

pub fn callback_update(q: &CallbackQuery) -> IncomingUpdate {
    IncomingUpdate::Callback(CoreCallback {
        from: sender(&q.from),
        callback_id: q.id.clone(),
        data: q.data.clone().unwrap_or_default(),
        message: q.message.as_ref().map(message_ref),
    })
}
