//! Telegram update handlers.
//!
//! Each handler converts the teloxide payload into a core `IncomingUpdate` and
//! hands it to the router. Router errors are logged, never surfaced to teloxide,
//! so one bad update cannot stall polling.

use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{CallbackQuery, Message},
};
use tracing::{debug, error};

use crate::router::AppState;

mod updates;

pub use updates::{callback_update, message_update};

pub async fn handle_callback(
    _bot: Bot,
    q: CallbackQuery,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    let update = callback_update(&q);
    if let Err(e) = state.router.dispatch(update).await {
        error!(user = q.from.id.0, "callback handling failed: {e}");
    }
    Ok(())
}

pub async fn handle_message(_bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(update) = message_update(&msg) else {
        debug!(chat = msg.chat.id.0, "ignoring unsupported message");
        return Ok(());
    };

    let user = update.sender().id.0;
    if let Err(e) = state.router.dispatch(update).await {
        error!(user, chat = msg.chat.id.0, "message handling failed: {e}");
    }
    Ok(())
}
