use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, error_handlers::LoggingErrorHandler, prelude::*};
use tracing::{info, warn};

use kinogate_core::{
    config::Config,
    messaging::port::MessagingPort,
    ports::{CatalogStore, DirectoryStore},
    router::Router,
};

use crate::handlers;
use crate::TelegramMessenger;

#[derive(Clone)]
pub struct AppState {
    pub router: Arc<Router>,
}

/// Build the Telegram side, seed required channels, then long-poll until Ctrl-C.
pub async fn run_polling(
    cfg: Arc<Config>,
    catalog: Arc<dyn CatalogStore>,
    directory: Arc<dyn DirectoryStore>,
) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.bot_token.clone());

    match bot.get_me().await {
        Ok(me) => info!("kinogate started: @{}", me.username()),
        Err(e) => warn!("get_me failed: {e}"),
    }
    info!(
        admins = cfg.admin_ids.len(),
        archive = cfg.archive_channel_id.0,
        protect_content = cfg.protect_content,
        "configuration loaded"
    );

    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let router = Arc::new(Router::new(cfg.clone(), catalog, directory, messenger));

    router.seed_required_channels()?;

    let state = Arc::new(AppState { router });

    let handler = dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handlers::handle_callback))
        .branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .error_handler(LoggingErrorHandler::with_custom_text(
            "an error from the update listener",
        ))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("polling stopped");
    Ok(())
}
