use std::sync::Arc;

use kinogate_core::{
    config::Config,
    ports::{CatalogStore, DirectoryStore},
};
use kinogate_sqlite::Database;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), kinogate_core::Error> {
    kinogate_core::logging::init("kinogate")?;

    let cfg = Arc::new(Config::load()?);

    let db = Arc::new(Database::open(&cfg.database_path)?);
    info!(
        movies = db.count()?,
        users = db.user_count()?,
        "catalog ready"
    );

    kinogate_telegram::router::run_polling(cfg, db.clone(), db)
        .await
        .map_err(|e| kinogate_core::Error::External(format!("telegram bot failed: {e}")))?;

    Ok(())
}
