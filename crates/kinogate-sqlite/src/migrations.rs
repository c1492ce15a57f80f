use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS movies (
            code        TEXT PRIMARY KEY,
            file_id     TEXT NOT NULL,
            media_kind  TEXT NOT NULL DEFAULT 'video',
            caption     TEXT,
            added_at    TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_movies_added
            ON movies(added_at);

        CREATE TABLE IF NOT EXISTS users (
            user_id         INTEGER PRIMARY KEY,
            username        TEXT,
            joined_at       TEXT NOT NULL,
            last_active_at  TEXT NOT NULL
        );

        -- seq keeps insertion order; upserts by channel_id leave it alone
        CREATE TABLE IF NOT EXISTS channels (
            seq         INTEGER PRIMARY KEY AUTOINCREMENT,
            channel_id  INTEGER NOT NULL UNIQUE,
            username    TEXT NOT NULL,
            title       TEXT
        );
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
