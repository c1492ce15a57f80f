use kinogate_core::{
    domain::{normalize_handle, ChatId, KnownUser, RequiredChannel, UserId},
    ports::DirectoryStore,
    Result,
};

use crate::{now, Database};

impl DirectoryStore for Database {
    fn register_user(&self, id: UserId, handle: Option<&str>) -> Result<bool> {
        self.with_conn(|conn| {
            let at = now();
            let n = conn.execute(
                "INSERT OR IGNORE INTO users (user_id, username, joined_at, last_active_at)
                 VALUES (?1, ?2, ?3, ?3)",
                rusqlite::params![id.0, handle, at],
            )?;
            Ok(n > 0)
        })
    }

    fn touch_activity(&self, id: UserId) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE users SET last_active_at = ?1 WHERE user_id = ?2",
                rusqlite::params![now(), id.0],
            )?;
            Ok(())
        })
    }

    fn user_count(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let n: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))?;
            Ok(n as u64)
        })
    }

    fn list_users(&self) -> Result<Vec<KnownUser>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT user_id, username FROM users ORDER BY joined_at, user_id")?;
            let rows = stmt.query_map([], |row| {
                Ok(KnownUser {
                    id: UserId(row.get(0)?),
                    handle: row.get(1)?,
                })
            })?;
            rows.collect()
        })
    }

    fn add_channel(
        &self,
        id: ChatId,
        handle: &str,
        title: Option<&str>,
    ) -> Result<RequiredChannel> {
        let handle = normalize_handle(handle);
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO channels (channel_id, username, title) VALUES (?1, ?2, ?3)
                 ON CONFLICT(channel_id) DO UPDATE SET
                    username = excluded.username,
                    title = excluded.title",
                rusqlite::params![id.0, handle, title],
            )?;
            Ok(())
        })?;

        Ok(RequiredChannel {
            id,
            handle,
            title: title.map(str::to_string),
        })
    }

    fn remove_channel(&self, id: ChatId) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute("DELETE FROM channels WHERE channel_id = ?1", [id.0])?;
            Ok(n > 0)
        })
    }

    fn list_channels(&self) -> Result<Vec<RequiredChannel>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT channel_id, username, title FROM channels ORDER BY seq")?;
            let rows = stmt.query_map([], |row| {
                Ok(RequiredChannel {
                    id: ChatId(row.get(0)?),
                    handle: row.get(1)?,
                    title: row.get(2)?,
                })
            })?;
            rows.collect()
        })
    }
}
