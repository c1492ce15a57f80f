use crate::{
    domain::{CatalogEntry, ChatId, KnownUser, MediaRef, Movie, RequiredChannel, UserId},
    Result,
};

/// Persistent catalog of movies keyed by code.
///
/// Each call is atomic on its own; nothing spans calls.
pub trait CatalogStore: Send + Sync {
    /// Insert or overwrite the entry for `code` (last write wins).
    fn put(&self, code: &str, media: &MediaRef, caption: Option<&str>) -> Result<()>;

    fn get(&self, code: &str) -> Result<Option<Movie>>;

    /// Returns `false` when no entry existed.
    fn delete(&self, code: &str) -> Result<bool>;

    /// All entries sorted by code.
    fn list_all(&self) -> Result<Vec<CatalogEntry>>;

    fn count(&self) -> Result<u64>;

    /// Most recently added codes, newest first.
    fn recent(&self, limit: usize) -> Result<Vec<String>>;
}

/// Known users plus the required-channel list.
pub trait DirectoryStore: Send + Sync {
    /// Insert the user if absent. Returns `true` when a row was created.
    fn register_user(&self, id: UserId, handle: Option<&str>) -> Result<bool>;

    /// Bump `last_active_at`; a no-op for unknown users.
    fn touch_activity(&self, id: UserId) -> Result<()>;

    fn user_count(&self) -> Result<u64>;

    fn list_users(&self) -> Result<Vec<KnownUser>>;

    /// Upsert by id after normalizing the handle. Keeps the channel's listing position.
    fn add_channel(
        &self,
        id: ChatId,
        handle: &str,
        title: Option<&str>,
    ) -> Result<RequiredChannel>;

    /// Returns `false` when no channel had this id.
    fn remove_channel(&self, id: ChatId) -> Result<bool>;

    /// Channels in insertion order.
    fn list_channels(&self) -> Result<Vec<RequiredChannel>>;
}
