//! Relational store access.
//!
//! The traits split the store by collection (`content_items` + `content_likes`,
//! `comments` + `comment_likes`, `profiles`); [`RelationalStore`] is the union
//! the repositories depend on. Like mutations return the authoritative
//! aggregate count after the write.

use async_trait::async_trait;
use sqlx::PgPool;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::domain::{CommentRow, ContentRow, NewCommentRow, NewContentRow};
use crate::error::StoreResult;

mod comments;
mod content;
pub mod memory;
mod profiles;

pub use memory::MemoryStore;

#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Items of one channel, newest first
    async fn list_channel_content(&self, channel_id: Uuid) -> StoreResult<Vec<ContentRow>>;

    /// Public items, newest first
    async fn list_public_content(&self) -> StoreResult<Vec<ContentRow>>;

    async fn insert_content(&self, new: NewContentRow) -> StoreResult<ContentRow>;

    /// Delete an item created by `creator_id`; returns affected rows
    async fn delete_content(&self, content_id: Uuid, creator_id: Uuid) -> StoreResult<u64>;

    /// Add a like (idempotent); returns the item's like count
    async fn insert_content_like(&self, content_id: Uuid, user_id: Uuid) -> StoreResult<i64>;

    /// Remove a like (idempotent); returns the item's like count
    async fn delete_content_like(&self, content_id: Uuid, user_id: Uuid) -> StoreResult<i64>;

    /// Subset of `content_ids` liked by `user_id`
    async fn liked_content_ids(
        &self,
        user_id: Uuid,
        content_ids: &[Uuid],
    ) -> StoreResult<HashSet<Uuid>>;
}

#[async_trait]
pub trait CommentStore: Send + Sync {
    /// Every comment of an item (top-level and replies), oldest first
    async fn list_comments(&self, content_id: Uuid) -> StoreResult<Vec<CommentRow>>;

    async fn insert_comment(&self, new: NewCommentRow) -> StoreResult<CommentRow>;

    /// Delete a comment written by `author_id`; replies cascade
    async fn delete_comment(&self, comment_id: Uuid, author_id: Uuid) -> StoreResult<u64>;

    async fn insert_comment_like(&self, comment_id: Uuid, user_id: Uuid) -> StoreResult<i64>;

    async fn delete_comment_like(&self, comment_id: Uuid, user_id: Uuid) -> StoreResult<i64>;

    async fn liked_comment_ids(
        &self,
        user_id: Uuid,
        comment_ids: &[Uuid],
    ) -> StoreResult<HashSet<Uuid>>;
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Display names for the given users; unknown users are absent
    async fn display_names(&self, user_ids: &[Uuid]) -> StoreResult<HashMap<Uuid, String>>;
}

pub trait RelationalStore: ContentStore + CommentStore + ProfileStore {}

impl<T> RelationalStore for T where T: ContentStore + CommentStore + ProfileStore {}

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
