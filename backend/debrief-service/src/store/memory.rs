//! In-process store.
//!
//! Keeps every collection in memory behind one lock. Besides serving as a
//! local backend it lets callers inject failures per operation, add latency,
//! and count calls (to check that enrichment stays batched).

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use uuid::Uuid;

use super::{CommentStore, ContentStore, ProfileStore};
use crate::domain::{CommentRow, ContentRow, NewCommentRow, NewContentRow};
use crate::error::{StoreError, StoreResult};

#[derive(Default)]
struct Tables {
    content: HashMap<Uuid, ContentRow>,
    content_likes: HashSet<(Uuid, Uuid)>,
    comments: HashMap<Uuid, CommentRow>,
    comment_likes: HashSet<(Uuid, Uuid)>,
    profiles: HashMap<Uuid, String>,
}

impl Tables {
    fn comment_count(&self, content_id: Uuid) -> i64 {
        self.comments
            .values()
            .filter(|c| c.content_id == content_id)
            .count() as i64
    }

    fn content_sorted<F>(&self, filter: F) -> Vec<ContentRow>
    where
        F: Fn(&ContentRow) -> bool,
    {
        let mut rows: Vec<ContentRow> = self
            .content
            .values()
            .filter(|row| filter(row))
            .map(|row| ContentRow {
                comment_count: self.comment_count(row.id),
                ..row.clone()
            })
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        rows
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    failing: Mutex<HashSet<&'static str>>,
    calls: Mutex<HashMap<&'static str, usize>>,
    latency: Mutex<Option<Duration>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- seeding ----

    pub fn add_profile(&self, user_id: Uuid, display_name: impl Into<String>) {
        self.tables.lock().profiles.insert(user_id, display_name.into());
    }

    pub fn seed_content(&self, row: ContentRow) {
        self.tables.lock().content.insert(row.id, row);
    }

    pub fn seed_comment(&self, row: CommentRow) {
        self.tables.lock().comments.insert(row.id, row);
    }

    /// Record a like row without touching the stored counter
    pub fn seed_content_like(&self, content_id: Uuid, user_id: Uuid) {
        self.tables.lock().content_likes.insert((content_id, user_id));
    }

    pub fn seed_comment_like(&self, comment_id: Uuid, user_id: Uuid) {
        self.tables.lock().comment_likes.insert((comment_id, user_id));
    }

    // ---- inspection ----

    pub fn content(&self, content_id: Uuid) -> Option<ContentRow> {
        self.tables.lock().content.get(&content_id).cloned()
    }

    pub fn content_len(&self) -> usize {
        self.tables.lock().content.len()
    }

    pub fn comment(&self, comment_id: Uuid) -> Option<CommentRow> {
        self.tables.lock().comments.get(&comment_id).cloned()
    }

    pub fn comments_len(&self) -> usize {
        self.tables.lock().comments.len()
    }

    pub fn has_content_like(&self, content_id: Uuid, user_id: Uuid) -> bool {
        self.tables.lock().content_likes.contains(&(content_id, user_id))
    }

    pub fn has_comment_like(&self, comment_id: Uuid, user_id: Uuid) -> bool {
        self.tables.lock().comment_likes.contains(&(comment_id, user_id))
    }

    pub fn call_count(&self, operation: &str) -> usize {
        self.calls.lock().get(operation).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().values().sum()
    }

    pub fn reset_calls(&self) {
        self.calls.lock().clear();
    }

    // ---- fault injection ----

    /// Make every call to `operation` fail until [`Self::clear_failures`]
    pub fn fail_operation(&self, operation: &'static str) {
        self.failing.lock().insert(operation);
    }

    pub fn clear_failures(&self) {
        self.failing.lock().clear();
    }

    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.lock() = latency;
    }

    async fn enter(&self, operation: &'static str) -> StoreResult<()> {
        *self.calls.lock().entry(operation).or_insert(0) += 1;

        let latency = *self.latency.lock();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        if self.failing.lock().contains(operation) {
            return Err(StoreError::Unavailable(format!("{} failed", operation)));
        }
        Ok(())
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn list_channel_content(&self, channel_id: Uuid) -> StoreResult<Vec<ContentRow>> {
        self.enter("list_channel_content").await?;
        Ok(self
            .tables
            .lock()
            .content_sorted(|row| row.channel_id == Some(channel_id)))
    }

    async fn list_public_content(&self) -> StoreResult<Vec<ContentRow>> {
        self.enter("list_public_content").await?;
        Ok(self.tables.lock().content_sorted(|row| row.is_public))
    }

    async fn insert_content(&self, new: NewContentRow) -> StoreResult<ContentRow> {
        self.enter("insert_content").await?;
        if new.is_public == new.channel_id.is_some() {
            return Err(StoreError::Constraint("content_items_scope_check".to_string()));
        }

        let row = ContentRow {
            id: Uuid::new_v4(),
            title: new.title,
            description: new.description,
            video_url: new.video_url,
            thumbnail_url: new.thumbnail_url,
            link_url: new.link_url,
            creator_id: new.creator_id,
            like_count: 0,
            view_count: 0,
            comment_count: 0,
            created_at: Utc::now(),
            channel_id: new.channel_id,
            is_public: new.is_public,
        };
        self.tables.lock().content.insert(row.id, row.clone());
        Ok(row)
    }

    async fn delete_content(&self, content_id: Uuid, creator_id: Uuid) -> StoreResult<u64> {
        self.enter("delete_content").await?;
        let mut tables = self.tables.lock();
        let owned = tables
            .content
            .get(&content_id)
            .is_some_and(|row| row.creator_id == creator_id);
        if !owned {
            return Ok(0);
        }

        tables.content.remove(&content_id);
        tables.content_likes.retain(|(id, _)| *id != content_id);
        let removed: HashSet<Uuid> = tables
            .comments
            .values()
            .filter(|c| c.content_id == content_id)
            .map(|c| c.id)
            .collect();
        tables.comments.retain(|id, _| !removed.contains(id));
        tables.comment_likes.retain(|(id, _)| !removed.contains(id));
        Ok(1)
    }

    async fn insert_content_like(&self, content_id: Uuid, user_id: Uuid) -> StoreResult<i64> {
        self.enter("insert_content_like").await?;
        let mut tables = self.tables.lock();
        if !tables.content.contains_key(&content_id) {
            return Err(StoreError::Constraint("content_likes_content_id_fkey".to_string()));
        }

        let inserted = tables.content_likes.insert((content_id, user_id));
        let row = tables
            .content
            .get_mut(&content_id)
            .ok_or_else(|| StoreError::Constraint("content_likes_content_id_fkey".to_string()))?;
        if inserted {
            row.like_count += 1;
        }
        Ok(row.like_count)
    }

    async fn delete_content_like(&self, content_id: Uuid, user_id: Uuid) -> StoreResult<i64> {
        self.enter("delete_content_like").await?;
        let mut tables = self.tables.lock();
        let removed = tables.content_likes.remove(&(content_id, user_id));
        let row = tables
            .content
            .get_mut(&content_id)
            .ok_or_else(|| StoreError::Unavailable(format!("content {} not found", content_id)))?;
        if removed {
            row.like_count = (row.like_count - 1).max(0);
        }
        Ok(row.like_count)
    }

    async fn liked_content_ids(
        &self,
        user_id: Uuid,
        content_ids: &[Uuid],
    ) -> StoreResult<HashSet<Uuid>> {
        self.enter("liked_content_ids").await?;
        let tables = self.tables.lock();
        Ok(content_ids
            .iter()
            .filter(|id| tables.content_likes.contains(&(**id, user_id)))
            .copied()
            .collect())
    }
}

#[async_trait]
impl CommentStore for MemoryStore {
    async fn list_comments(&self, content_id: Uuid) -> StoreResult<Vec<CommentRow>> {
        self.enter("list_comments").await?;
        let tables = self.tables.lock();
        let mut rows: Vec<CommentRow> = tables
            .comments
            .values()
            .filter(|c| c.content_id == content_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(rows)
    }

    async fn insert_comment(&self, new: NewCommentRow) -> StoreResult<CommentRow> {
        self.enter("insert_comment").await?;
        let mut tables = self.tables.lock();
        if !tables.content.contains_key(&new.content_id) {
            return Err(StoreError::Constraint("comments_content_id_fkey".to_string()));
        }
        if let Some(parent_id) = new.parent_id {
            if !tables.comments.contains_key(&parent_id) {
                return Err(StoreError::Constraint("comments_parent_id_fkey".to_string()));
            }
        }

        let row = CommentRow {
            id: Uuid::new_v4(),
            content_id: new.content_id,
            author_id: new.author_id,
            body: new.body,
            parent_id: new.parent_id,
            like_count: 0,
            created_at: Utc::now(),
        };
        tables.comments.insert(row.id, row.clone());
        Ok(row)
    }

    async fn delete_comment(&self, comment_id: Uuid, author_id: Uuid) -> StoreResult<u64> {
        self.enter("delete_comment").await?;
        let mut tables = self.tables.lock();
        let owned = tables
            .comments
            .get(&comment_id)
            .is_some_and(|c| c.author_id == author_id);
        if !owned {
            return Ok(0);
        }

        let removed: HashSet<Uuid> = tables
            .comments
            .values()
            .filter(|c| c.id == comment_id || c.parent_id == Some(comment_id))
            .map(|c| c.id)
            .collect();
        tables.comments.retain(|id, _| !removed.contains(id));
        tables.comment_likes.retain(|(id, _)| !removed.contains(id));
        Ok(1)
    }

    async fn insert_comment_like(&self, comment_id: Uuid, user_id: Uuid) -> StoreResult<i64> {
        self.enter("insert_comment_like").await?;
        let mut tables = self.tables.lock();
        if !tables.comments.contains_key(&comment_id) {
            return Err(StoreError::Constraint("comment_likes_comment_id_fkey".to_string()));
        }

        let inserted = tables.comment_likes.insert((comment_id, user_id));
        let row = tables
            .comments
            .get_mut(&comment_id)
            .ok_or_else(|| StoreError::Constraint("comment_likes_comment_id_fkey".to_string()))?;
        if inserted {
            row.like_count += 1;
        }
        Ok(row.like_count)
    }

    async fn delete_comment_like(&self, comment_id: Uuid, user_id: Uuid) -> StoreResult<i64> {
        self.enter("delete_comment_like").await?;
        let mut tables = self.tables.lock();
        let removed = tables.comment_likes.remove(&(comment_id, user_id));
        let row = tables
            .comments
            .get_mut(&comment_id)
            .ok_or_else(|| StoreError::Unavailable(format!("comment {} not found", comment_id)))?;
        if removed {
            row.like_count = (row.like_count - 1).max(0);
        }
        Ok(row.like_count)
    }

    async fn liked_comment_ids(
        &self,
        user_id: Uuid,
        comment_ids: &[Uuid],
    ) -> StoreResult<HashSet<Uuid>> {
        self.enter("liked_comment_ids").await?;
        let tables = self.tables.lock();
        Ok(comment_ids
            .iter()
            .filter(|id| tables.comment_likes.contains(&(**id, user_id)))
            .copied()
            .collect())
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn display_names(&self, user_ids: &[Uuid]) -> StoreResult<HashMap<Uuid, String>> {
        self.enter("display_names").await?;
        let tables = self.tables.lock();
        Ok(user_ids
            .iter()
            .filter_map(|id| tables.profiles.get(id).map(|name| (*id, name.clone())))
            .collect())
    }
}
