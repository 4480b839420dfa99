//! Debriefing feed for one scope: a channel or the public feed.
//!
//! The repository mirrors the feed in memory, newest first. Loads are tagged
//! with a scope generation so that a load finishing after the scope changed
//! cannot overwrite the newer list.

use chrono::Utc;
use parking_lot::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;
use validator::Validate;

use super::enrichment::{enrich_content, viewer_display_name};
use super::DebriefContext;
use crate::domain::{
    Audience, ContentItem, FeedScope, LikeState, LoadOutcome, NewContentRow, NO_CHANNEL,
};
use crate::error::{DebriefError, DebriefResult};
use crate::media::{object_key, MediaKind, MediaUpload};
use crate::notifier::messages;

/// Fields of a debriefing to publish
#[derive(Debug, Clone, Default, Validate)]
pub struct NewContent {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 2000))]
    pub description: String,
    #[validate(url)]
    pub link_url: Option<String>,
    pub video: Option<MediaUpload>,
    pub thumbnail: Option<MediaUpload>,
}

impl NewContent {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_link(mut self, link_url: impl Into<String>) -> Self {
        self.link_url = Some(link_url.into());
        self
    }

    pub fn with_video(mut self, video: MediaUpload) -> Self {
        self.video = Some(video);
        self
    }

    pub fn with_thumbnail(mut self, thumbnail: MediaUpload) -> Self {
        self.thumbnail = Some(thumbnail);
        self
    }

    fn normalized(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            link_url: self
                .link_url
                .map(|l| l.trim().to_string())
                .filter(|l| !l.is_empty()),
            ..self
        }
    }
}

/// Target of a new debriefing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishOptions {
    pub target_channel: Option<Uuid>,
    pub is_public: bool,
}

impl PublishOptions {
    pub fn channel(channel_id: Uuid) -> Self {
        Self {
            target_channel: Some(channel_id),
            is_public: false,
        }
    }

    pub fn public() -> Self {
        Self {
            target_channel: None,
            is_public: true,
        }
    }

    /// Public content never keeps a channel; channel content needs a real one.
    pub fn audience(&self) -> DebriefResult<Audience> {
        if self.is_public {
            return Ok(Audience::Public);
        }
        match self.target_channel {
            Some(channel_id) if channel_id != NO_CHANNEL => Ok(Audience::Channel(channel_id)),
            _ => Err(DebriefError::InvalidScope),
        }
    }
}

#[derive(Debug, Default)]
struct FeedState {
    scope: FeedScope,
    generation: u64,
    items: Vec<ContentItem>,
    loading: bool,
}

pub struct ContentRepository {
    ctx: DebriefContext,
    state: RwLock<FeedState>,
}

impl ContentRepository {
    pub fn new(ctx: DebriefContext) -> Self {
        Self {
            ctx,
            state: RwLock::new(FeedState::default()),
        }
    }

    pub fn items(&self) -> Vec<ContentItem> {
        self.state.read().items.clone()
    }

    pub fn item(&self, content_id: Uuid) -> Option<ContentItem> {
        self.state
            .read()
            .items
            .iter()
            .find(|i| i.id == content_id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.state.read().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().items.is_empty()
    }

    pub fn is_loading(&self) -> bool {
        self.state.read().loading
    }

    pub fn scope(&self) -> FeedScope {
        self.state.read().scope
    }

    /// Load the feed of one channel. `None` or [`NO_CHANNEL`] clears the list
    /// without touching the store.
    pub async fn load_for_channel(&self, channel: Option<Uuid>) -> DebriefResult<LoadOutcome> {
        match channel.filter(|id| *id != NO_CHANNEL) {
            Some(channel_id) => self.load_scope(FeedScope::Channel(channel_id)).await,
            None => Ok(self.reset()),
        }
    }

    pub async fn load_public_feed(&self) -> DebriefResult<LoadOutcome> {
        self.load_scope(FeedScope::Public).await
    }

    /// Reload the current scope
    pub async fn refresh(&self) -> DebriefResult<LoadOutcome> {
        match self.scope() {
            FeedScope::Unselected => Ok(self.reset()),
            scope => self.load_scope(scope).await,
        }
    }

    fn reset(&self) -> LoadOutcome {
        let mut state = self.state.write();
        state.generation += 1;
        state.scope = FeedScope::Unselected;
        state.items.clear();
        state.loading = false;
        LoadOutcome::Reset
    }

    fn begin_load(&self, scope: FeedScope) -> u64 {
        let mut state = self.state.write();
        state.generation += 1;
        state.scope = scope;
        state.loading = true;
        state.generation
    }

    async fn load_scope(&self, scope: FeedScope) -> DebriefResult<LoadOutcome> {
        let generation = self.begin_load(scope);
        let viewer = self.ctx.identity.current_viewer();
        let store = self.ctx.store.as_ref();

        let fetched = match scope {
            FeedScope::Channel(channel_id) => store.list_channel_content(channel_id).await,
            FeedScope::Public => store.list_public_content().await,
            FeedScope::Unselected => Ok(Vec::new()),
        };
        let result = match fetched {
            Ok(rows) => enrich_content(store, viewer, rows).await,
            Err(err) => Err(err),
        };

        let mut state = self.state.write();
        if state.generation != generation {
            debug!(
                ?scope,
                generation,
                current = state.generation,
                "discarding superseded feed load"
            );
            return Ok(LoadOutcome::Superseded);
        }
        state.loading = false;

        match result {
            Ok(items) => {
                let count = items.len();
                state.items = items;
                drop(state);
                info!(?scope, count, "feed loaded");
                Ok(LoadOutcome::Loaded(count))
            }
            Err(err) => {
                drop(state);
                let err = DebriefError::from(err);
                self.ctx
                    .report("load_feed", &err, messages::CONTENT_LOAD_FAILED);
                Err(err)
            }
        }
    }

    /// Publish a debriefing and put it at the top of the list.
    pub async fn create(
        &self,
        input: NewContent,
        options: PublishOptions,
    ) -> DebriefResult<ContentItem> {
        let result = self.try_create(input, options).await;
        match &result {
            Ok(item) => {
                info!(content_id = %item.id, public = item.is_public, "debrief published");
                self.ctx.success(messages::CONTENT_PUBLISHED);
            }
            Err(err) => self
                .ctx
                .report("create_content", err, messages::CONTENT_PUBLISH_FAILED),
        }
        result
    }

    pub async fn create_public(&self, input: NewContent) -> DebriefResult<ContentItem> {
        self.create(input, PublishOptions::public()).await
    }

    async fn try_create(
        &self,
        input: NewContent,
        options: PublishOptions,
    ) -> DebriefResult<ContentItem> {
        let viewer = self
            .ctx
            .identity
            .current_viewer()
            .ok_or(DebriefError::AuthRequired)?;
        let audience = options.audience()?;

        let input = input.normalized();
        if input.title.is_empty() {
            return Err(DebriefError::InvalidInput("title must not be empty".into()));
        }
        input.validate()?;

        let NewContent {
            title,
            description,
            link_url,
            video,
            thumbnail,
        } = input;

        let mut uploaded = Vec::new();
        let video_url = match video {
            Some(upload) => Some(
                self.upload(viewer, MediaKind::Video, upload, &mut uploaded)
                    .await?,
            ),
            None => None,
        };
        let thumbnail_url = match thumbnail {
            Some(upload) => {
                match self
                    .upload(viewer, MediaKind::Thumbnail, upload, &mut uploaded)
                    .await
                {
                    Ok(url) => Some(url),
                    Err(err) => {
                        log_orphans(&uploaded);
                        return Err(err);
                    }
                }
            }
            None => None,
        };

        let new_row = NewContentRow {
            title,
            description,
            video_url,
            thumbnail_url,
            link_url,
            creator_id: viewer,
            channel_id: audience.channel_id(),
            is_public: audience.is_public(),
        };

        let row = match self.ctx.store.insert_content(new_row).await {
            Ok(row) => row,
            Err(err) => {
                log_orphans(&uploaded);
                return Err(err.into());
            }
        };

        let creator_name = viewer_display_name(self.ctx.store.as_ref(), viewer).await;
        let item = ContentItem::from_row(row, creator_name, false);

        self.state.write().items.insert(0, item.clone());
        Ok(item)
    }

    async fn upload(
        &self,
        owner: Uuid,
        kind: MediaKind,
        upload: MediaUpload,
        uploaded: &mut Vec<String>,
    ) -> DebriefResult<String> {
        let key = object_key(owner, kind, &upload.file_name, Utc::now());
        self.ctx
            .media
            .upload(&key, upload.bytes, &upload.content_type)
            .await?;

        let url = self.ctx.media.public_url(&key);
        debug!(?kind, %key, "media uploaded");
        uploaded.push(key);
        Ok(url)
    }

    /// Toggle the viewer's like on an item of the current list.
    ///
    /// The returned count is the one reported by the store after the write.
    pub async fn like(&self, content_id: Uuid) -> DebriefResult<LikeState> {
        let result = self.try_like(content_id).await;
        if let Err(err) = &result {
            self.ctx
                .report("like_content", err, messages::CONTENT_LIKE_FAILED);
        }
        result
    }

    async fn try_like(&self, content_id: Uuid) -> DebriefResult<LikeState> {
        let viewer = self
            .ctx
            .identity
            .current_viewer()
            .ok_or(DebriefError::AuthRequired)?;
        let was_liked = self
            .item(content_id)
            .map(|item| item.is_liked)
            .ok_or(DebriefError::NotFound(content_id))?;

        let like_count = if was_liked {
            self.ctx.store.delete_content_like(content_id, viewer).await?
        } else {
            self.ctx.store.insert_content_like(content_id, viewer).await?
        };
        let like = LikeState {
            liked: !was_liked,
            like_count,
        };

        if let Some(item) = self
            .state
            .write()
            .items
            .iter_mut()
            .find(|i| i.id == content_id)
        {
            item.is_liked = like.liked;
            item.like_count = like.like_count;
        }

        debug!(content_id = %content_id, liked = like.liked, like_count, "like toggled");
        Ok(like)
    }

    /// Delete one of the viewer's own items. The local list only changes when
    /// the store actually removed the row.
    pub async fn delete(&self, content_id: Uuid) -> DebriefResult<()> {
        let result = self.try_delete(content_id).await;
        match &result {
            Ok(()) => {
                info!(content_id = %content_id, "debrief deleted");
                self.ctx.success(messages::CONTENT_DELETED);
            }
            Err(err) => self
                .ctx
                .report("delete_content", err, messages::CONTENT_DELETE_FAILED),
        }
        result
    }

    async fn try_delete(&self, content_id: Uuid) -> DebriefResult<()> {
        let viewer = self
            .ctx
            .identity
            .current_viewer()
            .ok_or(DebriefError::AuthRequired)?;

        let affected = self.ctx.store.delete_content(content_id, viewer).await?;
        if affected == 0 {
            return Err(DebriefError::OwnershipRejected(content_id));
        }

        self.state.write().items.retain(|i| i.id != content_id);
        Ok(())
    }
}

fn log_orphans(keys: &[String]) {
    for key in keys {
        warn!(%key, "content insert failed after upload, media object left orphaned");
    }
}
