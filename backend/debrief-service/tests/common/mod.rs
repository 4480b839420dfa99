//! Shared harness for the repository integration tests.
//!
//! Wires the repositories to in-process collaborators so tests can seed the
//! store, flip the viewer and inspect notices and stored rows.

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::Arc;
use uuid::Uuid;

use debrief_service::domain::{CommentRow, ContentRow};
use debrief_service::{
    CommentRepository, ContentRepository, DebriefContext, MemoryBlobStore, MemoryStore, NoticeLog,
    SessionIdentity,
};

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub media: Arc<MemoryBlobStore>,
    pub identity: Arc<SessionIdentity>,
    pub notices: Arc<NoticeLog>,
}

impl Harness {
    /// Harness with no signed-in viewer
    pub fn anonymous() -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            media: Arc::new(MemoryBlobStore::default()),
            identity: Arc::new(SessionIdentity::anonymous()),
            notices: Arc::new(NoticeLog::new()),
        }
    }

    /// Harness signed in as `viewer`, whose profile is named `name`
    pub fn signed_in(viewer: Uuid, name: &str) -> Self {
        let harness = Self::anonymous();
        harness.identity.sign_in(viewer);
        harness.store.add_profile(viewer, name);
        harness
    }

    pub fn context(&self) -> DebriefContext {
        DebriefContext::new(
            self.store.clone(),
            self.media.clone(),
            self.identity.clone(),
            self.notices.clone(),
        )
    }

    pub fn content_repository(&self) -> ContentRepository {
        ContentRepository::new(self.context())
    }

    pub fn comment_repository(&self, content_id: Uuid) -> CommentRepository {
        CommentRepository::new(self.context(), content_id)
    }

    pub fn last_notice(&self) -> Option<String> {
        self.notices.last().map(|n| n.message)
    }
}

/// Fixed base time so orderings in tests are deterministic
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
}

pub fn at_minute(minute: i64) -> DateTime<Utc> {
    base_time() + Duration::minutes(minute)
}

pub fn channel_row(channel_id: Uuid, creator_id: Uuid, minute: i64) -> ContentRow {
    ContentRow {
        id: Uuid::new_v4(),
        title: format!("debrief at {}", minute),
        description: String::new(),
        video_url: None,
        thumbnail_url: None,
        link_url: None,
        creator_id,
        like_count: 0,
        view_count: 0,
        comment_count: 0,
        created_at: at_minute(minute),
        channel_id: Some(channel_id),
        is_public: false,
    }
}

pub fn public_row(creator_id: Uuid, minute: i64) -> ContentRow {
    ContentRow {
        channel_id: None,
        is_public: true,
        ..channel_row(Uuid::nil(), creator_id, minute)
    }
}

pub fn comment_row(
    content_id: Uuid,
    author_id: Uuid,
    parent_id: Option<Uuid>,
    minute: i64,
) -> CommentRow {
    CommentRow {
        id: Uuid::new_v4(),
        content_id,
        author_id,
        body: format!("comment at {}", minute),
        parent_id,
        like_count: 0,
        created_at: at_minute(minute),
    }
}
