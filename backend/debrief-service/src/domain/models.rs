use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// "No channel selected" sentinel accepted by channel loads
pub const NO_CHANNEL: Uuid = Uuid::nil();

/// Fallback display name for authors whose profile could not be resolved
pub const UNKNOWN_AUTHOR_NAME: &str = "Utilisateur";

/// Fallback display name for the current viewer's own posts and comments
pub const SELF_AUTHOR_NAME: &str = "Vous";

/// Content item row as stored in `content_items`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ContentRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub video_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub link_url: Option<String>,
    pub creator_id: Uuid,
    pub like_count: i64,
    pub view_count: i64,
    pub comment_count: i64,
    pub created_at: DateTime<Utc>,
    pub channel_id: Option<Uuid>,
    pub is_public: bool,
}

/// Values for a new `content_items` row; counters start at zero
#[derive(Debug, Clone, PartialEq)]
pub struct NewContentRow {
    pub title: String,
    pub description: String,
    pub video_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub link_url: Option<String>,
    pub creator_id: Uuid,
    pub channel_id: Option<Uuid>,
    pub is_public: bool,
}

/// Debriefing as shown to the viewer: the stored row plus the creator's
/// display name and whether the viewer liked it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub video_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub link_url: Option<String>,
    pub creator_id: Uuid,
    pub creator_name: String,
    pub like_count: i64,
    pub view_count: i64,
    pub comment_count: i64,
    pub is_liked: bool,
    pub created_at: DateTime<Utc>,
    pub channel_id: Option<Uuid>,
    pub is_public: bool,
}

impl ContentItem {
    pub fn from_row(row: ContentRow, creator_name: String, is_liked: bool) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            video_url: row.video_url,
            thumbnail_url: row.thumbnail_url,
            link_url: row.link_url,
            creator_id: row.creator_id,
            creator_name,
            like_count: row.like_count,
            view_count: row.view_count,
            comment_count: row.comment_count,
            is_liked,
            created_at: row.created_at,
            channel_id: row.channel_id,
            is_public: row.is_public,
        }
    }

    pub fn audience(&self) -> Audience {
        match self.channel_id {
            Some(channel_id) if !self.is_public => Audience::Channel(channel_id),
            _ => Audience::Public,
        }
    }
}

/// Where a content item is visible
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    Public,
    Channel(Uuid),
}

impl Audience {
    pub fn channel_id(&self) -> Option<Uuid> {
        match self {
            Audience::Public => None,
            Audience::Channel(id) => Some(*id),
        }
    }

    pub fn is_public(&self) -> bool {
        matches!(self, Audience::Public)
    }
}

/// Which feed a content repository currently mirrors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedScope {
    #[default]
    Unselected,
    Channel(Uuid),
    Public,
}

/// Like state of one item after a toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeState {
    pub liked: bool,
    pub like_count: i64,
}

/// Result of a scope load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The list now holds this many entries
    Loaded(usize),
    /// No scope selected; the list was cleared without a store call
    Reset,
    /// The scope changed while the load was in flight; its result was dropped
    Superseded,
}

/// Comment row as stored in `comments`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CommentRow {
    pub id: Uuid,
    pub content_id: Uuid,
    pub author_id: Uuid,
    pub body: String,
    pub parent_id: Option<Uuid>,
    pub like_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCommentRow {
    pub content_id: Uuid,
    pub author_id: Uuid,
    pub body: String,
    pub parent_id: Option<Uuid>,
}

/// Comment with its author name, viewer like state and (for top-level
/// comments only) its replies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub content_id: Uuid,
    pub author_id: Uuid,
    pub author_name: String,
    pub body: String,
    pub parent_id: Option<Uuid>,
    pub like_count: i64,
    pub is_liked: bool,
    pub created_at: DateTime<Utc>,
    pub replies: Vec<Comment>,
}

impl Comment {
    pub fn from_row(row: CommentRow, author_name: String, is_liked: bool) -> Self {
        Self {
            id: row.id,
            content_id: row.content_id,
            author_id: row.author_id,
            author_name,
            body: row.body,
            parent_id: row.parent_id,
            like_count: row.like_count,
            is_liked,
            created_at: row.created_at,
            replies: Vec::new(),
        }
    }

    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }
}

/// Profile entry used to resolve display names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub display_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(channel_id: Option<Uuid>, is_public: bool) -> ContentRow {
        ContentRow {
            id: Uuid::new_v4(),
            title: "Sprint review".to_string(),
            description: String::new(),
            video_url: None,
            thumbnail_url: None,
            link_url: None,
            creator_id: Uuid::new_v4(),
            like_count: 2,
            view_count: 0,
            comment_count: 1,
            created_at: Utc::now(),
            channel_id,
            is_public,
        }
    }

    #[test]
    fn test_audience_from_item() {
        let channel = Uuid::new_v4();
        let item = ContentItem::from_row(row(Some(channel), false), "Ana".into(), false);
        assert_eq!(item.audience(), Audience::Channel(channel));

        let item = ContentItem::from_row(row(None, true), "Ana".into(), true);
        assert_eq!(item.audience(), Audience::Public);
        assert!(item.is_liked);
        assert_eq!(item.creator_name, "Ana");
    }

    #[test]
    fn test_audience_accessors() {
        let channel = Uuid::new_v4();
        assert_eq!(Audience::Channel(channel).channel_id(), Some(channel));
        assert!(!Audience::Channel(channel).is_public());
        assert_eq!(Audience::Public.channel_id(), None);
        assert!(Audience::Public.is_public());
    }

    #[test]
    fn test_comment_from_row_starts_without_replies() {
        let comment = Comment::from_row(
            CommentRow {
                id: Uuid::new_v4(),
                content_id: Uuid::new_v4(),
                author_id: Uuid::new_v4(),
                body: "Nice".to_string(),
                parent_id: Some(Uuid::new_v4()),
                like_count: 0,
                created_at: Utc::now(),
            },
            UNKNOWN_AUTHOR_NAME.to_string(),
            false,
        );
        assert!(comment.replies.is_empty());
        assert!(comment.is_reply());
        assert_eq!(comment.author_name, "Utilisateur");
    }

    #[test]
    fn test_feed_scope_default_is_unselected() {
        assert_eq!(FeedScope::default(), FeedScope::Unselected);
    }
}
