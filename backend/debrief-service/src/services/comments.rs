//! Comment thread of one debriefing.
//!
//! Top-level comments are kept in chronological order, each carrying its
//! replies. Only one level of nesting exists: replying to a reply attaches
//! the new comment to that reply's top-level parent.

use parking_lot::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use super::enrichment::{enrich_comments, viewer_display_name};
use super::DebriefContext;
use crate::domain::{Comment, LikeState, LoadOutcome, NewCommentRow};
use crate::error::{DebriefError, DebriefResult};
use crate::notifier::messages;

/// Maximum comment length, in characters
pub const MAX_COMMENT_LENGTH: usize = 2000;

#[derive(Debug)]
struct ThreadState {
    content_id: Uuid,
    generation: u64,
    comments: Vec<Comment>,
    loading: bool,
}

fn find_mut(comments: &mut [Comment], comment_id: Uuid) -> Option<&mut Comment> {
    for comment in comments.iter_mut() {
        if comment.id == comment_id {
            return Some(comment);
        }
        if let Some(reply) = comment.replies.iter_mut().find(|r| r.id == comment_id) {
            return Some(reply);
        }
    }
    None
}

fn find<'a>(comments: &'a [Comment], comment_id: Uuid) -> Option<&'a Comment> {
    comments.iter().find_map(|comment| {
        if comment.id == comment_id {
            Some(comment)
        } else {
            comment.replies.iter().find(|r| r.id == comment_id)
        }
    })
}

/// Remove a comment from whichever level holds it
fn remove(comments: &mut Vec<Comment>, comment_id: Uuid) -> bool {
    let before = comments.len();
    comments.retain(|c| c.id != comment_id);
    if comments.len() != before {
        return true;
    }

    for comment in comments.iter_mut() {
        let before = comment.replies.len();
        comment.replies.retain(|r| r.id != comment_id);
        if comment.replies.len() != before {
            return true;
        }
    }
    false
}

pub struct CommentRepository {
    ctx: DebriefContext,
    state: RwLock<ThreadState>,
}

impl CommentRepository {
    pub fn new(ctx: DebriefContext, content_id: Uuid) -> Self {
        Self {
            ctx,
            state: RwLock::new(ThreadState {
                content_id,
                generation: 0,
                comments: Vec::new(),
                loading: false,
            }),
        }
    }

    pub fn content_id(&self) -> Uuid {
        self.state.read().content_id
    }

    /// Top-level comments, each with its replies
    pub fn comments(&self) -> Vec<Comment> {
        self.state.read().comments.clone()
    }

    pub fn comment(&self, comment_id: Uuid) -> Option<Comment> {
        find(&self.state.read().comments, comment_id).cloned()
    }

    pub fn is_loading(&self) -> bool {
        self.state.read().loading
    }

    /// Top-level comments plus all their replies
    pub fn total_count(&self) -> usize {
        self.state
            .read()
            .comments
            .iter()
            .map(|c| 1 + c.replies.len())
            .sum()
    }

    /// Point the repository at another debriefing and load its thread
    pub async fn switch_to(&self, content_id: Uuid) -> DebriefResult<LoadOutcome> {
        {
            let mut state = self.state.write();
            if state.content_id != content_id {
                state.content_id = content_id;
                state.comments.clear();
            }
        }
        self.load().await
    }

    pub async fn load(&self) -> DebriefResult<LoadOutcome> {
        let (content_id, generation) = {
            let mut state = self.state.write();
            state.generation += 1;
            state.loading = true;
            (state.content_id, state.generation)
        };
        let viewer = self.ctx.identity.current_viewer();
        let store = self.ctx.store.as_ref();

        let result = match store.list_comments(content_id).await {
            Ok(rows) => enrich_comments(store, viewer, rows).await,
            Err(err) => Err(err),
        };

        let mut state = self.state.write();
        if state.generation != generation {
            debug!(content_id = %content_id, generation, "discarding superseded comment load");
            return Ok(LoadOutcome::Superseded);
        }
        state.loading = false;

        match result {
            Ok(comments) => {
                state.comments = comments;
                let total = state
                    .comments
                    .iter()
                    .map(|c| 1 + c.replies.len())
                    .sum::<usize>();
                drop(state);
                debug!(content_id = %content_id, total, "comments loaded");
                Ok(LoadOutcome::Loaded(total))
            }
            Err(err) => {
                drop(state);
                let err = DebriefError::from(err);
                self.ctx
                    .report("load_comments", &err, messages::COMMENTS_LOAD_FAILED);
                Err(err)
            }
        }
    }

    /// Post a comment, or a reply when `parent_id` is given.
    pub async fn add(&self, body: &str, parent_id: Option<Uuid>) -> DebriefResult<Comment> {
        let result = self.try_add(body, parent_id).await;
        match &result {
            Ok(comment) => {
                info!(comment_id = %comment.id, reply = comment.is_reply(), "comment added");
                self.ctx.success(messages::COMMENT_ADDED);
            }
            Err(err) => self
                .ctx
                .report("add_comment", err, messages::COMMENT_ADD_FAILED),
        }
        result
    }

    async fn try_add(&self, body: &str, parent_id: Option<Uuid>) -> DebriefResult<Comment> {
        let viewer = self
            .ctx
            .identity
            .current_viewer()
            .ok_or(DebriefError::AuthRequired)?;

        let body = body.trim();
        if body.is_empty() {
            return Err(DebriefError::InvalidInput("comment body is empty".into()));
        }
        if body.chars().count() > MAX_COMMENT_LENGTH {
            return Err(DebriefError::InvalidInput(format!(
                "comment exceeds {} characters",
                MAX_COMMENT_LENGTH
            )));
        }

        let (content_id, parent_id) = {
            let state = self.state.read();
            let parent_id = match parent_id {
                None => None,
                Some(id) => match find(&state.comments, id) {
                    Some(parent) => Some(parent.parent_id.unwrap_or(parent.id)),
                    None => {
                        return Err(DebriefError::InvalidInput(format!(
                            "parent comment {} is not part of this thread",
                            id
                        )))
                    }
                },
            };
            (state.content_id, parent_id)
        };

        let row = self
            .ctx
            .store
            .insert_comment(NewCommentRow {
                content_id,
                author_id: viewer,
                body: body.to_string(),
                parent_id,
            })
            .await?;

        let author_name = viewer_display_name(self.ctx.store.as_ref(), viewer).await;
        let comment = Comment::from_row(row, author_name, false);

        let mut state = self.state.write();
        if state.content_id != content_id {
            return Ok(comment);
        }
        match parent_id {
            None => state.comments.push(comment.clone()),
            Some(parent_id) => match state.comments.iter_mut().find(|c| c.id == parent_id) {
                Some(parent) => parent.replies.push(comment.clone()),
                None => debug!(
                    parent_id = %parent_id,
                    "parent left the thread before reply landed"
                ),
            },
        }
        Ok(comment)
    }

    /// Toggle the viewer's like on a comment or reply of this thread.
    pub async fn like(&self, comment_id: Uuid) -> DebriefResult<LikeState> {
        let result = self.try_like(comment_id).await;
        if let Err(err) = &result {
            self.ctx
                .report("like_comment", err, messages::COMMENT_LIKE_FAILED);
        }
        result
    }

    async fn try_like(&self, comment_id: Uuid) -> DebriefResult<LikeState> {
        let viewer = self
            .ctx
            .identity
            .current_viewer()
            .ok_or(DebriefError::AuthRequired)?;
        let was_liked = self
            .comment(comment_id)
            .map(|c| c.is_liked)
            .ok_or(DebriefError::NotFound(comment_id))?;

        let like_count = if was_liked {
            self.ctx.store.delete_comment_like(comment_id, viewer).await?
        } else {
            self.ctx.store.insert_comment_like(comment_id, viewer).await?
        };
        let like = LikeState {
            liked: !was_liked,
            like_count,
        };

        let mut state = self.state.write();
        if let Some(comment) = find_mut(&mut state.comments, comment_id) {
            comment.is_liked = like.liked;
            comment.like_count = like.like_count;
        }
        Ok(like)
    }

    /// Delete one of the viewer's own comments; a top-level comment takes
    /// its replies with it.
    pub async fn delete(&self, comment_id: Uuid) -> DebriefResult<()> {
        let result = self.try_delete(comment_id).await;
        match &result {
            Ok(()) => {
                info!(comment_id = %comment_id, "comment deleted");
                self.ctx.success(messages::COMMENT_DELETED);
            }
            Err(err) => self
                .ctx
                .report("delete_comment", err, messages::COMMENT_DELETE_FAILED),
        }
        result
    }

    async fn try_delete(&self, comment_id: Uuid) -> DebriefResult<()> {
        let viewer = self
            .ctx
            .identity
            .current_viewer()
            .ok_or(DebriefError::AuthRequired)?;

        let affected = self.ctx.store.delete_comment(comment_id, viewer).await?;
        if affected == 0 {
            return Err(DebriefError::OwnershipRejected(comment_id));
        }

        remove(&mut self.state.write().comments, comment_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CommentRow, UNKNOWN_AUTHOR_NAME};
    use chrono::Utc;

    fn comment(parent_id: Option<Uuid>) -> Comment {
        Comment::from_row(
            CommentRow {
                id: Uuid::new_v4(),
                content_id: Uuid::nil(),
                author_id: Uuid::nil(),
                body: "text".into(),
                parent_id,
                like_count: 0,
                created_at: Utc::now(),
            },
            UNKNOWN_AUTHOR_NAME.into(),
            false,
        )
    }

    #[test]
    fn test_find_and_remove_across_levels() {
        let mut parent = comment(None);
        let reply = comment(Some(parent.id));
        let reply_id = reply.id;
        parent.replies.push(reply);
        let other = comment(None);
        let mut thread = vec![parent, other.clone()];

        assert!(find(&thread, reply_id).is_some());
        find_mut(&mut thread, reply_id).unwrap().like_count = 5;
        assert_eq!(find(&thread, reply_id).unwrap().like_count, 5);

        assert!(remove(&mut thread, reply_id));
        assert!(thread[0].replies.is_empty());
        assert!(remove(&mut thread, other.id));
        assert_eq!(thread.len(), 1);
        assert!(!remove(&mut thread, Uuid::new_v4()));
    }
}
