//! Batch enrichment of stored rows with display names and viewer likes.
//!
//! One names query and one likes query per result set, issued concurrently.

use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::{
    Comment, CommentRow, ContentItem, ContentRow, SELF_AUTHOR_NAME, UNKNOWN_AUTHOR_NAME,
};
use crate::error::StoreResult;
use crate::store::RelationalStore;

fn unique_ids(ids: impl Iterator<Item = Uuid>) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(*id)).collect()
}

fn name_or_fallback(names: &HashMap<Uuid, String>, user_id: Uuid) -> String {
    names
        .get(&user_id)
        .cloned()
        .unwrap_or_else(|| UNKNOWN_AUTHOR_NAME.to_string())
}

pub(crate) async fn enrich_content(
    store: &dyn RelationalStore,
    viewer: Option<Uuid>,
    mut rows: Vec<ContentRow>,
) -> StoreResult<Vec<ContentItem>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let creator_ids = unique_ids(rows.iter().map(|r| r.creator_id));
    let item_ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();

    let (names, liked) = tokio::try_join!(store.display_names(&creator_ids), async {
        match viewer {
            Some(viewer) => store.liked_content_ids(viewer, &item_ids).await,
            None => Ok(HashSet::new()),
        }
    })?;

    rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(rows
        .into_iter()
        .map(|row| {
            let name = name_or_fallback(&names, row.creator_id);
            let is_liked = liked.contains(&row.id);
            ContentItem::from_row(row, name, is_liked)
        })
        .collect())
}

pub(crate) async fn enrich_comments(
    store: &dyn RelationalStore,
    viewer: Option<Uuid>,
    rows: Vec<CommentRow>,
) -> StoreResult<Vec<Comment>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let author_ids = unique_ids(rows.iter().map(|r| r.author_id));
    let comment_ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();

    let (names, liked) = tokio::try_join!(store.display_names(&author_ids), async {
        match viewer {
            Some(viewer) => store.liked_comment_ids(viewer, &comment_ids).await,
            None => Ok(HashSet::new()),
        }
    })?;

    let comments = rows
        .into_iter()
        .map(|row| {
            let name = name_or_fallback(&names, row.author_id);
            let is_liked = liked.contains(&row.id);
            Comment::from_row(row, name, is_liked)
        })
        .collect();

    Ok(assemble_thread(comments))
}

/// Display name for content the viewer just created; a miss or a failed
/// lookup falls back to the "you" placeholder.
pub(crate) async fn viewer_display_name(store: &dyn RelationalStore, viewer: Uuid) -> String {
    match store.display_names(&[viewer]).await {
        Ok(mut names) => names
            .remove(&viewer)
            .unwrap_or_else(|| SELF_AUTHOR_NAME.to_string()),
        Err(err) => {
            warn!(user_id = %viewer, error = %err, "profile lookup failed");
            SELF_AUTHOR_NAME.to_string()
        }
    }
}

/// Attach replies to their top-level parent, oldest first at both levels.
/// Replies whose parent is not a top-level comment of the set are dropped.
pub(crate) fn assemble_thread(mut comments: Vec<Comment>) -> Vec<Comment> {
    comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));

    let (mut top_level, replies): (Vec<Comment>, Vec<Comment>) =
        comments.into_iter().partition(|c| c.parent_id.is_none());

    let index: HashMap<Uuid, usize> = top_level
        .iter()
        .enumerate()
        .map(|(i, c)| (c.id, i))
        .collect();

    for reply in replies {
        let slot = reply.parent_id.and_then(|parent| index.get(&parent).copied());
        match slot {
            Some(i) => top_level[i].replies.push(reply),
            None => debug!(comment_id = %reply.id, "dropping orphaned reply"),
        }
    }

    top_level
}
