use async_trait::async_trait;
use std::collections::HashSet;
use uuid::Uuid;

use super::{ContentStore, PgStore};
use crate::domain::{ContentRow, NewContentRow};
use crate::error::StoreResult;

const CONTENT_COLUMNS: &str = r#"
    ci.id, ci.title, ci.description, ci.video_url, ci.thumbnail_url, ci.link_url,
    ci.creator_id, ci.like_count, ci.view_count,
    (SELECT COUNT(*) FROM comments c WHERE c.content_id = ci.id) AS comment_count,
    ci.created_at, ci.channel_id, ci.is_public
"#;

#[async_trait]
impl ContentStore for PgStore {
    async fn list_channel_content(&self, channel_id: Uuid) -> StoreResult<Vec<ContentRow>> {
        let query = format!(
            r#"
            SELECT {}
            FROM content_items ci
            WHERE ci.channel_id = $1
            ORDER BY ci.created_at DESC
            "#,
            CONTENT_COLUMNS
        );

        let rows = sqlx::query_as::<_, ContentRow>(&query)
            .bind(channel_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn list_public_content(&self) -> StoreResult<Vec<ContentRow>> {
        let query = format!(
            r#"
            SELECT {}
            FROM content_items ci
            WHERE ci.is_public = TRUE
            ORDER BY ci.created_at DESC
            "#,
            CONTENT_COLUMNS
        );

        let rows = sqlx::query_as::<_, ContentRow>(&query)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    async fn insert_content(&self, new: NewContentRow) -> StoreResult<ContentRow> {
        let row = sqlx::query_as::<_, ContentRow>(
            r#"
            INSERT INTO content_items
                (title, description, video_url, thumbnail_url, link_url,
                 creator_id, like_count, view_count, channel_id, is_public)
            VALUES ($1, $2, $3, $4, $5, $6, 0, 0, $7, $8)
            RETURNING id, title, description, video_url, thumbnail_url, link_url,
                      creator_id, like_count, view_count, 0::int8 AS comment_count,
                      created_at, channel_id, is_public
            "#,
        )
        .bind(new.title)
        .bind(new.description)
        .bind(new.video_url)
        .bind(new.thumbnail_url)
        .bind(new.link_url)
        .bind(new.creator_id)
        .bind(new.channel_id)
        .bind(new.is_public)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn delete_content(&self, content_id: Uuid, creator_id: Uuid) -> StoreResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM content_items
            WHERE id = $1 AND creator_id = $2
            "#,
        )
        .bind(content_id)
        .bind(creator_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn insert_content_like(&self, content_id: Uuid, user_id: Uuid) -> StoreResult<i64> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO content_likes (content_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (content_id, user_id) DO NOTHING
            "#,
        )
        .bind(content_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let sql = if inserted > 0 {
            r#"
            UPDATE content_items SET like_count = like_count + 1
            WHERE id = $1
            RETURNING like_count
            "#
        } else {
            r#"
            SELECT like_count FROM content_items
            WHERE id = $1
            "#
        };

        let like_count: i64 = sqlx::query_scalar(sql)
            .bind(content_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(like_count)
    }

    async fn delete_content_like(&self, content_id: Uuid, user_id: Uuid) -> StoreResult<i64> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query(
            r#"
            DELETE FROM content_likes
            WHERE content_id = $1 AND user_id = $2
            "#,
        )
        .bind(content_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let sql = if removed > 0 {
            r#"
            UPDATE content_items SET like_count = GREATEST(like_count - 1, 0)
            WHERE id = $1
            RETURNING like_count
            "#
        } else {
            r#"
            SELECT like_count FROM content_items
            WHERE id = $1
            "#
        };

        let like_count: i64 = sqlx::query_scalar(sql)
            .bind(content_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(like_count)
    }

    async fn liked_content_ids(
        &self,
        user_id: Uuid,
        content_ids: &[Uuid],
    ) -> StoreResult<HashSet<Uuid>> {
        if content_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let liked: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT content_id
            FROM content_likes
            WHERE user_id = $1 AND content_id = ANY($2)
            "#,
        )
        .bind(user_id)
        .bind(content_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(liked.into_iter().collect())
    }
}
