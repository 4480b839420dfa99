use async_trait::async_trait;
use std::collections::HashSet;
use uuid::Uuid;

use super::{CommentStore, PgStore};
use crate::domain::{CommentRow, NewCommentRow};
use crate::error::StoreResult;

#[async_trait]
impl CommentStore for PgStore {
    async fn list_comments(&self, content_id: Uuid) -> StoreResult<Vec<CommentRow>> {
        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT id, content_id, author_id, body, parent_id, like_count, created_at
            FROM comments
            WHERE content_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(content_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn insert_comment(&self, new: NewCommentRow) -> StoreResult<CommentRow> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            INSERT INTO comments (content_id, author_id, body, parent_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, content_id, author_id, body, parent_id, like_count, created_at
            "#,
        )
        .bind(new.content_id)
        .bind(new.author_id)
        .bind(new.body)
        .bind(new.parent_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn delete_comment(&self, comment_id: Uuid, author_id: Uuid) -> StoreResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM comments
            WHERE id = $1 AND author_id = $2
            "#,
        )
        .bind(comment_id)
        .bind(author_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn insert_comment_like(&self, comment_id: Uuid, user_id: Uuid) -> StoreResult<i64> {
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO comment_likes (comment_id, user_id)
            VALUES ($1, $2)
            ON CONFLICT (comment_id, user_id) DO NOTHING
            "#,
        )
        .bind(comment_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let sql = if inserted > 0 {
            r#"
            UPDATE comments SET like_count = like_count + 1
            WHERE id = $1
            RETURNING like_count
            "#
        } else {
            r#"
            SELECT like_count FROM comments
            WHERE id = $1
            "#
        };

        let like_count: i64 = sqlx::query_scalar(sql)
            .bind(comment_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(like_count)
    }

    async fn delete_comment_like(&self, comment_id: Uuid, user_id: Uuid) -> StoreResult<i64> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query(
            r#"
            DELETE FROM comment_likes
            WHERE comment_id = $1 AND user_id = $2
            "#,
        )
        .bind(comment_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let sql = if removed > 0 {
            r#"
            UPDATE comments SET like_count = GREATEST(like_count - 1, 0)
            WHERE id = $1
            RETURNING like_count
            "#
        } else {
            r#"
            SELECT like_count FROM comments
            WHERE id = $1
            "#
        };

        let like_count: i64 = sqlx::query_scalar(sql)
            .bind(comment_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(like_count)
    }

    async fn liked_comment_ids(
        &self,
        user_id: Uuid,
        comment_ids: &[Uuid],
    ) -> StoreResult<HashSet<Uuid>> {
        if comment_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let liked: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT comment_id
            FROM comment_likes
            WHERE user_id = $1 AND comment_id = ANY($2)
            "#,
        )
        .bind(user_id)
        .bind(comment_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(liked.into_iter().collect())
    }
}
