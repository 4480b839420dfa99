use async_trait::async_trait;
use std::collections::HashMap;
use uuid::Uuid;

use super::{PgStore, ProfileStore};
use crate::domain::Profile;
use crate::error::StoreResult;

#[async_trait]
impl ProfileStore for PgStore {
    async fn display_names(&self, user_ids: &[Uuid]) -> StoreResult<HashMap<Uuid, String>> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let profiles = sqlx::query_as::<_, Profile>(
            r#"
            SELECT id, display_name
            FROM profiles
            WHERE id = ANY($1)
            "#,
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(profiles
            .into_iter()
            .map(|p| (p.id, p.display_name))
            .collect())
    }
}
