pub mod comments;
pub mod content;
mod enrichment;

pub use comments::CommentRepository;
pub use content::{ContentRepository, NewContent, PublishOptions};

use anyhow::Context;
use s3_utils::S3Client;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::db;
use crate::error::DebriefError;
use crate::identity::IdentityProvider;
use crate::media::{BlobStore, S3BlobStore};
use crate::notifier::{Notice, Notifier};
use crate::store::{PgStore, RelationalStore};

/// Collaborators shared by the content and comment repositories
#[derive(Clone)]
pub struct DebriefContext {
    pub store: Arc<dyn RelationalStore>,
    pub media: Arc<dyn BlobStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub notifier: Arc<dyn Notifier>,
}

impl DebriefContext {
    pub fn new(
        store: Arc<dyn RelationalStore>,
        media: Arc<dyn BlobStore>,
        identity: Arc<dyn IdentityProvider>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            media,
            identity,
            notifier,
        }
    }

    /// Wire PostgreSQL and S3 backed collaborators from configuration
    pub async fn connect(
        config: &Config,
        identity: Arc<dyn IdentityProvider>,
        notifier: Arc<dyn Notifier>,
    ) -> anyhow::Result<Self> {
        let pool = db::create_pool(&config.database)
            .await
            .context("Failed to connect to database")?;
        if config.database.run_migrations {
            db::run_migrations(&pool)
                .await
                .context("Failed to run database migrations")?;
        }

        let s3 = S3Client::with_config(config.storage.clone()).await;
        info!(
            env = %config.app.env,
            bucket = %s3.config().bucket,
            "debrief context connected"
        );

        Ok(Self::new(
            Arc::new(PgStore::new(pool)),
            Arc::new(S3BlobStore::new(&s3)),
            identity,
            notifier,
        ))
    }

    /// Log a failed operation and surface it to the viewer
    pub(crate) fn report(
        &self,
        operation: &'static str,
        err: &DebriefError,
        fallback: &'static str,
    ) {
        if err.is_precondition() {
            warn!(operation, error = %err, "operation rejected");
        } else {
            error!(operation, error = %err, "operation failed");
        }
        self.notifier.notify(Notice::error(err.user_message(fallback)));
    }

    pub(crate) fn success(&self, message: &'static str) {
        self.notifier.notify(Notice::success(message));
    }
}
