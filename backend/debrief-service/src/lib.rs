//! Data-access and synchronization layer for debriefings (short video
//! posts shared in a channel or publicly) and their comment threads.
//!
//! [`ContentRepository`] and [`CommentRepository`] keep an in-memory view of
//! the current scope in sync with a [`RelationalStore`], upload media through
//! a [`BlobStore`], read the viewer from an [`IdentityProvider`] and report
//! outcomes to a [`Notifier`].

pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod identity;
pub mod media;
pub mod notifier;
pub mod services;
pub mod store;
pub mod telemetry;

pub use config::Config;
pub use domain::{
    Audience, Comment, ContentItem, FeedScope, LikeState, LoadOutcome, NO_CHANNEL,
};
pub use error::{BlobError, DebriefError, DebriefResult, StoreError};
pub use identity::{IdentityProvider, SessionIdentity};
pub use media::{BlobStore, MediaUpload, MemoryBlobStore, S3BlobStore};
pub use notifier::{Notice, NoticeLevel, NoticeLog, Notifier, TracingNotifier};
pub use services::{
    CommentRepository, ContentRepository, DebriefContext, NewContent, PublishOptions,
};
pub use store::{MemoryStore, PgStore, RelationalStore};
