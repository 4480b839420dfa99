//! User-facing notices (toasts).
//!
//! Repositories report every write outcome and every failure here; the
//! surface showing them is not part of this crate.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Localized notice texts
pub mod messages {
    pub const AUTH_REQUIRED: &str = "Vous devez être connecté pour effectuer cette action";
    pub const CHANNEL_REQUIRED: &str = "Veuillez sélectionner un canal";
    pub const INVALID_INPUT: &str = "Certains champs sont invalides";

    pub const CONTENT_LOAD_FAILED: &str = "Impossible de charger les debriefings";
    pub const CONTENT_PUBLISHED: &str = "Debriefing publié avec succès";
    pub const CONTENT_PUBLISH_FAILED: &str = "Impossible de publier le debriefing";
    pub const CONTENT_LIKE_FAILED: &str = "Impossible de mettre à jour le like";
    pub const CONTENT_DELETED: &str = "Debriefing supprimé";
    pub const CONTENT_DELETE_FAILED: &str = "Impossible de supprimer le debriefing";

    pub const COMMENTS_LOAD_FAILED: &str = "Impossible de charger les commentaires";
    pub const COMMENT_ADDED: &str = "Commentaire ajouté";
    pub const COMMENT_ADD_FAILED: &str = "Impossible d'ajouter le commentaire";
    pub const COMMENT_LIKE_FAILED: &str = "Impossible de mettre à jour le like du commentaire";
    pub const COMMENT_DELETED: &str = "Commentaire supprimé";
    pub const COMMENT_DELETE_FAILED: &str = "Impossible de supprimer le commentaire";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoticeLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Fire-and-forget notice surface
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Notifier that only writes notices to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => info!(message = %notice.message, "notice"),
            NoticeLevel::Error => warn!(message = %notice.message, "notice"),
        }
    }
}

/// Notifier that keeps every notice, for hosts that render them later and
/// for tests.
#[derive(Debug, Default)]
pub struct NoticeLog {
    notices: Mutex<Vec<Notice>>,
}

impl NoticeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().clone()
    }

    pub fn last(&self) -> Option<Notice> {
        self.notices.lock().last().cloned()
    }

    pub fn errors(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .iter()
            .filter(|n| n.level == NoticeLevel::Error)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.notices.lock().clear();
    }
}

impl Notifier for NoticeLog {
    fn notify(&self, notice: Notice) {
        self.notices.lock().push(notice);
    }
}
