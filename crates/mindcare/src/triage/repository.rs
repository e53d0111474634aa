use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::session::{AssessmentSession, ChatSession, SessionId};

/// Storage abstraction for caller-owned sessions so the service can be exercised in isolation.
///
/// `modify_*` must apply the change and store the result as one step per session. When the
/// change returns an error the stored session stays as it was.
pub trait SessionRepository: Send + Sync {
    fn insert_chat(&self, session: ChatSession) -> Result<ChatSession, RepositoryError>;
    fn modify_chat<T, E, F>(&self, id: &SessionId, change: F) -> Result<T, E>
    where
        F: FnOnce(&mut ChatSession) -> Result<T, E>,
        E: From<RepositoryError>;
    fn fetch_chat(&self, id: &SessionId) -> Result<Option<ChatSession>, RepositoryError>;

    fn insert_assessment(
        &self,
        session: AssessmentSession,
    ) -> Result<AssessmentSession, RepositoryError>;
    fn modify_assessment<T, E, F>(&self, id: &SessionId, change: F) -> Result<T, E>
    where
        F: FnOnce(&mut AssessmentSession) -> Result<T, E>,
        E: From<RepositoryError>;
    fn fetch_assessment(
        &self,
        id: &SessionId,
    ) -> Result<Option<AssessmentSession>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("session already exists")]
    Conflict,
    #[error("session not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Outbound hook notified whenever a message is classified as a crisis.
pub trait AlertPublisher: Send + Sync {
    fn publish(&self, alert: CrisisAlert) -> Result<(), AlertError>;
}

/// Crisis notification. Carries identifiers only, never the message text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrisisAlert {
    pub session_id: SessionId,
    pub message_id: u64,
    pub matched_keyword: Option<String>,
    pub raised_at: DateTime<Utc>,
}

/// Alert dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    #[error("alert transport unavailable: {0}")]
    Transport(String),
}
