//! Keyword triage for free-text messages and questionnaire scoring.
//!
//! [`Classifier`] and [`ScoringEngine`] are pure and shareable across threads. Session
//! state ([`ChatSession`], [`AssessmentSession`]) is owned by the caller; the
//! [`SupportService`] persists it through a [`SessionRepository`] and raises a
//! [`CrisisAlert`] whenever a message is classified as a crisis.

pub mod assessment;
pub mod classifier;
pub mod profile;
pub mod repository;
pub mod resources;
pub mod router;
pub mod service;
pub mod session;
pub mod views;

#[cfg(test)]
mod tests;

pub use assessment::{
    AnswerOption, AnswerSet, AssessmentError, Band, BandTable, BandTableError, BandThreshold,
    Interpretation, Question, QuestionId, Questionnaire, QuestionnaireError, ScoreResult,
    ScoringEngine,
};
pub use classifier::{
    Category, ClassificationResult, Classifier, ClassifierConfig, RuleConfig, RuleSet,
    RuleSetError,
};
pub use profile::{ProfileError, TriageEngines, TriageProfile};
pub use repository::{
    AlertError, AlertPublisher, CrisisAlert, RepositoryError, SessionRepository,
};
pub use resources::{crisis_resources, CrisisResource, ResourceKind, EMERGENCY_NUMBER};
pub use router::support_router;
pub use service::{ChatExchange, SupportService, SupportServiceError};
pub use session::{
    AssessmentFlowError, AssessmentSession, AssessmentStep, ChatError, ChatMessage, ChatSession,
    MessageKind, PendingReply, Sender, SessionId,
};
