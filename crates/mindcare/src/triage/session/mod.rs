//! Caller-owned conversation and questionnaire state.
//!
//! The engines never hold these; they receive snapshots (the pending text, the answer set)
//! and return fresh results.

mod assessment;
mod chat;

pub use assessment::{AssessmentFlowError, AssessmentSession, AssessmentStep};
pub use chat::{ChatError, ChatMessage, ChatSession, MessageKind, PendingReply, Sender, GREETING};

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
