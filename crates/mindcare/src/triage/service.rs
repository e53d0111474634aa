use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};

use super::assessment::{
    AnswerSet, AssessmentError, QuestionId, Questionnaire, ScoreResult, ScoringEngine,
};
use super::classifier::{ClassificationResult, Classifier};
use super::profile::TriageEngines;
use super::repository::{AlertPublisher, CrisisAlert, RepositoryError, SessionRepository};
use super::session::{
    AssessmentFlowError, AssessmentSession, AssessmentStep, ChatError, ChatMessage, ChatSession,
    PendingReply, SessionId,
};

/// Service composing the engines with the session repository and crisis alerts.
pub struct SupportService<R, A> {
    repository: Arc<R>,
    alerts: Arc<A>,
    engines: TriageEngines,
}

static CHAT_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static ASSESSMENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_chat_id() -> SessionId {
    let id = CHAT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    SessionId(format!("chat-{id:06}"))
}

fn next_assessment_id() -> SessionId {
    let id = ASSESSMENT_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    SessionId(format!("assessment-{id:06}"))
}

/// A user message paired with the reply it produced.
#[derive(Debug, Clone)]
pub struct ChatExchange {
    pub session_id: SessionId,
    pub user_message: ChatMessage,
    pub reply: ChatMessage,
    pub classification: ClassificationResult,
}

impl<R, A> SupportService<R, A>
where
    R: SessionRepository + 'static,
    A: AlertPublisher + 'static,
{
    pub fn new(repository: Arc<R>, alerts: Arc<A>, engines: TriageEngines) -> Self {
        Self {
            repository,
            alerts,
            engines,
        }
    }

    pub fn classifier(&self) -> &Classifier {
        &self.engines.classifier
    }

    pub fn questionnaire(&self) -> &Questionnaire {
        &self.engines.questionnaire
    }

    pub fn scoring(&self) -> &ScoringEngine {
        &self.engines.scoring
    }

    /// Stateless classification; no session is touched and no alert is raised.
    pub fn classify(&self, text: &str) -> ClassificationResult {
        self.engines.classifier.classify(text)
    }

    /// Stateless scoring against the configured questionnaire.
    pub fn score(&self, answers: &AnswerSet) -> Result<ScoreResult, AssessmentError> {
        self.engines
            .scoring
            .score(self.engines.questionnaire.questions(), answers)
    }

    pub fn is_complete(&self, answers: &AnswerSet) -> bool {
        self.engines
            .scoring
            .is_complete(self.engines.questionnaire.questions(), answers)
    }

    /// Open a conversation seeded with the greeting.
    pub fn start_chat(&self) -> Result<ChatSession, SupportServiceError> {
        let session = ChatSession::new(next_chat_id(), Utc::now());
        let stored = self.repository.insert_chat(session)?;
        info!(session_id = %stored.id(), "chat session started");
        Ok(stored)
    }

    pub fn chat(&self, session_id: &SessionId) -> Result<ChatSession, SupportServiceError> {
        let session = self
            .repository
            .fetch_chat(session_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(session)
    }

    /// Record the user's message; the reply is produced by [`Self::deliver_reply`].
    pub fn accept_message(
        &self,
        session_id: &SessionId,
        text: &str,
    ) -> Result<PendingReply, SupportServiceError> {
        let now = Utc::now();
        self.repository
            .modify_chat(session_id, |session| -> Result<_, SupportServiceError> {
                Ok(session.submit(text, now)?)
            })
    }

    pub fn deliver_reply(
        &self,
        session_id: &SessionId,
        pending: &PendingReply,
    ) -> Result<ChatExchange, SupportServiceError> {
        let classifier = &self.engines.classifier;
        let now = Utc::now();
        let (user_message, reply, classification) = self.repository.modify_chat(
            session_id,
            |session| -> Result<_, SupportServiceError> {
                let (reply, classification) = session.deliver(pending, classifier, now)?;
                let reply = reply.clone();
                let user_message = session
                    .message(pending.message_id)
                    .cloned()
                    .ok_or(ChatError::UnknownPendingReply(pending.message_id))?;
                Ok((user_message, reply, classification))
            },
        )?;

        if classification.is_crisis {
            self.raise_crisis_alert(session_id, &user_message, &classification);
        }

        Ok(ChatExchange {
            session_id: session_id.clone(),
            user_message,
            reply,
            classification,
        })
    }

    /// Accept and answer in one step, without any typing delay.
    pub fn send_message(
        &self,
        session_id: &SessionId,
        text: &str,
    ) -> Result<ChatExchange, SupportServiceError> {
        let pending = self.accept_message(session_id, text)?;
        self.deliver_reply(session_id, &pending)
    }

    pub fn start_assessment(&self) -> Result<AssessmentSession, SupportServiceError> {
        let session = AssessmentSession::new(
            next_assessment_id(),
            Arc::clone(&self.engines.questionnaire),
            Utc::now(),
        );
        let stored = self.repository.insert_assessment(session)?;
        info!(
            session_id = %stored.id(),
            questionnaire = stored.questionnaire().id(),
            "assessment started"
        );
        Ok(stored)
    }

    pub fn assessment(
        &self,
        session_id: &SessionId,
    ) -> Result<AssessmentSession, SupportServiceError> {
        let session = self
            .repository
            .fetch_assessment(session_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(session)
    }

    pub fn answer(
        &self,
        session_id: &SessionId,
        question_id: &QuestionId,
        value: u32,
    ) -> Result<AssessmentSession, SupportServiceError> {
        self.repository
            .modify_assessment(session_id, |session| -> Result<_, SupportServiceError> {
                session.answer(question_id, value)?;
                Ok(session.clone())
            })
    }

    pub fn advance(
        &self,
        session_id: &SessionId,
    ) -> Result<(AssessmentSession, AssessmentStep), SupportServiceError> {
        let scoring = &self.engines.scoring;
        let (session, step) = self.repository.modify_assessment(
            session_id,
            |session| -> Result<_, SupportServiceError> {
                let step = session.advance(scoring)?;
                Ok((session.clone(), step))
            },
        )?;

        if let AssessmentStep::Completed(result) = step {
            info!(
                session_id = %session_id,
                total = result.total,
                band = %result.band,
                recommend_to_seek_help = result.recommend_to_seek_help,
                "assessment completed"
            );
        }

        Ok((session, step))
    }

    pub fn restart_assessment(
        &self,
        session_id: &SessionId,
    ) -> Result<AssessmentSession, SupportServiceError> {
        let now = Utc::now();
        self.repository
            .modify_assessment(session_id, |session| -> Result<_, SupportServiceError> {
                session.restart(now);
                Ok(session.clone())
            })
    }

    // The reply has already been recorded; a failed alert must not take it away.
    fn raise_crisis_alert(
        &self,
        session_id: &SessionId,
        user_message: &ChatMessage,
        classification: &ClassificationResult,
    ) {
        warn!(
            session_id = %session_id,
            message_id = user_message.id,
            keyword = classification.matched_keyword.as_deref().unwrap_or_default(),
            "crisis language detected"
        );

        let alert = CrisisAlert {
            session_id: session_id.clone(),
            message_id: user_message.id,
            matched_keyword: classification.matched_keyword.clone(),
            raised_at: Utc::now(),
        };
        if let Err(err) = self.alerts.publish(alert) {
            error!(session_id = %session_id, error = %err, "failed to publish crisis alert");
        }
    }
}

/// Error raised by the support service.
#[derive(Debug, thiserror::Error)]
pub enum SupportServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Chat(#[from] ChatError),
    #[error(transparent)]
    Assessment(#[from] AssessmentFlowError),
}
