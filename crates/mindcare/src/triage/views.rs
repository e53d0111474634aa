use serde::Serialize;

use super::assessment::{AnswerSet, Band, BandTable, Question, Questionnaire, ScoreResult};
use super::classifier::{Category, ClassificationResult};
use super::resources::{crisis_resources, dial_uri, CrisisResource, EMERGENCY_NUMBER};
use super::service::ChatExchange;
use super::session::{AssessmentSession, ChatMessage, ChatSession, SessionId};

/// Crisis affordance rendered next to a crisis reply.
#[derive(Debug, Clone, Serialize)]
pub struct CrisisSupportView {
    pub emergency_number: &'static str,
    pub emergency_dial_uri: String,
    pub resources: Vec<CrisisResourceView>,
}

impl CrisisSupportView {
    pub fn standard() -> Self {
        Self {
            emergency_number: EMERGENCY_NUMBER,
            emergency_dial_uri: dial_uri(EMERGENCY_NUMBER),
            resources: crisis_resources()
                .iter()
                .map(CrisisResourceView::from)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CrisisResourceView {
    #[serde(flatten)]
    pub resource: CrisisResource,
    pub dial_uri: String,
}

impl From<&CrisisResource> for CrisisResourceView {
    fn from(resource: &CrisisResource) -> Self {
        Self {
            resource: resource.clone(),
            dial_uri: resource.dial_uri(),
        }
    }
}

fn crisis_support_for(is_crisis: bool) -> Option<CrisisSupportView> {
    is_crisis.then(CrisisSupportView::standard)
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassificationView {
    pub category: Category,
    pub reply: String,
    pub is_crisis: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_keyword: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crisis_support: Option<CrisisSupportView>,
}

impl From<ClassificationResult> for ClassificationView {
    fn from(result: ClassificationResult) -> Self {
        Self {
            crisis_support: crisis_support_for(result.is_crisis),
            category: result.category,
            reply: result.reply,
            is_crisis: result.is_crisis,
            matched_keyword: result.matched_keyword,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatTranscriptView {
    pub session_id: SessionId,
    pub typing: bool,
    pub messages: Vec<ChatMessage>,
}

impl From<&ChatSession> for ChatTranscriptView {
    fn from(session: &ChatSession) -> Self {
        Self {
            session_id: session.id().clone(),
            typing: session.is_typing(),
            messages: session.messages().to_vec(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatReplyView {
    pub session_id: SessionId,
    pub user_message: ChatMessage,
    pub reply: ChatMessage,
    pub category: Category,
    pub is_crisis: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crisis_support: Option<CrisisSupportView>,
}

impl From<ChatExchange> for ChatReplyView {
    fn from(exchange: ChatExchange) -> Self {
        Self {
            crisis_support: crisis_support_for(exchange.classification.is_crisis),
            session_id: exchange.session_id,
            user_message: exchange.user_message,
            reply: exchange.reply,
            category: exchange.classification.category,
            is_crisis: exchange.classification.is_crisis,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreView {
    pub total: u32,
    pub max_total: u32,
    pub band: Band,
    pub label: &'static str,
    pub description: &'static str,
    pub recommend_to_seek_help: bool,
}

impl From<ScoreResult> for ScoreView {
    fn from(result: ScoreResult) -> Self {
        let interpretation = result.interpretation();
        Self {
            total: result.total,
            max_total: result.max_total,
            band: result.band,
            label: interpretation.label,
            description: interpretation.description,
            recommend_to_seek_help: result.recommend_to_seek_help,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AssessmentSessionView {
    pub session_id: SessionId,
    pub questionnaire_id: String,
    pub question_index: usize,
    pub question_count: usize,
    pub progress_percent: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_question: Option<Question>,
    pub answers: AnswerSet,
    pub can_advance: bool,
    pub is_last_question: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ScoreView>,
}

impl From<&AssessmentSession> for AssessmentSessionView {
    fn from(session: &AssessmentSession) -> Self {
        Self {
            session_id: session.id().clone(),
            questionnaire_id: session.questionnaire().id().to_string(),
            question_index: session.current_index(),
            question_count: session.questionnaire().len(),
            progress_percent: session.progress_percent(),
            current_question: session.current_question().cloned(),
            answers: session.answers().clone(),
            can_advance: session.can_advance(),
            is_last_question: session.is_last_question(),
            result: session.outcome().copied().map(ScoreView::from),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BandRangeView {
    pub band: Band,
    pub label: &'static str,
    pub min_total: u32,
    pub max_total: u32,
}

/// Questionnaire with the score ranges its bands cover.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionnaireView {
    #[serde(flatten)]
    pub questionnaire: Questionnaire,
    pub max_total: u32,
    pub bands: Vec<BandRangeView>,
}

impl QuestionnaireView {
    pub fn new(questionnaire: &Questionnaire, bands: &BandTable) -> Self {
        let max_total = questionnaire.max_total();
        let bands = bands
            .ranges(max_total)
            .into_iter()
            .map(|(band, range)| BandRangeView {
                band,
                label: band.label(),
                min_total: *range.start(),
                max_total: *range.end(),
            })
            .collect();
        Self {
            questionnaire: questionnaire.clone(),
            max_total,
            bands,
        }
    }
}
