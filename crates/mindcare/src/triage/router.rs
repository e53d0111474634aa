use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::assessment::{AnswerSet, AssessmentError, QuestionId};
use super::repository::{AlertPublisher, RepositoryError, SessionRepository};
use super::resources::crisis_resources;
use super::service::{SupportService, SupportServiceError};
use super::session::{AssessmentFlowError, ChatError, SessionId};
use super::views::{
    AssessmentSessionView, ChatReplyView, ChatTranscriptView, ClassificationView,
    CrisisResourceView, QuestionnaireView, ScoreView,
};

/// Shared handler state: the service plus the pause between accepting a message and replying.
pub struct SupportState<R, A> {
    pub service: Arc<SupportService<R, A>>,
    pub typing_delay: Duration,
}

impl<R, A> Clone for SupportState<R, A> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            typing_delay: self.typing_delay,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    pub answers: AnswerSet,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub question_id: QuestionId,
    pub value: u32,
}

/// Router builder exposing the chat, triage and assessment endpoints.
pub fn support_router<R, A>(service: Arc<SupportService<R, A>>, typing_delay: Duration) -> Router
where
    R: SessionRepository + 'static,
    A: AlertPublisher + 'static,
{
    Router::new()
        .route("/api/v1/triage/classify", post(classify_handler::<R, A>))
        .route("/api/v1/chat/sessions", post(start_chat_handler::<R, A>))
        .route(
            "/api/v1/chat/sessions/:session_id",
            get(chat_transcript_handler::<R, A>),
        )
        .route(
            "/api/v1/chat/sessions/:session_id/messages",
            post(send_message_handler::<R, A>),
        )
        .route(
            "/api/v1/assessments/questionnaire",
            get(questionnaire_handler::<R, A>),
        )
        .route("/api/v1/assessments/score", post(score_handler::<R, A>))
        .route(
            "/api/v1/assessments/sessions",
            post(start_assessment_handler::<R, A>),
        )
        .route(
            "/api/v1/assessments/sessions/:session_id",
            get(assessment_handler::<R, A>),
        )
        .route(
            "/api/v1/assessments/sessions/:session_id/answers",
            put(answer_handler::<R, A>),
        )
        .route(
            "/api/v1/assessments/sessions/:session_id/advance",
            post(advance_handler::<R, A>),
        )
        .route(
            "/api/v1/assessments/sessions/:session_id/restart",
            post(restart_handler::<R, A>),
        )
        .route("/api/v1/resources/crisis", get(crisis_resources_handler))
        .with_state(SupportState {
            service,
            typing_delay,
        })
}

pub(crate) async fn classify_handler<R, A>(
    State(state): State<SupportState<R, A>>,
    Json(request): Json<TextRequest>,
) -> Response
where
    R: SessionRepository + 'static,
    A: AlertPublisher + 'static,
{
    let view = ClassificationView::from(state.service.classify(&request.text));
    (StatusCode::OK, Json(view)).into_response()
}

pub(crate) async fn start_chat_handler<R, A>(State(state): State<SupportState<R, A>>) -> Response
where
    R: SessionRepository + 'static,
    A: AlertPublisher + 'static,
{
    match state.service.start_chat() {
        Ok(session) => {
            let view = ChatTranscriptView::from(&session);
            (StatusCode::CREATED, Json(view)).into_response()
        }
        Err(err) => service_error_response(err),
    }
}

pub(crate) async fn chat_transcript_handler<R, A>(
    State(state): State<SupportState<R, A>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
    A: AlertPublisher + 'static,
{
    match state.service.chat(&SessionId(session_id)) {
        Ok(session) => (StatusCode::OK, Json(ChatTranscriptView::from(&session))).into_response(),
        Err(err) => service_error_response(err),
    }
}

pub(crate) async fn send_message_handler<R, A>(
    State(state): State<SupportState<R, A>>,
    Path(session_id): Path<String>,
    Json(request): Json<TextRequest>,
) -> Response
where
    R: SessionRepository + 'static,
    A: AlertPublisher + 'static,
{
    let id = SessionId(session_id);
    let service = Arc::clone(&state.service);
    let typing_delay = state.typing_delay;

    // The exchange runs detached so a dropped request still gets its reply delivered.
    let exchange = tokio::spawn(async move {
        let pending = service.accept_message(&id, &request.text)?;
        if !typing_delay.is_zero() {
            tokio::time::sleep(typing_delay).await;
        }
        service.deliver_reply(&id, &pending)
    });

    match exchange.await {
        Ok(Ok(exchange)) => (StatusCode::OK, Json(ChatReplyView::from(exchange))).into_response(),
        Ok(Err(err)) => service_error_response(err),
        Err(join_error) => {
            tracing::error!(error = %join_error, "chat exchange task failed");
            let payload = json!({ "error": "reply could not be delivered" });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn questionnaire_handler<R, A>(State(state): State<SupportState<R, A>>) -> Response
where
    R: SessionRepository + 'static,
    A: AlertPublisher + 'static,
{
    let service = &state.service;
    let view = QuestionnaireView::new(service.questionnaire(), service.scoring().bands());
    (StatusCode::OK, Json(view)).into_response()
}

pub(crate) async fn score_handler<R, A>(
    State(state): State<SupportState<R, A>>,
    Json(request): Json<ScoreRequest>,
) -> Response
where
    R: SessionRepository + 'static,
    A: AlertPublisher + 'static,
{
    match state.service.score(&request.answers) {
        Ok(result) => (StatusCode::OK, Json(ScoreView::from(result))).into_response(),
        Err(err) => assessment_error_response(&err),
    }
}

pub(crate) async fn start_assessment_handler<R, A>(
    State(state): State<SupportState<R, A>>,
) -> Response
where
    R: SessionRepository + 'static,
    A: AlertPublisher + 'static,
{
    match state.service.start_assessment() {
        Ok(session) => {
            let view = AssessmentSessionView::from(&session);
            (StatusCode::CREATED, Json(view)).into_response()
        }
        Err(err) => service_error_response(err),
    }
}

pub(crate) async fn assessment_handler<R, A>(
    State(state): State<SupportState<R, A>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
    A: AlertPublisher + 'static,
{
    match state.service.assessment(&SessionId(session_id)) {
        Ok(session) => {
            (StatusCode::OK, Json(AssessmentSessionView::from(&session))).into_response()
        }
        Err(err) => service_error_response(err),
    }
}

pub(crate) async fn answer_handler<R, A>(
    State(state): State<SupportState<R, A>>,
    Path(session_id): Path<String>,
    Json(request): Json<AnswerRequest>,
) -> Response
where
    R: SessionRepository + 'static,
    A: AlertPublisher + 'static,
{
    match state
        .service
        .answer(&SessionId(session_id), &request.question_id, request.value)
    {
        Ok(session) => {
            (StatusCode::OK, Json(AssessmentSessionView::from(&session))).into_response()
        }
        Err(err) => service_error_response(err),
    }
}

pub(crate) async fn advance_handler<R, A>(
    State(state): State<SupportState<R, A>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
    A: AlertPublisher + 'static,
{
    match state.service.advance(&SessionId(session_id)) {
        Ok((session, _)) => {
            (StatusCode::OK, Json(AssessmentSessionView::from(&session))).into_response()
        }
        Err(err) => service_error_response(err),
    }
}

pub(crate) async fn restart_handler<R, A>(
    State(state): State<SupportState<R, A>>,
    Path(session_id): Path<String>,
) -> Response
where
    R: SessionRepository + 'static,
    A: AlertPublisher + 'static,
{
    match state.service.restart_assessment(&SessionId(session_id)) {
        Ok(session) => {
            (StatusCode::OK, Json(AssessmentSessionView::from(&session))).into_response()
        }
        Err(err) => service_error_response(err),
    }
}

pub(crate) async fn crisis_resources_handler() -> Response {
    let resources: Vec<CrisisResourceView> = crisis_resources()
        .iter()
        .map(CrisisResourceView::from)
        .collect();
    (StatusCode::OK, Json(json!({ "resources": resources }))).into_response()
}

fn assessment_error_response(error: &AssessmentError) -> Response {
    let payload = json!({
        "error": error.to_string(),
        "kind": error.kind(),
    });
    (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response()
}

fn service_error_response(error: SupportServiceError) -> Response {
    let status = match &error {
        SupportServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        SupportServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        SupportServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        SupportServiceError::Chat(ChatError::EmptyMessage) => StatusCode::UNPROCESSABLE_ENTITY,
        SupportServiceError::Chat(ChatError::ReplyPending)
        | SupportServiceError::Chat(ChatError::UnknownPendingReply(_)) => StatusCode::CONFLICT,
        SupportServiceError::Assessment(AssessmentFlowError::AlreadyCompleted) => {
            StatusCode::CONFLICT
        }
        SupportServiceError::Assessment(AssessmentFlowError::Answers(answers)) => {
            return assessment_error_response(answers);
        }
    };

    let payload = json!({
        "error": error.to_string(),
    });
    (status, Json(payload)).into_response()
}
