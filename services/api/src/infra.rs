use metrics_exporter_prometheus::PrometheusHandle;
use mindcare::config::{QuestionnaireChoice, TriageConfig};
use mindcare::error::AppError;
use mindcare::triage::{
    AlertError, AlertPublisher, AssessmentSession, BandTable, ChatSession, CrisisAlert,
    QuestionId, Questionnaire, RepositoryError, ScoringEngine, SessionId, SessionRepository,
    TriageEngines, TriageProfile,
};
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::warn;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable("session store lock poisoned".to_string()))
}

#[derive(Default, Clone)]
pub(crate) struct InMemorySessionRepository {
    chats: Arc<Mutex<HashMap<SessionId, ChatSession>>>,
    assessments: Arc<Mutex<HashMap<SessionId, AssessmentSession>>>,
}

impl SessionRepository for InMemorySessionRepository {
    fn insert_chat(&self, session: ChatSession) -> Result<ChatSession, RepositoryError> {
        let mut guard = lock(&self.chats)?;
        if guard.contains_key(session.id()) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(session.id().clone(), session.clone());
        Ok(session)
    }

    fn modify_chat<T, E, F>(&self, id: &SessionId, change: F) -> Result<T, E>
    where
        F: FnOnce(&mut ChatSession) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        let mut guard = lock(&self.chats)?;
        let stored = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        let mut draft = stored.clone();
        let value = change(&mut draft)?;
        *stored = draft;
        Ok(value)
    }

    fn fetch_chat(&self, id: &SessionId) -> Result<Option<ChatSession>, RepositoryError> {
        Ok(lock(&self.chats)?.get(id).cloned())
    }

    fn insert_assessment(
        &self,
        session: AssessmentSession,
    ) -> Result<AssessmentSession, RepositoryError> {
        let mut guard = lock(&self.assessments)?;
        if guard.contains_key(session.id()) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(session.id().clone(), session.clone());
        Ok(session)
    }

    fn modify_assessment<T, E, F>(&self, id: &SessionId, change: F) -> Result<T, E>
    where
        F: FnOnce(&mut AssessmentSession) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        let mut guard = lock(&self.assessments)?;
        let stored = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        let mut draft = stored.clone();
        let value = change(&mut draft)?;
        *stored = draft;
        Ok(value)
    }

    fn fetch_assessment(
        &self,
        id: &SessionId,
    ) -> Result<Option<AssessmentSession>, RepositoryError> {
        Ok(lock(&self.assessments)?.get(id).cloned())
    }
}

/// Keeps crisis alerts in memory and logs each one; stands in for a paging integration.
#[derive(Default, Clone)]
pub(crate) struct InMemoryAlertPublisher {
    events: Arc<Mutex<Vec<CrisisAlert>>>,
}

impl AlertPublisher for InMemoryAlertPublisher {
    fn publish(&self, alert: CrisisAlert) -> Result<(), AlertError> {
        warn!(
            session_id = %alert.session_id,
            message_id = alert.message_id,
            "crisis alert recorded"
        );
        let mut guard = self
            .events
            .lock()
            .map_err(|_| AlertError::Transport("alert log lock poisoned".to_string()))?;
        guard.push(alert);
        Ok(())
    }
}

impl InMemoryAlertPublisher {
    pub(crate) fn events(&self) -> Vec<CrisisAlert> {
        self.events
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

/// Engines for the configured profile. An explicit full PHQ-9 choice replaces whatever
/// questionnaire the profile carries, and scores it on the standard PHQ-9 bands.
pub(crate) fn load_engines(config: &TriageConfig) -> Result<TriageEngines, AppError> {
    let (engines, profile_bands) = match &config.profile_path {
        Some(path) => {
            let profile = TriageProfile::from_path(path)?;
            let engines = profile.engines()?;
            (engines, Some(profile.bands))
        }
        None => (TriageEngines::standard(), None),
    };

    if config.questionnaire == QuestionnaireChoice::Screener {
        return Ok(engines);
    }

    let mut engines = engines.with_questionnaire(Questionnaire::phq9());
    let standard = BandTable::standard();
    if profile_bands.is_some_and(|bands| bands != standard) {
        warn!(
            questionnaire = engines.questionnaire.id(),
            "profile bands ignored for the full PHQ-9; using the standard cutoffs"
        );
    }
    engines.scoring = ScoringEngine::new(standard);
    Ok(engines)
}

/// Parses `q1=2` style answers given on the command line.
pub(crate) fn parse_answer(raw: &str) -> Result<(QuestionId, u32), String> {
    let (id, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected QUESTION=VALUE, got '{raw}'"))?;
    let id = id.trim();
    if id.is_empty() {
        return Err(format!("missing question id in '{raw}'"));
    }
    let value = value
        .trim()
        .parse::<u32>()
        .map_err(|err| format!("failed to parse answer value in '{raw}' ({err})"))?;
    Ok((QuestionId::from(id), value))
}
