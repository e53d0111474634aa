use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use axum::response::Response;
use serde_json::Value;

use crate::triage::repository::{
    AlertError, AlertPublisher, CrisisAlert, RepositoryError, SessionRepository,
};
use crate::triage::session::{AssessmentSession, ChatSession, SessionId};
use crate::triage::{support_router, AnswerSet, Classifier, SupportService, TriageEngines};

pub(super) fn classifier() -> Classifier {
    Classifier::standard()
}

pub(super) fn answers(values: &[(&str, u32)]) -> AnswerSet {
    values.iter().map(|(id, value)| (*id, *value)).collect()
}

pub(super) fn build_service() -> (
    SupportService<MemorySessions, MemoryAlerts>,
    Arc<MemorySessions>,
    Arc<MemoryAlerts>,
) {
    let repository = Arc::new(MemorySessions::default());
    let alerts = Arc::new(MemoryAlerts::default());
    let service = SupportService::new(repository.clone(), alerts.clone(), TriageEngines::standard());
    (service, repository, alerts)
}

#[derive(Default, Clone)]
pub(super) struct MemorySessions {
    chats: Arc<Mutex<HashMap<SessionId, ChatSession>>>,
    assessments: Arc<Mutex<HashMap<SessionId, AssessmentSession>>>,
    write_delay: Duration,
}

impl MemorySessions {
    /// Holds each chat change open for `delay` so overlapping writers collide.
    pub(super) fn with_write_delay(delay: Duration) -> Self {
        Self {
            write_delay: delay,
            ..Self::default()
        }
    }

    pub(super) fn chat_count(&self) -> usize {
        self.chats.lock().expect("chat mutex poisoned").len()
    }
}

impl SessionRepository for MemorySessions {
    fn insert_chat(&self, session: ChatSession) -> Result<ChatSession, RepositoryError> {
        let mut guard = self.chats.lock().expect("chat mutex poisoned");
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
        let mut guard = self.chats.lock().expect("chat mutex poisoned");
        let stored = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        let mut draft = stored.clone();
        if !self.write_delay.is_zero() {
            thread::sleep(self.write_delay);
        }
        let value = change(&mut draft)?;
        *stored = draft;
        Ok(value)
    }

    fn fetch_chat(&self, id: &SessionId) -> Result<Option<ChatSession>, RepositoryError> {
        let guard = self.chats.lock().expect("chat mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn insert_assessment(
        &self,
        session: AssessmentSession,
    ) -> Result<AssessmentSession, RepositoryError> {
        let mut guard = self.assessments.lock().expect("assessment mutex poisoned");
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
        let mut guard = self.assessments.lock().expect("assessment mutex poisoned");
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
        let guard = self.assessments.lock().expect("assessment mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryAlerts {
    events: Arc<Mutex<Vec<CrisisAlert>>>,
}

impl MemoryAlerts {
    pub(super) fn events(&self) -> Vec<CrisisAlert> {
        self.events.lock().expect("alert mutex poisoned").clone()
    }
}

impl AlertPublisher for MemoryAlerts {
    fn publish(&self, alert: CrisisAlert) -> Result<(), AlertError> {
        self.events
            .lock()
            .expect("alert mutex poisoned")
            .push(alert);
        Ok(())
    }
}

pub(super) struct FailingAlerts;

impl AlertPublisher for FailingAlerts {
    fn publish(&self, _alert: CrisisAlert) -> Result<(), AlertError> {
        Err(AlertError::Transport("pager offline".to_string()))
    }
}

pub(super) struct UnavailableRepository;

impl SessionRepository for UnavailableRepository {
    fn insert_chat(&self, _session: ChatSession) -> Result<ChatSession, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn modify_chat<T, E, F>(&self, _id: &SessionId, _change: F) -> Result<T, E>
    where
        F: FnOnce(&mut ChatSession) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        Err(RepositoryError::Unavailable("database offline".to_string()).into())
    }

    fn fetch_chat(&self, _id: &SessionId) -> Result<Option<ChatSession>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert_assessment(
        &self,
        _session: AssessmentSession,
    ) -> Result<AssessmentSession, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn modify_assessment<T, E, F>(&self, _id: &SessionId, _change: F) -> Result<T, E>
    where
        F: FnOnce(&mut AssessmentSession) -> Result<T, E>,
        E: From<RepositoryError>,
    {
        Err(RepositoryError::Unavailable("database offline".to_string()).into())
    }

    fn fetch_assessment(
        &self,
        _id: &SessionId,
    ) -> Result<Option<AssessmentSession>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn router_with_service(
    service: SupportService<MemorySessions, MemoryAlerts>,
) -> axum::Router {
    support_router(Arc::new(service), Duration::ZERO)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
