//! End-to-end chat scenarios driven through the public service facade and HTTP router.

mod common {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use mindcare::triage::{
        AlertError, AlertPublisher, AssessmentSession, ChatSession, CrisisAlert, RepositoryError,
        SessionId, SessionRepository, SupportService, TriageEngines,
    };

    #[derive(Default)]
    pub struct InMemorySessions {
        chats: Mutex<HashMap<SessionId, ChatSession>>,
        assessments: Mutex<HashMap<SessionId, AssessmentSession>>,
    }

    impl SessionRepository for InMemorySessions {
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
            let value = change(&mut draft)?;
            *stored = draft;
            Ok(value)
        }

        fn fetch_chat(&self, id: &SessionId) -> Result<Option<ChatSession>, RepositoryError> {
            Ok(self.chats.lock().expect("chat mutex poisoned").get(id).cloned())
        }

        fn insert_assessment(
            &self,
            session: AssessmentSession,
        ) -> Result<AssessmentSession, RepositoryError> {
            self.assessments
                .lock()
                .expect("assessment mutex poisoned")
                .insert(session.id().clone(), session.clone());
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
            Ok(self
                .assessments
                .lock()
                .expect("assessment mutex poisoned")
                .get(id)
                .cloned())
        }
    }

    #[derive(Default)]
    pub struct RecordingAlerts {
        pub events: Mutex<Vec<CrisisAlert>>,
    }

    impl AlertPublisher for RecordingAlerts {
        fn publish(&self, alert: CrisisAlert) -> Result<(), AlertError> {
            self.events.lock().expect("alert mutex poisoned").push(alert);
            Ok(())
        }
    }

    pub fn service() -> (
        Arc<SupportService<InMemorySessions, RecordingAlerts>>,
        Arc<RecordingAlerts>,
    ) {
        let alerts = Arc::new(RecordingAlerts::default());
        let service = SupportService::new(
            Arc::new(InMemorySessions::default()),
            alerts.clone(),
            TriageEngines::standard(),
        );
        (Arc::new(service), alerts)
    }
}

use std::time::{Duration, Instant};

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use mindcare::triage::{support_router, Category, MessageKind, Sender};
use serde_json::{json, Value};
use tower::ServiceExt;

#[test]
fn a_conversation_alternates_user_and_bot_messages() {
    let (service, alerts) = common::service();
    let session = service.start_chat().expect("chat starts");

    let turns = [
        ("I keep worrying about everything", Category::General),
        ("I'm anxious all the time", Category::Anxiety),
        ("and so lonely lately", Category::Depression),
        ("my grade in chemistry dropped", Category::AcademicStress),
    ];
    for (text, expected) in turns {
        let exchange = service.send_message(session.id(), text).expect("exchange");
        assert_eq!(exchange.classification.category, expected, "text: {text}");
    }

    let transcript = service.chat(session.id()).expect("transcript");
    let senders: Vec<Sender> = transcript
        .messages()
        .iter()
        .map(|message| message.sender)
        .collect();
    assert_eq!(senders.len(), 9);
    assert_eq!(senders[0], Sender::Bot);
    assert!(senders[1..]
        .chunks(2)
        .all(|pair| pair == [Sender::User, Sender::Bot]));
    assert!(alerts.events.lock().expect("alerts").is_empty());
}

#[test]
fn crisis_turns_are_marked_and_alerted() {
    let (service, alerts) = common::service();
    let session = service.start_chat().expect("chat starts");

    let exchange = service
        .send_message(session.id(), "Exams are killing me, I want to die")
        .expect("exchange");

    assert_eq!(exchange.reply.kind, MessageKind::Crisis);
    assert!(exchange.reply.content.contains("988"));
    let events = alerts.events.lock().expect("alerts");
    assert_eq!(events.len(), 1);
    assert_eq!(&events[0].session_id, session.id());
}

#[tokio::test]
async fn http_replies_wait_for_the_typing_delay() {
    let (service, _) = common::service();
    let delay = Duration::from_millis(50);
    let router = support_router(service, delay);

    let response = router
        .clone()
        .oneshot(
            Request::post("/api/v1/chat/sessions")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("route executes");
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("body");
    let created: Value = serde_json::from_slice(&body).expect("json");
    let session_id = created["session_id"].as_str().expect("session id");

    let started = Instant::now();
    let response = router
        .oneshot(
            Request::post(format!("/api/v1/chat/sessions/{session_id}/messages"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "text": "so much stress" }).to_string()))
                .expect("request"),
        )
        .await
        .expect("route executes");

    assert!(started.elapsed() >= delay);
    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("body");
    let reply: Value = serde_json::from_slice(&body).expect("json");
    assert_eq!(reply["category"], "anxiety");
}
