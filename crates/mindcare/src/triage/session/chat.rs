use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::SessionId;
use crate::triage::classifier::{Category, ClassificationResult, Classifier};

pub const GREETING: &str = "Hello! I'm MindCare AI, your mental health support companion. I'm here to listen and provide support 24/7. How can I help you today?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Normal,
    Crisis,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: u64,
    pub content: String,
    pub sender: Sender,
    pub kind: MessageKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    pub sent_at: DateTime<Utc>,
}

/// User message accepted and waiting for its reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingReply {
    pub message_id: u64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatError {
    #[error("message is empty")]
    EmptyMessage,
    #[error("a reply is still being prepared")]
    ReplyPending,
    #[error("no pending reply for message {0}")]
    UnknownPendingReply(u64),
}

/// Message log for one conversation, owned by the caller.
///
/// Sending is split in two: [`ChatSession::submit`] records the user's message and
/// [`ChatSession::deliver`] classifies it and appends the reply. Whatever the caller does
/// between the two (a typing indicator, a delay) has no effect on the reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSession {
    id: SessionId,
    messages: Vec<ChatMessage>,
    pending: Option<PendingReply>,
    next_message_id: u64,
}

impl ChatSession {
    pub fn new(id: SessionId, now: DateTime<Utc>) -> Self {
        let greeting = ChatMessage {
            id: 1,
            content: GREETING.to_string(),
            sender: Sender::Bot,
            kind: MessageKind::Normal,
            category: None,
            sent_at: now,
        };

        Self {
            id,
            messages: vec![greeting],
            pending: None,
            next_message_id: 2,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_typing(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<&PendingReply> {
        self.pending.as_ref()
    }

    /// Appends the user's text verbatim. Whitespace-only text is rejected.
    pub fn submit(&mut self, text: &str, now: DateTime<Utc>) -> Result<PendingReply, ChatError> {
        if text.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if self.pending.is_some() {
            return Err(ChatError::ReplyPending);
        }

        let message_id = self
            .push(ChatMessage {
                id: 0,
                content: text.to_string(),
                sender: Sender::User,
                kind: MessageKind::Normal,
                category: None,
                sent_at: now,
            })
            .id;

        let pending = PendingReply {
            message_id,
            text: text.to_string(),
        };
        self.pending = Some(pending.clone());
        Ok(pending)
    }

    /// Classifies the pending text and appends the bot reply.
    pub fn deliver(
        &mut self,
        pending: &PendingReply,
        classifier: &Classifier,
        now: DateTime<Utc>,
    ) -> Result<(&ChatMessage, ClassificationResult), ChatError> {
        match &self.pending {
            Some(current) if current == pending => {}
            _ => return Err(ChatError::UnknownPendingReply(pending.message_id)),
        }

        let result = classifier.classify(&pending.text);
        let kind = if result.is_crisis {
            MessageKind::Crisis
        } else {
            MessageKind::Normal
        };

        self.pending = None;
        let reply = self.push(ChatMessage {
            id: 0,
            content: result.reply.clone(),
            sender: Sender::Bot,
            kind,
            category: Some(result.category),
            sent_at: now,
        });
        Ok((reply, result))
    }

    pub fn message(&self, id: u64) -> Option<&ChatMessage> {
        self.messages.iter().find(|message| message.id == id)
    }

    fn push(&mut self, mut message: ChatMessage) -> &ChatMessage {
        message.id = self.next_message_id;
        self.next_message_id += 1;
        let index = self.messages.len();
        self.messages.push(message);
        &self.messages[index]
    }
}
