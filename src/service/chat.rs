use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, error};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ChatRole, ChatTurn, GenerationRequest, GenerativeTextService};

/// Reply recorded in place of the model's answer when the service fails.
pub const CHAT_ERROR_REPLY: &str = "Sorry, I encountered an error. Please try again.";

/// A message of the conversation as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: ChatRole,
    pub text: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}

impl ChatMessage {
    fn new(role: ChatRole, text: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            text,
            timestamp: now_millis(),
        }
    }

    pub fn is_error_reply(&self) -> bool {
        self.role == ChatRole::Model && self.text == CHAT_ERROR_REPLY
    }

    fn as_turn(&self) -> ChatTurn {
        ChatTurn {
            role: self.role,
            text: self.text.clone(),
        }
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// A conversation with a generative service.
///
/// The history only grows (until [`ChatSession::clear`]) and is forwarded
/// oldest first, since the service's answer depends on turn order.
#[derive(Debug, Default)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sends `text` with the history so far and records both sides.
    ///
    /// The service sees the history as it was before this turn, plus `text`
    /// as the prompt. A failed call records [`CHAT_ERROR_REPLY`] as the
    /// model's answer instead of returning the error.
    pub fn ask(&mut self, service: &dyn GenerativeTextService, text: &str) -> &ChatMessage {
        let history: Vec<ChatTurn> = self.messages.iter().map(ChatMessage::as_turn).collect();
        self.messages
            .push(ChatMessage::new(ChatRole::User, text.to_string()));

        debug!("Sending chat turn with {} prior turns", history.len());
        let request = GenerationRequest::new(text).with_history(history);

        let reply = match service.generate(&request) {
            Ok(reply) => reply,
            Err(err) => {
                error!("Generative service error (chat): {}", err);
                CHAT_ERROR_REPLY.to_string()
            }
        };

        self.messages.push(ChatMessage::new(ChatRole::Model, reply));
        &self.messages[self.messages.len() - 1]
    }

    /// Messages in the order they were added.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}
