use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};
use uuid::Uuid;

use super::capability::Capability;
use super::delay::Delay;
use super::error::AdvisorError;
use super::language::Language;
use crate::gemini::{Content, GenerateContentRequest, GenerativeModel, Part};

pub const OFFLINE_CHAT_LATENCY: Duration = Duration::from_millis(1000);

pub const ASSISTANT_INSTRUCTION: &str = r#"You are AgriBot, an expert agricultural assistant for a smart farming platform serving the regions of Saudi Arabia.
What you can do:
1. Explain plant diseases and how they are diagnosed.
2. Explain how soil moisture sensors and NPK (nitrogen, phosphorus, potassium) sensors work and how to read them.
3. Recommend crops that suit each region (Central, East, West, South, North) and its seasons.
4. Speak Arabic and English fluently. Detect the language of each user message and reply in that same language.

Keep answers concise, practical and encouraging."#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

/// Display log of a conversation, owned by the caller. Append-only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChatHistory {
    messages: Vec<ChatMessage>,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with the assistant's greeting in `language`.
    pub fn greeted(language: Language) -> Self {
        Self {
            messages: vec![ChatMessage::assistant(language.greeting())],
        }
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// One live conversation with the remote model.
///
/// Holds the system instruction fixed at creation and the turns the model
/// has seen so far. Dropping the handle ends the conversation.
pub struct ChatSession {
    id: Uuid,
    model: String,
    system_instruction: String,
    thread: Vec<Content>,
    remote: Arc<dyn GenerativeModel>,
}

impl ChatSession {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn system_instruction(&self) -> &str {
        &self.system_instruction
    }

    /// Number of turns (user and model) in the remote context.
    pub fn turns(&self) -> usize {
        self.thread.len()
    }

    async fn exchange(&mut self, text: &str) -> Result<String, AdvisorError> {
        let mut contents = self.thread.clone();
        contents.push(Content::user(vec![Part::text(text)]));

        let request = GenerateContentRequest {
            contents,
            system_instruction: Some(Content::instruction(&self.system_instruction)),
            generation_config: None,
        };

        let response = self.remote.generate_content(&self.model, &request).await?;
        let reply = response.text().unwrap_or_default();

        self.thread = request.contents;
        self.thread.push(Content::model_text(reply.clone()));
        Ok(reply)
    }
}

impl fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatSession")
            .field("id", &self.id)
            .field("model", &self.model)
            .field("turns", &self.thread.len())
            .finish()
    }
}

#[derive(Clone)]
pub struct ChatSessionManager {
    remote: Option<Arc<dyn GenerativeModel>>,
    model: String,
}

impl ChatSessionManager {
    /// `remote` is `None` exactly when the capability is unavailable.
    pub fn new(remote: Option<Arc<dyn GenerativeModel>>, model: impl Into<String>) -> Self {
        Self {
            remote,
            model: model.into(),
        }
    }

    pub fn capability(&self) -> Capability {
        if self.remote.is_some() {
            Capability::Available
        } else {
            Capability::Unavailable
        }
    }

    pub fn create_session(&self) -> Option<ChatSession> {
        let remote = self.remote.clone()?;
        let session = ChatSession {
            id: Uuid::new_v4(),
            model: self.model.clone(),
            system_instruction: ASSISTANT_INSTRUCTION.to_string(),
            thread: Vec::new(),
            remote,
        };
        info!("Created chat session {} ({})", session.id, session.model);
        Some(session)
    }
}

/// Sends single chat turns. Never fails: errors become localized replies.
#[derive(Clone)]
pub struct ChatMessageExchange {
    delay: Arc<dyn Delay>,
}

impl ChatMessageExchange {
    pub fn new(delay: Arc<dyn Delay>) -> Self {
        Self { delay }
    }

    pub async fn send(
        &self,
        session: Option<&mut ChatSession>,
        text: &str,
        language: Language,
    ) -> String {
        let Some(session) = session else {
            debug!("No chat session; replying offline after {:?}", OFFLINE_CHAT_LATENCY);
            self.delay.wait(OFFLINE_CHAT_LATENCY).await;
            return language.unreachable_reply().to_string();
        };

        match session.exchange(text).await {
            Ok(reply) => {
                debug!(
                    "Session {} replied with {} chars",
                    session.id,
                    reply.chars().count()
                );
                reply
            }
            Err(e) => {
                error!("Chat error in session {}: {}", session.id, e);
                language.failure_reply().to_string()
            }
        }
    }
}
