use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use super::{GeminiError, GenerateContentRequest, GenerateContentResponse, GenerativeModel};

pub(crate) enum Reply {
    Text(String),
    NoCandidates,
    Fail { status: u16, message: String },
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Reply::Text(text.into())
    }

    pub fn fail(status: u16) -> Self {
        Reply::Fail {
            status,
            message: "scripted failure".to_string(),
        }
    }
}

/// Replays scripted replies in order and records every request it receives.
#[derive(Default)]
pub(crate) struct ScriptedModel {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<(String, GenerateContentRequest)>>,
}

impl ScriptedModel {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<(String, GenerateContentRequest)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerativeModel for ScriptedModel {
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GeminiError> {
        self.requests
            .lock()
            .unwrap()
            .push((model.to_string(), request.clone()));

        match self.replies.lock().unwrap().pop_front() {
            Some(Reply::Text(text)) => Ok(GenerateContentResponse::from_text(text)),
            Some(Reply::NoCandidates) => Ok(GenerateContentResponse::default()),
            Some(Reply::Fail { status, message }) => {
                Err(GeminiError::ProviderError { status, message })
            }
            None => Err(GeminiError::ProviderError {
                status: 500,
                message: "script exhausted".to_string(),
            }),
        }
    }
}
