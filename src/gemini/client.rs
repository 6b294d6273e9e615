use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client, StatusCode};
use tracing::debug;

use super::error::GeminiError;
use super::types::{ErrorWrapper, GenerateContentRequest, GenerateContentResponse};
use crate::advisor::Credential;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

const API_KEY_HEADER: &str = "x-goog-api-key";

/// The remote generative model, as seen by the advisor services.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GeminiError>;
}

/// Gemini REST client for the `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: Credential,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: Credential, base_url: &str) -> Result<Self, GeminiError> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GeminiError> {
        debug!(
            "Gemini request: model={}, contents={}",
            model,
            request.contents.len()
        );

        let response = self
            .client
            .post(self.url(model))
            .header(CONTENT_TYPE, "application/json")
            .header(API_KEY_HEADER, self.api_key.expose())
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(map_http_error(status, body));
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

fn map_http_error(status: StatusCode, body: String) -> GeminiError {
    let message = serde_json::from_str::<ErrorWrapper>(&body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.clone());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.clone());

    GeminiError::ProviderError {
        status: status.as_u16(),
        message,
    }
}
