use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeminiError {
    #[error("API request failed: {0}")]
    ApiRequestFailed(#[from] reqwest::Error),

    #[error("Provider error {status}: {message}")]
    ProviderError { status: u16, message: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl GeminiError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            GeminiError::ProviderError { status, .. } => Some(*status),
            GeminiError::ApiRequestFailed(e) => e.status().map(|s| s.as_u16()),
            GeminiError::SerializationError(_) => None,
        }
    }
}
