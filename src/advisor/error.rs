use thiserror::Error;

use crate::gemini::GeminiError;

#[derive(Error, Debug)]
pub enum AdvisorError {
    #[error("Remote credential is not configured")]
    CredentialUnavailable,

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Analysis failed: {0}")]
    AnalysisFailed(String),

    #[error("Chat exchange failed: {0}")]
    ChatExchangeFailed(#[from] GeminiError),
}

impl AdvisorError {
    pub fn analysis(reason: impl std::fmt::Display) -> Self {
        AdvisorError::AnalysisFailed(reason.to_string())
    }

    pub fn is_analysis_failure(&self) -> bool {
        matches!(self, AdvisorError::AnalysisFailed(_))
    }
}
