//! Advisory core: plant diagnosis and the assistant chat, each with a
//! deterministic offline path when no credential is configured.

pub mod capability;
pub mod chat;
pub mod delay;
pub mod diagnosis;
pub mod error;
pub mod language;
pub mod mock;

pub use capability::{Capability, Credential, CredentialResolver};
pub use chat::{
    ChatHistory, ChatMessage, ChatMessageExchange, ChatSession, ChatSessionManager, Role,
    ASSISTANT_INSTRUCTION, OFFLINE_CHAT_LATENCY,
};
pub use delay::{Delay, TokioDelay};
pub use diagnosis::{DiagnosisRequest, DiagnosisResult, DiagnosisService, HealthyTreatments};
pub use error::AdvisorError;
pub use language::Language;
pub use mock::{mock_diagnosis, MockDiagnosisProvider, MOCK_DIAGNOSIS_LATENCY};

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Config;
use crate::gemini::{GeminiClient, GenerativeModel};

/// The three services wired to one capability decision.
#[derive(Clone)]
pub struct Advisor {
    capability: Capability,
    diagnosis: DiagnosisService,
    sessions: ChatSessionManager,
    exchange: ChatMessageExchange,
}

impl Advisor {
    /// Resolve the credential once and build the live client if there is one.
    pub fn from_config(config: &Config) -> Result<Self> {
        let resolver = CredentialResolver::from_config(config);
        let remote: Option<Arc<dyn GenerativeModel>> = match resolver.credential() {
            Some(credential) => {
                let client = GeminiClient::new(credential.clone(), &config.gemini.base_url)
                    .context("Failed to build Gemini HTTP client")?;
                info!(
                    "Gemini credential found; using {} at {}",
                    config.gemini.model,
                    client.base_url()
                );
                Some(Arc::new(client))
            }
            None => {
                warn!("Gemini API key not found. Serving mock responses.");
                None
            }
        };

        Ok(Self::with_remote(remote, config, Arc::new(TokioDelay)))
    }

    /// Wire the services around an explicit backend and delay strategy.
    pub fn with_remote(
        remote: Option<Arc<dyn GenerativeModel>>,
        config: &Config,
        delay: Arc<dyn Delay>,
    ) -> Self {
        let capability = if remote.is_some() {
            Capability::Available
        } else {
            Capability::Unavailable
        };
        let model = config.gemini.model.clone();

        let diagnosis = DiagnosisService::new(
            remote.clone(),
            model.clone(),
            MockDiagnosisProvider::new(delay.clone()),
        )
        .with_healthy_treatments(config.diagnosis.healthy_treatments);

        Self {
            capability,
            diagnosis,
            sessions: ChatSessionManager::new(remote, model),
            exchange: ChatMessageExchange::new(delay),
        }
    }

    pub fn capability(&self) -> Capability {
        self.capability
    }

    /// Errors with `CredentialUnavailable` unless a live backend is wired.
    pub fn require_live(&self) -> Result<(), AdvisorError> {
        if self.capability.is_available() {
            Ok(())
        } else {
            Err(AdvisorError::CredentialUnavailable)
        }
    }

    pub fn diagnosis(&self) -> &DiagnosisService {
        &self.diagnosis
    }

    pub fn sessions(&self) -> &ChatSessionManager {
        &self.sessions
    }

    pub fn exchange(&self) -> &ChatMessageExchange {
        &self.exchange
    }
}
