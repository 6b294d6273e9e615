use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::delay::Delay;
use super::diagnosis::DiagnosisResult;

pub const MOCK_DIAGNOSIS_LATENCY: Duration = Duration::from_millis(2000);

/// Fixed diagnosis served when no credential is configured.
#[derive(Clone)]
pub struct MockDiagnosisProvider {
    delay: Arc<dyn Delay>,
}

impl MockDiagnosisProvider {
    pub fn new(delay: Arc<dyn Delay>) -> Self {
        Self { delay }
    }

    pub async fn provide(&self) -> DiagnosisResult {
        debug!("Serving mock diagnosis after {:?}", MOCK_DIAGNOSIS_LATENCY);
        self.delay.wait(MOCK_DIAGNOSIS_LATENCY).await;
        mock_diagnosis()
    }
}

pub fn mock_diagnosis() -> DiagnosisResult {
    DiagnosisResult {
        plant_name: "Tomato (Mock)".to_string(),
        is_healthy: false,
        confidence: 88.0,
        disease_name: Some("Early Blight".to_string()),
        treatments: vec![
            "Remove infected leaves immediately.".to_string(),
            "Apply copper-based fungicide.".to_string(),
            "Improve air circulation around the plant.".to_string(),
        ],
        tips: vec![
            "Water at the base, not on leaves.".to_string(),
            "Rotate crops next season.".to_string(),
        ],
    }
}
