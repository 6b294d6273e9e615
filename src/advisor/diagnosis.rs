//! Plant photo diagnosis.
//!
//! The live path sends the photo inline together with a fixed instruction and
//! a response schema, then validates whatever JSON comes back. Without a
//! credential the mock provider answers instead.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info};

use super::capability::Capability;
use super::error::AdvisorError;
use super::mock::MockDiagnosisProvider;
use crate::gemini::{
    Content, GenerateContentRequest, GenerationConfig, GenerativeModel, Part, Schema,
};

pub const MAX_CONFIDENCE: f64 = 100.0;

const DIAGNOSIS_INSTRUCTION: &str = r#"Analyze this plant image.
Return a single JSON object with exactly this structure:
{
  "plantName": "string",
  "isHealthy": boolean,
  "confidence": number from 0 to 100,
  "diseaseName": "string, or null when the plant is healthy",
  "treatments": ["string", ...] (empty when the plant is healthy),
  "tips": ["string", ...]
}
Answer in the language of any text visible in the image, otherwise in English. Keep field names exactly as written."#;

const REQUIRED_FIELDS: [&str; 5] = ["plantName", "isHealthy", "confidence", "treatments", "tips"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisResult {
    pub plant_name: String,
    pub is_healthy: bool,
    /// Percentage, 0 to 100.
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disease_name: Option<String>,
    pub treatments: Vec<String>,
    pub tips: Vec<String>,
}

impl DiagnosisResult {
    /// Decode the model's JSON text and check the value invariants.
    pub fn parse(text: &str) -> Result<Self, AdvisorError> {
        let result: DiagnosisResult = serde_json::from_str(text)
            .map_err(|e| AdvisorError::analysis(format!("invalid diagnosis JSON: {e}")))?;
        result.validate()?;
        Ok(result)
    }

    pub fn validate(&self) -> Result<(), AdvisorError> {
        if !self.confidence.is_finite() || !(0.0..=MAX_CONFIDENCE).contains(&self.confidence) {
            return Err(AdvisorError::analysis(format!(
                "confidence {} is outside 0..=100",
                self.confidence
            )));
        }
        Ok(())
    }
}

/// What to do with `treatments` when the model reports a healthy plant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthyTreatments {
    /// Drop treatments and disease name.
    #[default]
    Clear,
    /// Return the remote output untouched.
    Trust,
}

impl HealthyTreatments {
    pub fn apply(self, mut result: DiagnosisResult) -> DiagnosisResult {
        if self == HealthyTreatments::Clear && result.is_healthy {
            if !result.treatments.is_empty() || result.disease_name.is_some() {
                debug!(
                    "Clearing {} treatment(s) from a healthy diagnosis",
                    result.treatments.len()
                );
            }
            result.treatments.clear();
            result.disease_name = None;
        }
        result
    }
}

/// One analysis call: the photo plus the fixed instruction and schema.
#[derive(Debug, Clone, Copy)]
pub struct DiagnosisRequest<'a> {
    image: &'a [u8],
    mime_type: &'a str,
}

impl<'a> DiagnosisRequest<'a> {
    pub fn new(image: &'a [u8], mime_type: &'a str) -> Result<Self, AdvisorError> {
        if image.is_empty() {
            return Err(AdvisorError::InvalidImage("image is empty".to_string()));
        }
        if !mime_type.starts_with("image/") {
            return Err(AdvisorError::InvalidImage(format!(
                "unsupported mime type '{mime_type}'"
            )));
        }
        Ok(Self { image, mime_type })
    }

    pub fn instruction() -> &'static str {
        DIAGNOSIS_INSTRUCTION
    }

    pub fn response_schema() -> Schema {
        Schema::object([
            ("plantName", Schema::string()),
            ("isHealthy", Schema::boolean()),
            ("confidence", Schema::number()),
            ("diseaseName", Schema::string().nullable()),
            ("treatments", Schema::array_of(Schema::string())),
            ("tips", Schema::array_of(Schema::string())),
        ])
        .with_required(REQUIRED_FIELDS)
    }

    pub fn to_wire(&self) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content::user(vec![
                Part::inline_image(self.image, self.mime_type),
                Part::text(DIAGNOSIS_INSTRUCTION),
            ])],
            system_instruction: None,
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(Self::response_schema()),
            }),
        }
    }
}

#[derive(Clone)]
pub struct DiagnosisService {
    remote: Option<Arc<dyn GenerativeModel>>,
    model: String,
    mock: MockDiagnosisProvider,
    healthy_treatments: HealthyTreatments,
}

impl DiagnosisService {
    /// `remote` is `None` exactly when the capability is unavailable.
    pub fn new(
        remote: Option<Arc<dyn GenerativeModel>>,
        model: impl Into<String>,
        mock: MockDiagnosisProvider,
    ) -> Self {
        Self {
            remote,
            model: model.into(),
            mock,
            healthy_treatments: HealthyTreatments::default(),
        }
    }

    pub fn with_healthy_treatments(mut self, policy: HealthyTreatments) -> Self {
        self.healthy_treatments = policy;
        self
    }

    pub fn capability(&self) -> Capability {
        if self.remote.is_some() {
            Capability::Available
        } else {
            Capability::Unavailable
        }
    }

    pub async fn analyze(
        &self,
        image: &[u8],
        mime_type: &str,
    ) -> Result<DiagnosisResult, AdvisorError> {
        let Some(remote) = &self.remote else {
            return Ok(self.mock.provide().await);
        };

        let request = DiagnosisRequest::new(image, mime_type)?.to_wire();
        info!(
            "Analyzing plant image ({} bytes, {}) with {}",
            image.len(),
            mime_type,
            self.model
        );

        let response = remote
            .generate_content(&self.model, &request)
            .await
            .map_err(|e| {
                error!("Gemini analysis error: {}", e);
                AdvisorError::analysis(e)
            })?;

        let text = response
            .text()
            .filter(|text| !text.trim().is_empty())
            .unwrap_or_else(|| "{}".to_string());

        let result = DiagnosisResult::parse(&text).inspect_err(|e| {
            error!("Gemini analysis returned an unusable payload: {}", e);
        })?;

        Ok(self.healthy_treatments.apply(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisor::delay::RecordingDelay;
    use crate::advisor::mock::MOCK_DIAGNOSIS_LATENCY;
    use crate::gemini::testing::{Reply, ScriptedModel};
    use serde_json::json;

    const MODEL: &str = "gemini-2.5-flash";

    fn live(model: Arc<ScriptedModel>) -> (DiagnosisService, Arc<RecordingDelay>) {
        let delay = Arc::new(RecordingDelay::new());
        let service = DiagnosisService::new(
            Some(model as Arc<dyn GenerativeModel>),
            MODEL,
            MockDiagnosisProvider::new(delay.clone()),
        );
        (service, delay)
    }

    fn sick_tomato() -> String {
        json!({
            "plantName": "Tomato",
            "isHealthy": false,
            "confidence": 93.5,
            "diseaseName": "Late Blight",
            "treatments": ["Remove affected foliage.", "Apply a fungicide."],
            "tips": ["Avoid overhead watering."]
        })
        .to_string()
    }

    #[tokio::test]
    async fn unavailable_capability_serves_mock() {
        let delay = Arc::new(RecordingDelay::new());
        let service = DiagnosisService::new(None, MODEL, MockDiagnosisProvider::new(delay.clone()));

        let result = service.analyze(b"", "application/octet-stream").await.unwrap();

        assert_eq!(service.capability(), Capability::Unavailable);
        assert_eq!(result, crate::advisor::mock::mock_diagnosis());
        assert_eq!(delay.waits(), vec![MOCK_DIAGNOSIS_LATENCY]);
    }

    #[tokio::test]
    async fn live_request_carries_image_instruction_and_schema() {
        let model = Arc::new(ScriptedModel::new([Reply::text(sick_tomato())]));
        let (service, delay) = live(model.clone());

        let result = service.analyze(b"\x89PNG", "image/png").await.unwrap();
        assert_eq!(result.plant_name, "Tomato");
        assert_eq!(result.disease_name.as_deref(), Some("Late Blight"));
        assert!(delay.waits().is_empty());

        let requests = model.requests();
        assert_eq!(requests.len(), 1);
        let (model_id, request) = &requests[0];
        assert_eq!(model_id, MODEL);

        let body = serde_json::to_value(request).unwrap();
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["inlineData"]["mimeType"], "image/png");
        assert_eq!(body["contents"][0]["parts"][0]["inlineData"]["data"], "iVBORw==");
        assert!(body["contents"][0]["parts"][1]["text"]
            .as_str()
            .unwrap()
            .contains("plantName"));
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(
            body["generationConfig"]["responseSchema"]["required"],
            json!(["plantName", "isHealthy", "confidence", "treatments", "tips"])
        );
        assert_eq!(
            body["generationConfig"]["responseSchema"]["properties"]["diseaseName"]["nullable"],
            true
        );
    }

    #[tokio::test]
    async fn transport_failure_is_analysis_failed_not_mock() {
        let model = Arc::new(ScriptedModel::new([Reply::fail(503)]));
        let (service, delay) = live(model);

        let err = service.analyze(b"img", "image/jpeg").await.unwrap_err();

        assert!(err.is_analysis_failure(), "got {err:?}");
        assert!(delay.waits().is_empty());
    }

    #[tokio::test]
    async fn empty_reply_defaults_to_empty_object_and_fails() {
        let model = Arc::new(ScriptedModel::new([Reply::NoCandidates]));
        let (service, _) = live(model);

        let err = service.analyze(b"img", "image/jpeg").await.unwrap_err();
        assert!(err.is_analysis_failure());
        assert!(err.to_string().contains("missing field"));
    }

    #[tokio::test]
    async fn unparseable_reply_fails() {
        let model = Arc::new(ScriptedModel::new([Reply::text("Sorry, I can't tell.")]));
        let (service, _) = live(model);

        assert!(service
            .analyze(b"img", "image/jpeg")
            .await
            .unwrap_err()
            .is_analysis_failure());
    }

    #[tokio::test]
    async fn out_of_range_confidence_fails() {
        let payload = json!({
            "plantName": "Palm",
            "isHealthy": true,
            "confidence": 140,
            "treatments": [],
            "tips": []
        });
        let model = Arc::new(ScriptedModel::new([Reply::text(payload.to_string())]));
        let (service, _) = live(model);

        let err = service.analyze(b"img", "image/jpeg").await.unwrap_err();
        assert!(err.to_string().contains("outside 0..=100"));
    }

    #[tokio::test]
    async fn null_tips_are_rejected() {
        let payload = json!({
            "plantName": "Palm",
            "isHealthy": true,
            "confidence": 70,
            "treatments": [],
            "tips": null
        });
        let model = Arc::new(ScriptedModel::new([Reply::text(payload.to_string())]));
        let (service, _) = live(model);

        assert!(service
            .analyze(b"img", "image/jpeg")
            .await
            .unwrap_err()
            .is_analysis_failure());
    }

    #[tokio::test]
    async fn invalid_image_is_rejected_before_the_call() {
        let model = Arc::new(ScriptedModel::new([Reply::text(sick_tomato())]));
        let (service, _) = live(model.clone());

        let err = service.analyze(b"", "image/jpeg").await.unwrap_err();
        assert!(matches!(err, AdvisorError::InvalidImage(_)));

        let err = service.analyze(b"data", "text/plain").await.unwrap_err();
        assert!(matches!(err, AdvisorError::InvalidImage(_)));

        assert!(model.requests().is_empty());
    }

    fn healthy_with_treatments() -> String {
        json!({
            "plantName": "Date Palm",
            "isHealthy": true,
            "confidence": 97,
            "diseaseName": null,
            "treatments": ["Nothing needed."],
            "tips": ["Keep irrigating weekly."]
        })
        .to_string()
    }

    #[tokio::test]
    async fn healthy_treatments_are_cleared_by_default() {
        let model = Arc::new(ScriptedModel::new([Reply::text(healthy_with_treatments())]));
        let (service, _) = live(model);

        let result = service.analyze(b"img", "image/jpeg").await.unwrap();
        assert!(result.is_healthy);
        assert!(result.treatments.is_empty());
        assert_eq!(result.tips, vec!["Keep irrigating weekly."]);
    }

    #[tokio::test]
    async fn trust_policy_keeps_remote_output() {
        let model = Arc::new(ScriptedModel::new([Reply::text(healthy_with_treatments())]));
        let (service, _) = live(model);
        let service = service.with_healthy_treatments(HealthyTreatments::Trust);

        let result = service.analyze(b"img", "image/jpeg").await.unwrap();
        assert_eq!(result.treatments, vec!["Nothing needed."]);
    }

    #[test]
    fn wire_form_round_trips_with_absent_disease() {
        let result = DiagnosisResult {
            plant_name: "Wheat".to_string(),
            is_healthy: true,
            confidence: 0.0,
            disease_name: None,
            treatments: vec![],
            tips: vec!["Harvest before the heat.".to_string()],
        };

        let encoded = serde_json::to_string(&result).unwrap();
        assert!(!encoded.contains("diseaseName"));
        assert_eq!(DiagnosisResult::parse(&encoded).unwrap(), result);

        let with_null = r#"{"plantName":"Wheat","isHealthy":true,"confidence":0,"diseaseName":null,"treatments":[],"tips":["Harvest before the heat."]}"#;
        assert_eq!(DiagnosisResult::parse(with_null).unwrap(), result);
    }

    #[test]
    fn boundary_confidences_are_valid() {
        let mut result = crate::advisor::mock::mock_diagnosis();
        result.confidence = 0.0;
        assert!(result.validate().is_ok());
        result.confidence = 100.0;
        assert!(result.validate().is_ok());
        result.confidence = -0.5;
        assert!(result.validate().is_err());
    }
}
