//! Inference Service client

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{build_http_client, InferenceClient, ServiceError};
use crate::config::InferenceConfig;
use crate::types::{ClassScore, ClassificationResult};

/// Body of `POST /api/predict/frame`.
#[derive(Debug, Serialize)]
pub struct FrameRequest<'a> {
    pub frame_data: &'a str,
    pub include_explanation: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
}

/// Response of `POST /api/predict/frame`.
///
/// Every field is optional on the wire; [`into_result`](Self::into_result)
/// decides what a usable response is.
#[derive(Debug, Default, Deserialize)]
pub struct PredictFrameResponse {
    #[serde(default)]
    pub predicted_class: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub predictions: Vec<ClassScore>,
    #[serde(default)]
    pub top_prediction: Option<ClassScore>,
}

impl PredictFrameResponse {
    /// Validate and convert into a [`ClassificationResult`].
    ///
    /// The flat `predicted_class`/`confidence` pair wins over `top_prediction`.
    pub fn into_result(self) -> Result<ClassificationResult, ServiceError> {
        let top = self.top_prediction;
        let class = self
            .predicted_class
            .or_else(|| top.as_ref().map(|t| t.class.clone()))
            .filter(|c| !c.is_empty())
            .ok_or_else(|| ServiceError::Malformed("missing predicted_class".to_string()))?;
        let confidence = self
            .confidence
            .or_else(|| top.as_ref().map(|t| t.confidence))
            .ok_or_else(|| ServiceError::Malformed("missing confidence".to_string()))?;

        if !(0.0..=1.0).contains(&confidence) {
            return Err(ServiceError::Malformed(format!(
                "confidence {} outside [0, 1]",
                confidence
            )));
        }

        Ok(ClassificationResult::new(class, confidence, self.predictions))
    }
}

/// HTTP client for the Inference Service
#[derive(Clone)]
pub struct HttpInferenceClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpInferenceClient {
    pub fn new(config: &InferenceConfig) -> Result<Self, ServiceError> {
        Ok(Self {
            http: build_http_client(config.timeout_secs)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/api/predict/frame", self.base_url)
    }
}

#[async_trait]
impl InferenceClient for HttpInferenceClient {
    async fn classify(
        &self,
        frame_data: &str,
        position_secs: Option<f64>,
    ) -> Result<ClassificationResult, ServiceError> {
        let body = FrameRequest {
            frame_data,
            include_explanation: false,
            timestamp: position_secs,
        };

        let resp = self.http.post(self.endpoint()).json(&body).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ServiceError::Status(status));
        }

        let bytes = resp.bytes().await?;
        let parsed: PredictFrameResponse = serde_json::from_slice(&bytes)
            .map_err(|e| ServiceError::Malformed(e.to_string()))?;
        let result = parsed.into_result()?;

        debug!(
            class = %result.predicted_class,
            confidence = result.confidence,
            position = ?position_secs,
            "[Inference] Frame classified"
        );
        Ok(result)
    }

    fn client_name(&self) -> &str {
        "inference-http"
    }
}
