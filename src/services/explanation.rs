//! Explanation Service client

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Serialize;

use super::{build_http_client, ExplanationClient, ServiceError};
use crate::config::ExplanationConfig;
use crate::types::{ClassScore, ClassificationResult};

/// Body of `POST /api/explain`.
#[derive(Debug, Serialize)]
pub struct ExplainRequest {
    pub top_prediction: ClassScore,
    pub all_classes: BTreeMap<String, f64>,
}

impl From<&ClassificationResult> for ExplainRequest {
    fn from(result: &ClassificationResult) -> Self {
        Self {
            top_prediction: ClassScore::new(result.predicted_class.clone(), result.confidence),
            all_classes: result.distribution(),
        }
    }
}

/// HTTP client for the Explanation Service
#[derive(Clone)]
pub struct HttpExplanationClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpExplanationClient {
    pub fn new(config: &ExplanationConfig) -> Result<Self, ServiceError> {
        Ok(Self {
            http: build_http_client(config.timeout_secs)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/api/explain", self.base_url)
    }
}

#[async_trait]
impl ExplanationClient for HttpExplanationClient {
    async fn explain(&self, result: &ClassificationResult) -> Result<serde_json::Value, ServiceError> {
        let body = ExplainRequest::from(result);
        let resp = self.http.post(self.endpoint()).json(&body).send().await?;

        match resp.status() {
            status if status.is_success() => {
                let bytes = resp.bytes().await?;
                serde_json::from_slice(&bytes).map_err(|e| ServiceError::Malformed(e.to_string()))
            }
            status => Err(ServiceError::Status(status)),
        }
    }

    fn client_name(&self) -> &str {
        "explanation-http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_carries_top_and_distribution() {
        let result = ClassificationResult::new(
            "Fighting",
            0.95,
            vec![ClassScore::new("Fighting", 0.95), ClassScore::new("NormalVideos", 0.05)],
        );
        let value = serde_json::to_value(ExplainRequest::from(&result)).unwrap();
        assert_eq!(value["top_prediction"]["class"], "Fighting");
        assert_eq!(value["top_prediction"]["confidence"], 0.95);
        assert_eq!(value["all_classes"]["NormalVideos"], 0.05);
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let config = ExplanationConfig {
            base_url: "http://explain.local:9000/".to_string(),
            ..ExplanationConfig::default()
        };
        let client = HttpExplanationClient::new(&config).unwrap();
        assert_eq!(client.endpoint(), "http://explain.local:9000/api/explain");
    }
}
