//! Remote Service Clients
//!
//! The pipeline talks to two black-box HTTP services:
//!
//! - **Inference Service**: `POST /api/predict/frame`, image in, ranked class
//!   distribution out
//! - **Explanation Service**: `POST /api/explain`, classification in, opaque
//!   rationale out
//!
//! Both sit behind async traits so the pipeline can run against in-process
//! fakes in tests.

mod explanation;
mod inference;

pub use explanation::{ExplainRequest, HttpExplanationClient};
pub use inference::{FrameRequest, HttpInferenceClient, PredictFrameResponse};

use async_trait::async_trait;

use crate::types::ClassificationResult;

/// Service client errors
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Server returned status {0}")]
    Status(reqwest::StatusCode),
    #[error("Malformed response: {0}")]
    Malformed(String),
    #[error("Failed to encode request: {0}")]
    Encode(String),
}

/// Classifies a single encoded frame.
#[async_trait]
pub trait InferenceClient: Send + Sync + 'static {
    /// `frame_data` is a `data:image/jpeg;base64,` URL; `position_secs` is
    /// the playback position it was taken at, if any.
    async fn classify(
        &self,
        frame_data: &str,
        position_secs: Option<f64>,
    ) -> Result<ClassificationResult, ServiceError>;

    /// Human-readable name for logging
    fn client_name(&self) -> &str;
}

/// Produces a rationale for a classification.
#[async_trait]
pub trait ExplanationClient: Send + Sync + 'static {
    /// The returned payload is passed through to the store unmodified.
    async fn explain(&self, result: &ClassificationResult) -> Result<serde_json::Value, ServiceError>;

    /// Human-readable name for logging
    fn client_name(&self) -> &str;
}

fn build_http_client(timeout_secs: u64) -> Result<reqwest::Client, ServiceError> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(ServiceError::Http)
}
