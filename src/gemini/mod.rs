pub mod image_client;
pub mod prompt;

use crate::{
    config::GeminiConfig,
    error::{Error, Result},
    models::gemini::{ApiErrorResponse, GenerateContentRequest, GenerateContentResponse},
};
use async_trait::async_trait;
use thiserror::Error;

pub use image_client::{interpret_response, GenerationResult, ImageTransformClient};
pub use prompt::compose_prompt;

/// Failure of the underlying `generateContent` call, before classification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("{0}")]
    Transport(String),

    #[error("{message} (HTTP {status})")]
    Service { status: u16, message: String },

    #[error("unreadable response: {0}")]
    Decode(String),
}

#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> std::result::Result<GenerateContentResponse, BackendError>;
}

/// `generateContent` over HTTPS.
#[derive(Clone)]
pub struct GeminiBackend {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GeminiBackend {
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(http, config))
    }

    pub fn with_client(http: reqwest::Client, config: &GeminiConfig) -> Self {
        Self {
            http,
            base_url: config.base_url().to_string(),
            api_key: config.api_key().to_string(),
        }
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, model)
    }
}

#[async_trait]
impl GenerationBackend for GeminiBackend {
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> std::result::Result<GenerateContentResponse, BackendError> {
        let url = self.endpoint(model);
        log::debug!("POST {}", url);

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                log::error!("Gemini transport error: {:?}", e);
                BackendError::Transport(e.to_string())
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorResponse>(&body)
                .ok()
                .and_then(|envelope| envelope.error.message)
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_string()
                });
            log::error!("Gemini service error {}: {}", status.as_u16(), message);
            return Err(BackendError::Service {
                status: status.as_u16(),
                message,
            });
        }

        log::debug!("Gemini response body: {} bytes", body.len());
        serde_json::from_str(&body).map_err(|e| BackendError::Decode(e.to_string()))
    }
}
