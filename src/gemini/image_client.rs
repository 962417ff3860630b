use super::{compose_prompt, BackendError, GeminiBackend, GenerationBackend};
use crate::{
    config::GeminiConfig,
    error::{GenerationError, Result},
    logger,
    models::{
        gemini::{
            Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Modality,
            Part,
        },
        GeneratedImage, InputImage, StyleOptions,
    },
};
use std::sync::Arc;

pub type GenerationResult = std::result::Result<GeneratedImage, GenerationError>;

/// Turns a photo into a coloring page with one `generateContent` call.
#[derive(Clone)]
pub struct ImageTransformClient {
    backend: Arc<dyn GenerationBackend>,
    model: String,
}

impl ImageTransformClient {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let backend = GeminiBackend::new(&config)?;
        Ok(Self::with_backend(Arc::new(backend), config.model()))
    }

    pub fn with_backend(backend: Arc<dyn GenerationBackend>, model: impl Into<String>) -> Self {
        Self {
            backend,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn build_request(image: &InputImage, options: StyleOptions) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![
                    Part::inline_data(image.mime_type(), image.data()),
                    Part::text(compose_prompt(options)),
                ],
            }],
            // The image model rejects IMAGE-only requests.
            generation_config: Some(GenerationConfig {
                response_modalities: vec![Modality::Text, Modality::Image],
            }),
        }
    }

    pub async fn generate(&self, image: &InputImage, options: StyleOptions) -> GenerationResult {
        let request = Self::build_request(image, options);

        log::info!(
            "Generating coloring page with model: {} (lines: {}, detail: {})",
            self.model,
            options.thickness,
            options.detail
        );
        log::debug!(
            "Input image: {} ({} base64 chars)",
            image.mime_type(),
            image.data().len()
        );

        let response = {
            let _timer = logger::timer("generateContent");
            self.backend.generate_content(&self.model, &request).await
        };

        let result = match response {
            Ok(response) => interpret_response(response, &self.model),
            Err(e) => Err(classify_backend_error(e)),
        };

        match &result {
            Ok(image) => log::info!(
                "Received {} coloring page ({} base64 chars)",
                image.mime_type,
                image.data.len()
            ),
            Err(e)
                if matches!(
                    e,
                    GenerationError::ApiError { .. } | GenerationError::UnknownError { .. }
                ) =>
            {
                log::error!("Coloring page generation failed: {}", e)
            }
            Err(e) => log::warn!("No coloring page returned [{}]: {}", e.kind(), e),
        }

        result
    }
}

fn classify_backend_error(error: BackendError) -> GenerationError {
    match error {
        BackendError::Transport(_) | BackendError::Service { .. } => GenerationError::ApiError {
            message: error.to_string(),
        },
        BackendError::Decode(detail) => GenerationError::UnknownError { detail },
    }
}

/// Picks the image out of a response, or explains why there is none.
pub fn interpret_response(response: GenerateContentResponse, model: &str) -> GenerationResult {
    let candidate = response.candidates.into_iter().next().unwrap_or_default();
    let parts = candidate.content.map(|c| c.parts).unwrap_or_default();

    let image = parts
        .iter()
        .filter_map(|part| part.inline_data.as_ref())
        .find(|inline| !inline.data.is_empty());
    if let Some(inline) = image {
        return Ok(GeneratedImage {
            data: inline.data.clone(),
            mime_type: inline.mime_type.clone(),
            model: model.to_string(),
        });
    }

    if let Some(reason) = candidate.finish_reason.filter(|r| r.is_blocked()) {
        return Err(GenerationError::SafetyBlocked {
            reason: reason.as_str().to_string(),
        });
    }
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(GenerationError::SafetyBlocked { reason });
    }

    let text: String = parts.iter().filter_map(|part| part.text.as_deref()).collect();
    if !text.is_empty() {
        return Err(GenerationError::TextOnlyResponse { text });
    }

    Err(GenerationError::NoImageReturned)
}
