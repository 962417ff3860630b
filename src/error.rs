use thiserror::Error;

/// Why a single generation call did not produce an image.
///
/// The set is closed: every outcome of [`crate::ImageTransformClient::generate`]
/// other than success lands in exactly one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("The image was blocked by the content safety filter ({reason}). Try a different photo.")]
    SafetyBlocked { reason: String },

    #[error("The model responded with text instead of an image: {text}")]
    TextOnlyResponse { text: String },

    #[error("The model returned no image data")]
    NoImageReturned,

    #[error("API Error: {message}")]
    ApiError { message: String },

    #[error("Unknown error while generating the coloring page: {detail}")]
    UnknownError { detail: String },
}

impl GenerationError {
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationError::SafetyBlocked { .. } => "safety_blocked",
            GenerationError::TextOnlyResponse { .. } => "text_only_response",
            GenerationError::NoImageReturned => "no_image_returned",
            GenerationError::ApiError { .. } => "api_error",
            GenerationError::UnknownError { .. } => "unknown_error",
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("A coloring page is already being generated")]
    Busy,

    #[error("No image has been uploaded")]
    NoImage,

    #[error("No coloring page has been generated yet")]
    NoResult,

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

pub type Result<T> = std::result::Result<T, Error>;
