//! Turn photos into printable coloring pages with Gemini image generation.

pub mod config;
pub mod error;
pub mod gemini;
pub mod logger;
pub mod models;
pub mod storage;
pub mod studio;

pub use config::{AppConfig, GeminiConfig};
pub use error::{Error, GenerationError, Result};
pub use gemini::{
    compose_prompt, GeminiBackend, GenerationBackend, GenerationResult, ImageTransformClient,
};
pub use models::{
    DetailLevel, GeneratedImage, InputImage, LineThickness, SessionSnapshot, StyleOptions,
};
pub use storage::{FileSessionStore, MemorySessionStore, SessionStore};
pub use studio::Studio;
