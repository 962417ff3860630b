use super::{GeneratedImage, InputImage, StyleOptions};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The last upload, options and result, as cached between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub image: Option<InputImage>,
    pub options: StyleOptions,
    pub result: Option<GeneratedImage>,
    pub updated_at: DateTime<Utc>,
}

impl SessionSnapshot {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            image: None,
            options: StyleOptions::default(),
            result: None,
            updated_at: Utc::now(),
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self::new()
    }
}
