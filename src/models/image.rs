use crate::error::{Error, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A captured photo, base64 encoded, with its declared media type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputImage {
    data: String,
    mime_type: String,
}

impl InputImage {
    pub fn from_base64(data: impl Into<String>, mime_type: impl Into<String>) -> Result<Self> {
        let data = data.into();
        let mime_type = mime_type.into().trim().to_ascii_lowercase();

        if data.trim().is_empty() {
            return Err(Error::InvalidInput("image payload is empty".into()));
        }
        if !mime_type.starts_with("image/") || mime_type.len() <= "image/".len() {
            return Err(Error::InvalidInput(format!(
                "unsupported media type '{}'",
                mime_type
            )));
        }

        Ok(Self { data, mime_type })
    }

    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Result<Self> {
        Self::from_base64(STANDARD.encode(bytes), mime_type)
    }

    /// Accepts the `data:image/png;base64,...` form a browser file reader produces.
    pub fn from_data_url(url: &str) -> Result<Self> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| Error::InvalidInput("not a data URL".into()))?;
        let (header, data) = rest
            .split_once(',')
            .ok_or_else(|| Error::InvalidInput("data URL has no payload".into()))?;
        let mime_type = header
            .strip_suffix(";base64")
            .ok_or_else(|| Error::InvalidInput("data URL is not base64 encoded".into()))?;

        Self::from_base64(data, mime_type)
    }

    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mime_type = mime_type_for_path(path).ok_or_else(|| {
            Error::InvalidInput(format!("cannot infer image type of {}", path.display()))
        })?;
        let bytes = tokio::fs::read(path).await?;

        log::debug!("Read {} bytes from {}", bytes.len(), path.display());
        Self::from_bytes(&bytes, mime_type)
    }

    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }
}

pub fn mime_type_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "heic" => Some("image/heic"),
        "heif" => Some("image/heif"),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedImage {
    pub data: String, // Base64 encoded
    pub mime_type: String,
    pub model: String,
}

impl GeneratedImage {
    pub fn decode(&self) -> Result<Vec<u8>> {
        STANDARD
            .decode(self.data.as_bytes())
            .map_err(|e| Error::InvalidInput(format!("generated image is not valid base64: {}", e)))
    }

    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/jpeg" => "jpg",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "png",
        }
    }

    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.decode()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, &bytes).await?;
        log::info!("Saved coloring page ({} bytes) to {}", bytes.len(), path.display());
        Ok(())
    }
}
