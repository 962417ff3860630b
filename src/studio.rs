//! Upload → options → generate → result → download, without a UI.

use crate::{
    error::{Error, Result},
    gemini::ImageTransformClient,
    models::{GeneratedImage, InputImage, SessionSnapshot, StyleOptions},
    storage::SessionStore,
};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

pub struct Studio {
    client: ImageTransformClient,
    store: Arc<dyn SessionStore>,
    state: Mutex<SessionSnapshot>,
    generating: AtomicBool,
    // Bumped, under the state lock, whenever the photo or the whole session is replaced.
    revision: AtomicU64,
}

/// Clears the in-flight flag however `generate` exits.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Studio {
    pub fn new(client: ImageTransformClient, store: Arc<dyn SessionStore>) -> Self {
        Self {
            client,
            store,
            state: Mutex::new(SessionSnapshot::new()),
            generating: AtomicBool::new(false),
            revision: AtomicU64::new(0),
        }
    }

    fn state(&self) -> MutexGuard<'_, SessionSnapshot> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn replace_session(&self, snapshot: SessionSnapshot) {
        let mut state = self.state();
        *state = snapshot;
        self.revision.fetch_add(1, Ordering::AcqRel);
    }

    fn update(&self, f: impl FnOnce(&mut SessionSnapshot)) -> SessionSnapshot {
        let mut state = self.state();
        f(&mut state);
        state.touch();
        state.clone()
    }

    // The cache is best effort; a failed write never fails the operation.
    async fn persist(&self, snapshot: SessionSnapshot) {
        if let Err(e) = self.store.save(&snapshot).await {
            log::warn!("Could not cache session: {}", e);
        }
    }

    /// Loads the cached session, if any. Returns whether one was found.
    pub async fn restore(&self) -> Result<bool> {
        match self.store.load().await? {
            Some(snapshot) => {
                log::info!(
                    "Restored session {} from {}",
                    snapshot.id,
                    snapshot.updated_at.format("%Y-%m-%d %H:%M:%S")
                );
                self.replace_session(snapshot);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub async fn upload(&self, image: InputImage) {
        log::info!("Uploaded {} image", image.mime_type());
        let snapshot = self.update(|state| {
            state.image = Some(image);
            state.result = None;
            self.revision.fetch_add(1, Ordering::AcqRel);
        });
        self.persist(snapshot).await;
    }

    pub async fn set_options(&self, options: StyleOptions) {
        let snapshot = self.update(|state| state.options = options);
        self.persist(snapshot).await;
    }

    pub fn options(&self) -> StyleOptions {
        self.state().options
    }

    pub fn image(&self) -> Option<InputImage> {
        self.state().image.clone()
    }

    pub fn result(&self) -> Option<GeneratedImage> {
        self.state().result.clone()
    }

    pub fn is_generating(&self) -> bool {
        self.generating.load(Ordering::Acquire)
    }

    pub async fn generate(&self) -> Result<GeneratedImage> {
        let (image, options, started_at) = {
            let state = self.state();
            let image = state.image.clone().ok_or(Error::NoImage)?;
            (image, state.options, self.revision.load(Ordering::Acquire))
        };

        if self
            .generating
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(Error::Busy);
        }
        let _in_flight = InFlight(&self.generating);

        self.update(|state| state.result = None);
        let outcome = self.client.generate(&image, options).await;

        let snapshot = {
            let mut state = self.state();
            if self.revision.load(Ordering::Acquire) == started_at {
                state.result = outcome.as_ref().ok().cloned();
                state.touch();
                Some(state.clone())
            } else {
                None
            }
        };
        match snapshot {
            Some(snapshot) => self.persist(snapshot).await,
            None => log::info!("Photo changed during generation; discarding the stale result"),
        }

        outcome.map_err(Error::from)
    }

    pub async fn download(&self, path: impl AsRef<Path>) -> Result<()> {
        let result = self.result().ok_or(Error::NoResult)?;
        result.save(path).await
    }

    pub async fn reset(&self) -> Result<()> {
        self.replace_session(SessionSnapshot::new());
        self.store.clear().await?;
        log::info!("Session cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenerationError;
    use crate::gemini::{BackendError, GenerationBackend};
    use crate::models::gemini::{GenerateContentRequest, GenerateContentResponse};
    use crate::models::{DetailLevel, LineThickness};
    use crate::storage::MemorySessionStore;
    use async_trait::async_trait;
    use serde_json::json;
    use tokio::sync::Notify;

    struct GatedBackend {
        gate: Option<Notify>,
        body: serde_json::Value,
    }

    #[async_trait]
    impl GenerationBackend for GatedBackend {
        async fn generate_content(
            &self,
            _model: &str,
            _request: &GenerateContentRequest,
        ) -> std::result::Result<GenerateContentResponse, BackendError> {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            serde_json::from_value(self.body.clone()).map_err(|e| BackendError::Decode(e.to_string()))
        }
    }

    fn image_reply() -> serde_json::Value {
        json!({
            "candidates": [{
                "content": {"parts": [{"inlineData": {"mimeType": "image/png", "data": "UEFHRQ=="}}]},
                "finishReason": "STOP"
            }]
        })
    }

    fn studio_with(backend: Arc<GatedBackend>, store: Arc<MemorySessionStore>) -> Studio {
        Studio::new(
            ImageTransformClient::with_backend(backend, "test-model"),
            store,
        )
    }

    fn ungated(body: serde_json::Value) -> Arc<GatedBackend> {
        Arc::new(GatedBackend { gate: None, body })
    }

    fn photo() -> InputImage {
        InputImage::from_base64("cGhvdG8=", "image/jpeg").unwrap()
    }

    #[tokio::test]
    async fn test_generate_requires_upload() {
        let studio = studio_with(ungated(image_reply()), Arc::new(MemorySessionStore::new()));
        assert!(matches!(studio.generate().await, Err(Error::NoImage)));
    }

    #[tokio::test]
    async fn test_generate_stores_and_persists_result() {
        let store = Arc::new(MemorySessionStore::new());
        let studio = studio_with(ungated(image_reply()), store.clone());

        studio.upload(photo()).await;
        studio
            .set_options(StyleOptions::new(LineThickness::Thin, DetailLevel::High))
            .await;
        let page = studio.generate().await.unwrap();

        assert_eq!(page.data, "UEFHRQ==");
        assert_eq!(studio.result(), Some(page.clone()));
        assert!(!studio.is_generating());

        let cached = store.load().await.unwrap().unwrap();
        assert_eq!(cached.result, Some(page));
        assert_eq!(cached.image, Some(photo()));
        assert_eq!(cached.options.detail, DetailLevel::High);
    }

    #[tokio::test]
    async fn test_failure_leaves_no_result() {
        let store = Arc::new(MemorySessionStore::new());
        let studio = studio_with(ungated(json!({})), store);

        studio.upload(photo()).await;
        let err = studio.generate().await.unwrap_err();
        assert!(matches!(
            err,
            Error::Generation(GenerationError::NoImageReturned)
        ));
        assert_eq!(studio.result(), None);
        assert!(!studio.is_generating());
    }

    #[tokio::test]
    async fn test_new_upload_clears_previous_result() {
        let studio = studio_with(ungated(image_reply()), Arc::new(MemorySessionStore::new()));
        studio.upload(photo()).await;
        studio.generate().await.unwrap();

        studio.upload(photo()).await;
        assert_eq!(studio.result(), None);
    }

    #[tokio::test]
    async fn test_second_generate_while_in_flight_is_busy() {
        let backend = Arc::new(GatedBackend {
            gate: Some(Notify::new()),
            body: image_reply(),
        });
        let studio = Arc::new(studio_with(
            backend.clone(),
            Arc::new(MemorySessionStore::new()),
        ));
        studio.upload(photo()).await;

        let first = {
            let studio = studio.clone();
            tokio::spawn(async move { studio.generate().await })
        };
        while !studio.is_generating() {
            tokio::task::yield_now().await;
        }

        assert!(matches!(studio.generate().await, Err(Error::Busy)));

        if let Some(gate) = &backend.gate {
            gate.notify_one();
        }
        assert!(first.await.unwrap().is_ok());
        assert!(!studio.is_generating());
    }

    #[tokio::test]
    async fn test_restore_download_and_reset() {
        let store = Arc::new(MemorySessionStore::new());
        {
            let studio = studio_with(ungated(image_reply()), store.clone());
            studio.upload(photo()).await;
            studio.generate().await.unwrap();
        }

        let studio = studio_with(ungated(image_reply()), store.clone());
        assert!(studio.restore().await.unwrap());
        assert_eq!(studio.image(), Some(photo()));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.png");
        studio.download(&path).await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"PAGE");

        studio.reset().await.unwrap();
        assert_eq!(studio.image(), None);
        assert_eq!(store.load().await.unwrap(), None);
        assert!(matches!(
            studio.download(&path).await,
            Err(Error::NoResult)
        ));
    }

    fn gated() -> Arc<GatedBackend> {
        Arc::new(GatedBackend {
            gate: Some(Notify::new()),
            body: image_reply(),
        })
    }

    fn other_photo() -> InputImage {
        InputImage::from_base64("b3RoZXI=", "image/png").unwrap()
    }

    async fn start_generating(
        studio: &Arc<Studio>,
    ) -> tokio::task::JoinHandle<Result<GeneratedImage>> {
        let handle = {
            let studio = studio.clone();
            tokio::spawn(async move { studio.generate().await })
        };
        while !studio.is_generating() {
            tokio::task::yield_now().await;
        }
        handle
    }

    #[tokio::test]
    async fn test_upload_during_generation_discards_stale_page() {
        let backend = gated();
        let store = Arc::new(MemorySessionStore::new());
        let studio = Arc::new(studio_with(backend.clone(), store.clone()));
        studio.upload(photo()).await;

        let first = start_generating(&studio).await;
        studio.upload(other_photo()).await;
        if let Some(gate) = &backend.gate {
            gate.notify_one();
        }
        assert!(first.await.unwrap().is_ok());

        assert_eq!(studio.image(), Some(other_photo()));
        assert_eq!(studio.result(), None);

        let cached = store.load().await.unwrap().unwrap();
        assert_eq!(cached.image, Some(other_photo()));
        assert_eq!(cached.result, None);
    }

    #[tokio::test]
    async fn test_reset_during_generation_stays_cleared() {
        let backend = gated();
        let store = Arc::new(MemorySessionStore::new());
        let studio = Arc::new(studio_with(backend.clone(), store.clone()));
        studio.upload(photo()).await;

        let first = start_generating(&studio).await;
        studio.reset().await.unwrap();
        if let Some(gate) = &backend.gate {
            gate.notify_one();
        }
        assert!(first.await.unwrap().is_ok());

        assert_eq!(studio.image(), None);
        assert_eq!(studio.result(), None);
        assert_eq!(store.load().await.unwrap(), None);
    }
}
