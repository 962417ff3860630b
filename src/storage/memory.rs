use super::traits::SessionStore;
use crate::{
    error::{Error, Result},
    models::SessionSnapshot,
};
use async_trait::async_trait;
use std::sync::Mutex;

#[derive(Default)]
pub struct MemorySessionStore {
    snapshot: Mutex<Option<SessionSnapshot>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self) -> Result<std::sync::MutexGuard<'_, Option<SessionSnapshot>>> {
        self.snapshot
            .lock()
            .map_err(|_| Error::Storage("session lock poisoned".into()))
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> Result<Option<SessionSnapshot>> {
        Ok(self.slot()?.clone())
    }

    async fn save(&self, snapshot: &SessionSnapshot) -> Result<()> {
        *self.slot()? = Some(snapshot.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        *self.slot()? = None;
        Ok(())
    }
}
