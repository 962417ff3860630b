use crate::{error::Result, models::SessionSnapshot};
use async_trait::async_trait;

/// Holds at most one cached session: the last upload, options and result.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self) -> Result<Option<SessionSnapshot>>;
    async fn save(&self, snapshot: &SessionSnapshot) -> Result<()>;
    async fn clear(&self) -> Result<()>;
}
