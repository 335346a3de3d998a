use tracing::{info, warn};

use crate::core::db::KeyValueStore;
use crate::models::SessionIdentity;

pub const SESSION_KEY: &str = "rental-dashboard-user";

/// Who is signed in, kept in memory and mirrored to the store.
#[derive(Debug, Clone)]
pub struct SessionStore<S: KeyValueStore> {
    store: S,
    current: Option<SessionIdentity>,
}

impl<S: KeyValueStore> SessionStore<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            current: None,
        }
    }

    /// Restore a saved session, if any. A blob that no longer parses is
    /// dropped so the next start is clean.
    pub async fn init(&mut self) -> anyhow::Result<Option<SessionIdentity>> {
        self.current = match self.store.load(SESSION_KEY).await? {
            None => None,
            Some(blob) => match serde_json::from_str::<SessionIdentity>(&blob) {
                Ok(identity) => Some(identity),
                Err(e) => {
                    warn!("Discarding unreadable session record: {}", e);
                    self.store.remove(SESSION_KEY).await?;
                    None
                }
            },
        };
        Ok(self.current.clone())
    }

    pub async fn sign_in(&mut self, identity: SessionIdentity) -> anyhow::Result<()> {
        let blob = serde_json::to_string(&identity)?;
        self.store.store(SESSION_KEY, &blob).await?;
        info!(name = %identity.name, order_ref = %identity.order_ref, "Signed in");
        self.current = Some(identity);
        Ok(())
    }

    pub async fn sign_out(&mut self) -> anyhow::Result<()> {
        self.store.remove(SESSION_KEY).await?;
        if let Some(identity) = self.current.take() {
            info!(name = %identity.name, "Signed out");
        }
        Ok(())
    }

    pub fn current(&self) -> Option<&SessionIdentity> {
        self.current.as_ref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.current.is_some()
    }
}
