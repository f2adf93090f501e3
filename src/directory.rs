//! Assembled data-access layer: one store plus one session map.
//!
//! [`Directory::init`] is the explicit initialization phase: it opens the
//! store and awaits the session bootstrap before returning, so the transport
//! layer never serves a request against a half-initialized system.

use crate::config::Config;
use crate::session::{SessionError, SessionMap};
use crate::store::{create_blog_store, BlogStore, StoreError};
use thiserror::Error;

/// Errors raised during initialization.
#[derive(Debug, Error)]
pub enum InitError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// The directory service: owns the store and the session map for the life
/// of the process. Hand it out by reference; there is no ambient state.
pub struct Directory {
    pub store: Box<dyn BlogStore>,
    pub sessions: SessionMap,
}

impl std::fmt::Debug for Directory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Directory").finish_non_exhaustive()
    }
}

impl Directory {
    /// Open the store and bootstrap the session map.
    pub async fn init(config: &Config) -> Result<Self, InitError> {
        let store = create_blog_store(config.store_type, config.data_path.clone()).await?;
        let sessions = SessionMap::bootstrap(&config.secrets_path).await?;
        tracing::info!("blog directory initialized");
        Ok(Self { store, sessions })
    }
}
