//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. The
//! relay sits behind a single mutex: every relay operation is synchronous,
//! so the lock is never held across an await and events are applied in the
//! order they take it.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::Config;
use crate::services::content::ContentStore;
use crate::services::relay::Relay;

/// Clone is required by Axum; all inner fields are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<Mutex<Relay>>,
    pub content: ContentStore,
    pub config: Arc<Config>,
}

impl AppState {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            relay: Arc::new(Mutex::new(Relay::new())),
            content: ContentStore::new(config.content_dir.clone()),
            config: Arc::new(config),
        }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
