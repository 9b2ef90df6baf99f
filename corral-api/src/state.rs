//! Shared application state for Axum routers.

use std::sync::Arc;
use std::time::Instant;

use crate::auth::AuthConfig;
use crate::store::CrmStore;

/// Application-wide state shared across all routes.
///
/// The store is held as a trait object so the in-memory backend can be
/// replaced by a persistent one without touching handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CrmStore>,
    pub auth: Arc<AuthConfig>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(store: Arc<dyn CrmStore>, auth: AuthConfig) -> Self {
        Self {
            store,
            auth: Arc::new(auth),
            start_time: Instant::now(),
        }
    }
}
