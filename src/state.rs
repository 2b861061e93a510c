//! Application state management
//!
//! Contains shared state accessible across all handlers.

use crate::db::CarStore;
use std::sync::Arc;

/// Application state shared across all handlers
pub struct AppState {
    /// Source of per-request database sessions
    pub store: Arc<dyn CarStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn CarStore>) -> Self {
        Self { store }
    }
}

/// Type alias for shared state
pub type SharedState = Arc<AppState>;
