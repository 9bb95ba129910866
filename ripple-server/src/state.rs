use std::sync::Arc;

use crate::storage::Storage;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    /// User the server acts as when a request carries no identity header.
    pub current_user_id: i64,
}

impl AppState {
    pub fn new(storage: Arc<dyn Storage>, current_user_id: i64) -> Self {
        Self {
            storage,
            current_user_id,
        }
    }
}
