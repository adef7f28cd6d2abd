//! Application state shared across handlers

use crate::{service::RegistrationService, uploads::PhotoStorage};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub registration: RegistrationService,
    pub photos: PhotoStorage,
    /// Limit for JSON and url-encoded bodies, in bytes
    pub body_limit: usize,
}
