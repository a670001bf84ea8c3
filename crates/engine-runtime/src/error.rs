use connectors::{auth::error::AuthError, error::AdapterError};
use engine_config::settings::error::SettingsError;
use thiserror::Error;

/// Top-level errors of the table view runtime.
#[derive(Debug, Error)]
pub enum ViewError {
    /// A load is already in flight.
    #[error("A load is already in progress")]
    Busy,

    #[error("Sign-in required: {0}")]
    Unauthenticated(String),

    #[error("Loading the table failed: {0}")]
    LoadFailed(String),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Adapter error: {0}")]
    Adapter(#[from] AdapterError),

    #[error("Token provider error: {0}")]
    Auth(#[from] AuthError),
}
