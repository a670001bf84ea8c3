use engine_config::settings::error::SettingsError;
use engine_runtime::error::ViewError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Settings(#[from] SettingsError),

    #[error("{0}")]
    View(#[from] ViewError),

    #[error("Shutdown requested")]
    ShutdownRequested,
}
