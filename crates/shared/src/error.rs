use std::path::PathBuf;

use thiserror::Error;

/// Everything that can stop a player controller from being set up.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("movement handler unavailable for controller {controller}")]
    MovementHandlerUnavailable { controller: String },

    #[error("input binding missing for action `{action}`")]
    InputBindingMissing { action: &'static str },

    #[error("input binding for action `{action}` must be a {expected} binding")]
    BindingKindMismatch {
        action: &'static str,
        expected: &'static str,
    },

    #[error("invalid player configuration: `{field}` = {value}")]
    InvalidConfig { field: &'static str, value: f32 },

    #[error("failed to read player configuration {path}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse player configuration")]
    ConfigParse(#[from] toml::de::Error),
}
