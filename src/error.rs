use std::path::PathBuf;
use thiserror::Error;

/// A specialized `Result` type for screen automation operations.
pub type AutomationResult<T> = Result<T, AutomationError>;

/// The error type for capture, template and pointer operations.
#[derive(Debug, Error)]
pub enum AutomationError {
    #[error("Template file not found: {path:?}")]
    TemplateNotFound { path: PathBuf },

    #[error("Failed to load template {path:?}: {description}")]
    TemplateLoad { path: PathBuf, description: String },

    #[error("Screen capture failed: {description}")]
    Capture { description: String },

    #[error("No display found to capture")]
    NoDisplay,

    #[error("Pointer input failed: {description}")]
    Input { description: String },

    #[error("Fail-safe triggered: pointer parked in a screen corner at ({x}, {y})")]
    FailSafeTriggered { x: i32, y: i32 },
}

impl AutomationError {
    /// Errors that end the whole routine instead of failing a single step
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            AutomationError::FailSafeTriggered { .. } | AutomationError::Input { .. }
        )
    }
}

impl From<xcap::XCapError> for AutomationError {
    fn from(source: xcap::XCapError) -> Self {
        AutomationError::Capture {
            description: source.to_string(),
        }
    }
}

impl From<enigo::InputError> for AutomationError {
    fn from(source: enigo::InputError) -> Self {
        AutomationError::Input {
            description: source.to_string(),
        }
    }
}

impl From<enigo::NewConError> for AutomationError {
    fn from(source: enigo::NewConError) -> Self {
        AutomationError::Input {
            description: format!("could not connect to the input backend: {source}"),
        }
    }
}
