//! Error types shared across the crate
//!
//! `ConfigError` lives with the level loader in `world::level`. Everything a
//! collaborator (input hardware, display) can fail with is a
//! `CollaboratorError`; the core never retries these.

pub use crate::world::ConfigError;

/// Failure reported by an input source or display surface
#[derive(Debug)]
pub enum CollaboratorError {
    /// The input source could not be read
    Input(String),
    /// The display surface rejected a draw call
    Display(String),
}

impl std::fmt::Display for CollaboratorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollaboratorError::Input(msg) => write!(f, "Input source error: {}", msg),
            CollaboratorError::Display(msg) => write!(f, "Display surface error: {}", msg),
        }
    }
}

impl std::error::Error for CollaboratorError {}

/// Top-level error for hosts driving the loop
#[derive(Debug)]
pub enum Error {
    Config(ConfigError),
    Collaborator(CollaboratorError),
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

impl From<CollaboratorError> for Error {
    fn from(e: CollaboratorError) -> Self {
        Error::Collaborator(e)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Config(e) => write!(f, "{}", e),
            Error::Collaborator(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Config(e) => Some(e),
            Error::Collaborator(e) => Some(e),
        }
    }
}
