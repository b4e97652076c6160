use thiserror::Error;

/// Rejected session configuration. Never leaves the timer half-updated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{field} must be a whole number")]
    NotNumeric { field: &'static str },
    #[error("{field} must be greater than 0")]
    NotPositive { field: &'static str },
    #[error("{field} is too large")]
    TooLarge { field: &'static str },
}
