//! Error types for the simulator

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid deck format: {0}")]
    InvalidDeckFormat(String),

    #[error("Unknown card: {0}")]
    UnknownCard(String),

    #[error("Entity not found: {0}")]
    EntityNotFound(u32),

    #[error("Invalid game action: {0}")]
    InvalidAction(String),

    #[error("Invariant violated: {0}")]
    Invariant(String),

    #[error("Game has already been started")]
    AlreadyStarted,

    #[error("Loop limit exceeded: {0}")]
    LoopLimit(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Task join error: {0}")]
    JoinError(#[from] tokio::task::JoinError),
}

/// Failure categories, used to pick a process exit status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad match options, config file, deck list or player/game type
    Configuration,
    /// Deck or card files unreadable, or a deck naming an unknown card
    Harness,
    /// The rules engine reached a state it must never reach
    Invariant,
}

impl SimError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SimError::Config(_) | SimError::InvalidDeckFormat(_) | SimError::SerializationError(_) => {
                ErrorCategory::Configuration
            }
            SimError::UnknownCard(_) | SimError::IoError(_) => ErrorCategory::Harness,
            SimError::EntityNotFound(_)
            | SimError::InvalidAction(_)
            | SimError::Invariant(_)
            | SimError::AlreadyStarted
            | SimError::LoopLimit(_)
            | SimError::JoinError(_) => ErrorCategory::Invariant,
        }
    }
}

pub type Result<T> = std::result::Result<T, SimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        assert_eq!(SimError::Config("x".into()).category(), ErrorCategory::Configuration);
        assert_eq!(SimError::InvalidDeckFormat("x".into()).category(), ErrorCategory::Configuration);
        assert_eq!(SimError::UnknownCard("x".into()).category(), ErrorCategory::Harness);
        assert_eq!(SimError::LoopLimit("x".into()).category(), ErrorCategory::Invariant);
    }
}
