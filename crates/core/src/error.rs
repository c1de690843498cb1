// Central Error Type for the Supervisor

use crate::domain::FatalReason;
use thiserror::Error;

/// Supervisor-level error type
#[derive(Error, Debug)]
pub enum SupervisorError {
    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    /// The loop stopped for good; the embedder must tear down the master tree
    #[error("Fatal abort: {0}")]
    FatalAbort(FatalReason),
}

impl SupervisorError {
    /// Fatal reason, if this error ended the supervision loop
    pub fn fatal_reason(&self) -> Option<&FatalReason> {
        match self {
            SupervisorError::FatalAbort(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Result type alias using SupervisorError
pub type Result<T> = std::result::Result<T, SupervisorError>;
