// Domain Layer - Pure supervision entities

pub mod action;
pub mod config;
pub mod error;
pub mod observation;
pub mod signature;

// Re-exports
pub use action::{Action, FatalReason, Phase, ReloadDecision, ScaleDecision, TickReport};
pub use config::SupervisorConfig;
pub use error::DomainError;
pub use observation::{Pid, WorkerObservation};
pub use signature::{FileFingerprint, PluginSignature};
