// Application Layer - Supervision use cases

pub mod debouncer;
pub mod inspector;
pub mod reconciler;
pub mod signature;
pub mod supervisor;

// Re-exports
pub use debouncer::ReloadDebouncer;
pub use inspector::ProcessInspector;
pub use reconciler::decide;
pub use signature::PluginSignatureBuilder;
pub use supervisor::{shutdown_channel, ShutdownSender, ShutdownToken, SupervisionLoop};
