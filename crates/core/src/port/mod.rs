// Port Layer - Interfaces for external dependencies

pub mod plugin_tree;
pub mod process_manager;
pub mod process_table;
pub mod time_provider; // For deterministic testing

// Re-exports
pub use plugin_tree::{PluginFile, PluginTree};
pub use process_manager::{MasterTerminator, ProcessManager, ProcessManagerError};
pub use process_table::{ProcessTable, ProcessTableError};
pub use time_provider::TimeProvider;
