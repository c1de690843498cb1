// Poolwarden Infrastructure - System Adapters
// Implements: ProcessTable, PluginTree, ProcessManager, MasterTerminator

pub mod plugin_tree_impl;
pub mod process_table_impl;
#[cfg(unix)]
pub mod signal_process_manager;

pub use plugin_tree_impl::WalkdirPluginTree;
pub use process_table_impl::SysinfoProcessTable;
#[cfg(unix)]
pub use signal_process_manager::{SignalMasterTerminator, SignalProcessManager};
