// Plugin directory listing port

use std::io;
use std::path::Path;
use std::time::SystemTime;

/// A regular file found under the plugin root, with its stat metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginFile {
    /// Path relative to the scanned root, `/`-separated
    pub relative_path: String,
    pub size: u64,
    pub modified: Option<SystemTime>,
}

impl PluginFile {
    pub fn new(relative_path: impl Into<String>, size: u64, modified: Option<SystemTime>) -> Self {
        Self {
            relative_path: relative_path.into(),
            size,
            modified,
        }
    }
}

/// Recursive directory listing with per-file stat
pub trait PluginTree: Send + Sync {
    /// List every regular file under `root`, nested directories included
    ///
    /// Files that disappear mid-scan are skipped, not reported as errors.
    ///
    /// # Errors
    /// Returns an io::Error if `root` itself is missing or unreadable.
    fn list_files(&self, root: &Path) -> io::Result<Vec<PluginFile>>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    /// Plugin tree whose listing is set by the test
    ///
    /// Starts out as a missing directory.
    #[derive(Default)]
    pub struct StaticPluginTree {
        files: Mutex<Option<Vec<PluginFile>>>,
        scans: Mutex<usize>,
    }

    impl StaticPluginTree {
        pub fn new() -> Self {
            Self::default()
        }

        /// Replace the listing with `(path, size)` pairs
        pub fn set_sizes(&self, files: &[(&str, u64)]) {
            let listing = files
                .iter()
                .map(|(path, size)| PluginFile::new(*path, *size, None))
                .collect();
            *self.files.lock().unwrap() = Some(listing);
        }

        /// Make the root disappear
        pub fn remove_root(&self) {
            *self.files.lock().unwrap() = None;
        }

        pub fn scan_count(&self) -> usize {
            *self.scans.lock().unwrap()
        }
    }

    impl PluginTree for StaticPluginTree {
        fn list_files(&self, root: &Path) -> io::Result<Vec<PluginFile>> {
            *self.scans.lock().unwrap() += 1;
            self.files.lock().unwrap().clone().ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("{} does not exist", root.display()),
                )
            })
        }
    }
}
