// Plugin tree implementation
// reason: walkdir for recursive traversal, std::fs metadata for stat-only fingerprints
use std::fs;
use std::io;
use std::path::Path;
use tracing::trace;
use walkdir::WalkDir;

use poolwarden_core::port::{PluginFile, PluginTree};

/// Recursive plugin directory listing
///
/// Symlinks are followed so a linked plugin file changes the signature when
/// its target does; walkdir reports link loops as entry errors, which are
/// skipped like any other vanished entry.
#[derive(Debug, Default, Clone, Copy)]
pub struct WalkdirPluginTree;

impl WalkdirPluginTree {
    pub fn new() -> Self {
        Self
    }
}

impl PluginTree for WalkdirPluginTree {
    fn list_files(&self, root: &Path) -> io::Result<Vec<PluginFile>> {
        // Missing or unreadable root is the caller's business, not a silent empty list
        fs::read_dir(root)?;

        let mut files = Vec::new();
        let walker = WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    trace!(error = %e, "Skipping unreadable plugin entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            // File may vanish between listing and stat
            let metadata = match entry.metadata() {
                Ok(metadata) => metadata,
                Err(e) => {
                    trace!(path = %entry.path().display(), error = %e, "Plugin file vanished");
                    continue;
                }
            };
            let Ok(relative) = entry.path().strip_prefix(root) else {
                continue;
            };

            files.push(PluginFile::new(
                relative_key(relative),
                metadata.len(),
                metadata.modified().ok(),
            ));
        }

        Ok(files)
    }
}

/// `/`-joined relative path, stable across platforms
fn relative_key(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
