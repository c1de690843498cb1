// Plugin signature builder - fingerprints the watched plugin directory
use crate::domain::{FileFingerprint, PluginSignature};
use crate::port::PluginTree;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Builds [`PluginSignature`]s for one plugin directory
///
/// Plugin reload is best-effort: a missing or unreadable directory yields an
/// empty signature instead of an error.
pub struct PluginSignatureBuilder {
    tree: Arc<dyn PluginTree>,
    root: PathBuf,
}

impl PluginSignatureBuilder {
    pub fn new(tree: Arc<dyn PluginTree>, root: impl Into<PathBuf>) -> Self {
        Self {
            tree,
            root: root.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn build(&self) -> PluginSignature {
        match self.tree.list_files(&self.root) {
            Ok(files) => {
                let signature: PluginSignature = files
                    .into_iter()
                    .map(|f| (f.relative_path, FileFingerprint::new(f.size, f.modified)))
                    .collect();
                debug!(
                    root = %self.root.display(),
                    files = signature.len(),
                    "Plugin signature built"
                );
                signature
            }
            Err(e) => {
                debug!(
                    root = %self.root.display(),
                    error = %e,
                    "Plugin directory not readable, using empty signature"
                );
                PluginSignature::empty()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::plugin_tree::mocks::StaticPluginTree;

    #[test]
    fn test_missing_root_yields_empty_signature() {
        let tree = Arc::new(StaticPluginTree::new());
        let builder = PluginSignatureBuilder::new(tree, "/nonexistent/plugins");

        assert!(builder.build().is_empty());
    }

    #[test]
    fn test_entries_keyed_by_relative_path() {
        let tree = Arc::new(StaticPluginTree::new());
        tree.set_sizes(&[("a.py", 100), ("nested/deep/b.py", 200)]);
        let builder = PluginSignatureBuilder::new(tree, "/plugins");

        let signature = builder.build();
        assert_eq!(signature.len(), 2);
        assert_eq!(
            signature.get("nested/deep/b.py"),
            Some(&FileFingerprint::from_size(200))
        );
    }

    #[test]
    fn test_build_is_idempotent() {
        let tree = Arc::new(StaticPluginTree::new());
        tree.set_sizes(&[("a.py", 1), ("b.py", 2), ("c.py", 3)]);
        let builder = PluginSignatureBuilder::new(tree.clone(), "/plugins");

        let first = builder.build();
        let second = builder.build();
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
        assert_eq!(tree.scan_count(), 2);
    }

    #[test]
    fn test_root_removed_after_scan() {
        let tree = Arc::new(StaticPluginTree::new());
        tree.set_sizes(&[("a.py", 1)]);
        let builder = PluginSignatureBuilder::new(tree.clone(), "/plugins");
        assert_eq!(builder.build().len(), 1);

        tree.remove_root();
        assert_eq!(builder.build(), PluginSignature::empty());
    }
}
