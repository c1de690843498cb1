// Plugin directory signature
// reason: stat metadata only, file contents are never read

use std::collections::BTreeMap;
use std::time::SystemTime;

/// Change fingerprint of a single plugin file
///
/// Derived from size and modification time so a multi-megabyte file costs
/// the same to fingerprint as an empty one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileFingerprint {
    pub size: u64,
    /// None on platforms/filesystems without mtime support
    pub modified: Option<SystemTime>,
}

impl FileFingerprint {
    pub fn new(size: u64, modified: Option<SystemTime>) -> Self {
        Self { size, modified }
    }

    /// Fingerprint with no modification time (tests, mtime-less filesystems)
    pub fn from_size(size: u64) -> Self {
        Self::new(size, None)
    }
}

/// Mapping of relative file path -> fingerprint for a plugin tree
///
/// Two signatures are equal iff they hold the same paths with the same
/// fingerprints. Values are immutable once built; holders replace them
/// wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginSignature {
    entries: BTreeMap<String, FileFingerprint>,
}

impl PluginSignature {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, path: &str) -> Option<&FileFingerprint> {
        self.entries.get(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl<K: Into<String>> FromIterator<(K, FileFingerprint)> for PluginSignature {
    fn from_iter<I: IntoIterator<Item = (K, FileFingerprint)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}
