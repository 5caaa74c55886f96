//! The push package manifest.
//!
//! A [`Manifest`] maps every asset path in a package to the hex SHA-512 of its
//! content. It remembers the order entries were added in, but its serialized
//! form is canonical: [`Manifest::to_json_bytes`] always writes keys in sorted
//! byte order, so two manifests with the same `(path, digest)` pairs serialize
//! to identical bytes and therefore to comparable signatures.
//!
//! # Examples
//!
//! ```
//! use pushpackage::manifest::Manifest;
//!
//! let mut manifest = Manifest::new();
//! manifest.insert("website.json", "ab".repeat(64))?;
//! manifest.insert("icon.iconset/icon_16x16.png", "cd".repeat(64))?;
//!
//! let json = manifest.to_json_bytes()?;
//! assert!(json.starts_with(b"{\"icon.iconset/icon_16x16.png\":"));
//! # Ok::<(), pushpackage::Error>(())
//! ```

use crate::{Error, Result};
use std::collections::BTreeMap;

/// Archive entry holding the serialized manifest.
pub const MANIFEST_ENTRY: &str = "manifest.json";

/// Archive entry holding the detached signature over the manifest.
pub const SIGNATURE_ENTRY: &str = "signature";

/// Path → digest mapping for the assets of one package.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    digests: BTreeMap<String, String>,
    order: Vec<String>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the digest for `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicatePath`] if `path` is already present; the
    /// existing digest is left untouched.
    pub fn insert(&mut self, path: impl Into<String>, digest: impl Into<String>) -> Result<()> {
        let path = path.into();
        if self.digests.contains_key(&path) {
            return Err(Error::DuplicatePath(path));
        }
        self.order.push(path.clone());
        self.digests.insert(path, digest.into());
        Ok(())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.digests.contains_key(path)
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.digests.get(path).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.order
            .iter()
            .map(|path| (path.as_str(), self.digests[path].as_str()))
    }

    /// Entries in canonical (sorted) order.
    pub fn sorted(&self) -> &BTreeMap<String, String> {
        &self.digests
    }

    /// Serialize to the canonical compact JSON written into the package.
    pub fn to_json_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&self.digests)?)
    }

    /// Parse a serialized manifest.
    ///
    /// Entries are taken in sorted order since JSON objects carry no order
    /// guarantee.
    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self> {
        let digests: BTreeMap<String, String> = serde_json::from_slice(bytes)?;
        let order = digests.keys().cloned().collect();
        Ok(Self { digests, order })
    }
}

/// Check that `path` is usable as an asset path inside a package.
///
/// Accepted paths are relative, `/`-separated, and made of non-empty
/// components other than `.` and `..`. The entries reserved for the manifest
/// and the signature are rejected since the builder writes those itself.
pub fn validate_entry_path(path: &str) -> Result<()> {
    let invalid = |reason: &str| {
        Err(Error::InvalidPath {
            path: path.to_string(),
            reason: reason.to_string(),
        })
    };

    if path.is_empty() {
        return invalid("path is empty");
    }
    if path.starts_with('/') {
        return invalid("path must be relative");
    }
    if path.contains('\\') {
        return invalid("path must use forward slashes");
    }
    if path.split('/').any(|c| c.is_empty() || c == "." || c == "..") {
        return invalid("path has an empty, '.' or '..' component");
    }
    if path == MANIFEST_ENTRY || path == SIGNATURE_ENTRY {
        return invalid("name is reserved for the package manifest and signature");
    }
    Ok(())
}
