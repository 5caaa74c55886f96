//! Building packages from a directory on disk.
//!
//! The directory layout becomes the package layout: `pushPackage.raw/icon.iconset/icon_16x16.png`
//! is stored as `icon.iconset/icon_16x16.png`. Traversal is sorted by file name
//! so the same tree always yields the same entry order.
//!
//! # Examples
//!
//! ```no_run
//! use pushpackage::{write_package, SigningIdentity};
//!
//! let identity = SigningIdentity::from_p12(&std::fs::read("website.p12")?, "secret")?;
//! write_package("pushPackage.raw", "pushPackage.zip", &identity)?;
//! # Ok::<(), pushpackage::Error>(())
//! ```

use super::PushPackage;
use crate::crypto::SigningIdentity;
use crate::manifest::{MANIFEST_ENTRY, SIGNATURE_ENTRY};
use crate::{Error, Result};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{info, warn};
use walkdir::WalkDir;

/// A regular file found under a package source directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// `/`-separated path relative to the source directory.
    pub relative_path: String,
    /// Location on disk.
    pub path: PathBuf,
}

/// List the regular files under `dir` in sorted traversal order.
///
/// Symlinks are not followed and, like other non-regular entries, are
/// skipped with a warning. A `manifest.json` or `signature` at the top level
/// is left out, since the build regenerates both.
///
/// # Errors
///
/// - [`Error::Io`] if `dir` is missing or is not a directory, or if a
///   directory entry cannot be read
/// - [`Error::InvalidPath`] if a name under `dir` is not valid UTF-8, since
///   it could not be stored in the archive unchanged
pub fn collect_files(dir: impl AsRef<Path>) -> Result<Vec<SourceFile>> {
    let dir = dir.as_ref();

    if !dir.is_dir() {
        return Err(Error::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("Package source directory not found: {}", dir.display()),
        )));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).follow_links(false).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            Error::Io(io::Error::other(format!("Failed to walk directory: {}", e)))
        })?;

        let file_type = entry.file_type();
        if file_type.is_dir() {
            continue;
        }

        let relative = entry.path().strip_prefix(dir).map_err(|_| {
            Error::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                "Failed to compute relative path",
            ))
        })?;
        let relative_path = relative
            .components()
            .map(|c| c.as_os_str().to_str())
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| Error::InvalidPath {
                path: relative.display().to_string(),
                reason: "file name is not valid UTF-8".into(),
            })?
            .join("/");

        if !file_type.is_file() {
            warn!(path = %relative_path, "skipping non-regular file");
            continue;
        }
        if relative_path == MANIFEST_ENTRY || relative_path == SIGNATURE_ENTRY {
            warn!(path = %relative_path, "skipping generated entry found in source");
            continue;
        }

        files.push(SourceFile {
            relative_path,
            path: entry.into_path(),
        });
    }

    Ok(files)
}

/// Package every file under `dir` into `writer` and sign it with `identity`.
///
/// Each file is opened only when its turn comes, so at most one source file
/// is open at a time.
pub fn build_from_dir<W: Write>(
    dir: impl AsRef<Path>,
    writer: W,
    identity: &SigningIdentity,
) -> Result<W> {
    let files = collect_files(dir)?;
    let mut package = PushPackage::new(writer);

    for file in &files {
        let reader = File::open(&file.path).map_err(|source| Error::ReadFailure {
            path: file.relative_path.clone(),
            source,
        })?;
        package.add_file(&file.relative_path, reader)?;
    }

    package.finalize(identity)
}

/// Build a package from `dir` and write it to `output_path`.
///
/// The archive is written to a temporary file next to `output_path` and
/// renamed into place only after it has been fully finalized and flushed, so
/// a failed build never leaves a file at `output_path`.
pub fn write_package(
    dir: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    identity: &SigningIdentity,
) -> Result<()> {
    let output_path = output_path.as_ref();

    let parent = match output_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    if !parent.exists() {
        fs::create_dir_all(parent)?;
    }

    let mut temp = NamedTempFile::new_in(parent)?;
    {
        let writer = build_from_dir(dir, BufWriter::new(temp.as_file_mut()), identity)?;
        writer.into_inner().map_err(|e| Error::WriteFailure {
            path: output_path.display().to_string(),
            source: e.into_error(),
        })?;
    }
    temp.as_file().sync_all()?;

    temp.persist(output_path).map_err(|e| Error::WriteFailure {
        path: output_path.display().to_string(),
        source: e.error,
    })?;

    info!(path = %output_path.display(), "wrote push package");
    Ok(())
}
