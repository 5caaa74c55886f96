//! Push package assembly.
//!
//! A push package is a ZIP archive with a fixed layout:
//!
//! | Entry | Content |
//! |-------|---------|
//! | assets (`website.json`, `icon.iconset/*.png`, ...) | caller-supplied files, stored uncompressed |
//! | `manifest.json` | JSON object mapping each asset path to its hex SHA-512 |
//! | `signature` | DER CMS signature over the `manifest.json` bytes, detached |
//!
//! [`PushPackage`] writes that layout in one pass. Each asset is hashed while
//! it streams into the archive, so content is read exactly once. The archive
//! is assembled in a staging area owned by the package and copied to the
//! caller's writer only when [`PushPackage::finish`] succeeds. The build
//! moves through [`BuildState`] in a fixed order; a step called out of order
//! returns [`Error::InvalidState`] and any failed step leaves the package in
//! [`BuildState::Failed`] with the staged archive discarded and the caller's
//! writer untouched.
//!
//! # Examples
//!
//! ```no_run
//! use pushpackage::{PushPackage, SigningIdentity};
//! use std::io::Cursor;
//!
//! let identity = SigningIdentity::from_p12(&std::fs::read("website.p12")?, "secret")?;
//!
//! let mut package = PushPackage::new(Cursor::new(Vec::new()));
//! package.add_file("icon.iconset/icon_16x16.png", std::fs::File::open("icon_16x16.png")?)?;
//! package.add_bytes("website.json", br#"{"websiteName":"Example"}"#)?;
//! let archive = package.finalize(&identity)?.into_inner();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod source;
pub mod verify;
pub mod website;

pub use source::{build_from_dir, collect_files, write_package, SourceFile};
pub use verify::verify_package;
pub use website::{Website, WEBSITE_ENTRY};

use crate::checksum::copy_and_checksum;
use crate::crypto::SigningIdentity;
use crate::manifest::{validate_entry_path, Manifest, MANIFEST_ENTRY, SIGNATURE_ENTRY};
use crate::signer::PackageSigner;
use crate::{Error, Result};
use serde::Serialize;
use std::fmt;
use std::io::{self, Read, Seek, SeekFrom, Write};
use tempfile::SpooledTempFile;
use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

/// Progress of a single package build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    /// Nothing written yet.
    Empty,
    /// At least one asset written; more may follow.
    WritingFiles,
    /// `manifest.json` written; assets are frozen.
    ManifestReady,
    /// `signature` written; only finalization remains.
    Signed,
    /// Central directory written. Terminal.
    Finalized,
    /// A step failed and the archive was discarded. Terminal.
    Failed,
}

impl fmt::Display for BuildState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BuildState::Empty => "empty",
            BuildState::WritingFiles => "writing files",
            BuildState::ManifestReady => "manifest ready",
            BuildState::Signed => "signed",
            BuildState::Finalized => "finalized",
            BuildState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Staged archives larger than this spill from memory to a temporary file.
const STAGING_MEMORY_LIMIT: usize = 4 * 1024 * 1024;

/// Name reported when copying the finished archive to its destination fails.
pub const ARCHIVE_OUTPUT: &str = "archive";

/// Options shared by every entry: stored, with a fixed timestamp so the same
/// inputs always produce the same archive bytes.
fn entry_options() -> SimpleFileOptions {
    SimpleFileOptions::default()
        .compression_method(CompressionMethod::Stored)
        .last_modified_time(DateTime::default())
        .unix_permissions(0o644)
}

/// Builder for one push package archive.
///
/// `W` is the archive destination, e.g. a `Vec<u8>` or a file. Entries are
/// written to the staging area `S` and nothing reaches `W` before
/// [`finish`](Self::finish). If copying to `W` itself fails, `W` may hold a
/// truncated archive; [`write_package`] never leaves such a file behind.
pub struct PushPackage<W: Write, S: Read + Write + Seek = SpooledTempFile> {
    writer: W,
    zip: Option<ZipWriter<S>>,
    manifest: Manifest,
    manifest_bytes: Option<Vec<u8>>,
    state: BuildState,
}

impl<W: Write> PushPackage<W> {
    /// Start an empty package destined for `writer`.
    ///
    /// The archive is staged in memory and spills to an anonymous temporary
    /// file once it grows past a few megabytes.
    pub fn new(writer: W) -> Self {
        Self::with_staging(writer, SpooledTempFile::new(STAGING_MEMORY_LIMIT))
    }
}

impl<W: Write, S: Read + Write + Seek> PushPackage<W, S> {
    /// Start an empty package that stages its archive in `staging`.
    ///
    /// `staging` should be empty; it is dropped with the package.
    pub fn with_staging(writer: W, staging: S) -> Self {
        Self {
            writer,
            zip: Some(ZipWriter::new(staging)),
            manifest: Manifest::new(),
            manifest_bytes: None,
            state: BuildState::Empty,
        }
    }

    pub fn state(&self) -> BuildState {
        self.state
    }

    /// Digests recorded so far, in the order assets were added.
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Serialized manifest, once [`write_manifest`](Self::write_manifest) has run.
    pub fn manifest_bytes(&self) -> Option<&[u8]> {
        self.manifest_bytes.as_deref()
    }

    /// Stream `reader` into the archive as `path`, recording its digest.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidPath`] if `path` is not a valid relative package path
    /// - [`Error::DuplicatePath`] if `path` was already added
    /// - [`Error::ReadFailure`] / [`Error::WriteFailure`] if the copy fails
    /// - [`Error::ArchiveWrite`] if the entry cannot be started
    ///
    /// Every error except [`Error::InvalidState`] leaves the package failed.
    pub fn add_file<R: Read>(&mut self, path: &str, mut reader: R) -> Result<()> {
        self.expect_state("add a file", &[BuildState::Empty, BuildState::WritingFiles])?;
        let result = self.write_asset(path, &mut reader);
        self.settle(result, BuildState::WritingFiles)
    }

    /// Add an in-memory asset.
    pub fn add_bytes(&mut self, path: &str, data: &[u8]) -> Result<()> {
        self.add_file(path, data)
    }

    /// Serialize `value` as JSON and add it as an asset (e.g. `website.json`).
    pub fn add_json<T: Serialize>(&mut self, path: &str, value: &T) -> Result<()> {
        self.expect_state("add a file", &[BuildState::Empty, BuildState::WritingFiles])?;
        let data = match serde_json::to_vec(value) {
            Ok(data) => data,
            Err(e) => return self.settle(Err(e.into()), BuildState::Failed),
        };
        self.add_bytes(path, &data)
    }

    /// Freeze the asset list and write `manifest.json`.
    ///
    /// Returns the exact bytes written, which are also the bytes that will
    /// be signed.
    pub fn write_manifest(&mut self) -> Result<&[u8]> {
        self.expect_state(
            "write the manifest",
            &[BuildState::Empty, BuildState::WritingFiles],
        )?;
        let result = self.write_manifest_entry();
        self.settle(result, BuildState::ManifestReady)?;
        Ok(self.manifest_bytes.as_deref().unwrap_or_default())
    }

    /// Sign the written manifest and add the `signature` entry.
    pub fn sign(&mut self, signer: &PackageSigner<'_>) -> Result<()> {
        self.expect_state("sign", &[BuildState::ManifestReady])?;
        let result = self.write_signature_entry(signer);
        self.settle(result, BuildState::Signed)
    }

    /// Write the central directory, copy the archive to the destination and
    /// hand the destination back.
    pub fn finish(mut self) -> Result<W> {
        self.expect_state("finish", &[BuildState::Signed])?;
        let zip = self.take_zip()?;
        let mut staging = zip.finish().map_err(|source| Error::ArchiveWrite {
            entry: "central directory".into(),
            source,
        })?;

        let mut writer = self.writer;
        let size = copy_staged(&mut staging, &mut writer).map_err(|source| Error::WriteFailure {
            path: ARCHIVE_OUTPUT.into(),
            source,
        })?;
        self.state = BuildState::Finalized;
        info!(assets = self.manifest.len(), bytes = size, "push package finalized");
        Ok(writer)
    }

    /// Run the remaining steps: manifest (if not yet written), signature, finish.
    pub fn finalize(mut self, identity: &SigningIdentity) -> Result<W> {
        if matches!(self.state, BuildState::Empty | BuildState::WritingFiles) {
            self.write_manifest()?;
        }
        self.sign(&PackageSigner::new(identity))?;
        self.finish()
    }

    fn expect_state(&self, operation: &'static str, allowed: &[BuildState]) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(Error::InvalidState {
                operation,
                state: self.state,
            })
        }
    }

    /// Move to `next` on success; on failure drop the staged archive and mark the package failed.
    fn settle<T>(&mut self, result: Result<T>, next: BuildState) -> Result<T> {
        match result {
            Ok(value) => {
                self.state = next;
                Ok(value)
            }
            Err(e) => {
                self.zip = None;
                self.state = BuildState::Failed;
                Err(e)
            }
        }
    }

    fn zip_mut(&mut self) -> Result<&mut ZipWriter<S>> {
        let state = self.state;
        self.zip.as_mut().ok_or(Error::InvalidState {
            operation: "write to the archive",
            state,
        })
    }

    fn take_zip(&mut self) -> Result<ZipWriter<S>> {
        self.zip.take().ok_or(Error::InvalidState {
            operation: "finish",
            state: self.state,
        })
    }

    fn start_entry(&mut self, name: &str) -> Result<()> {
        self.zip_mut()?
            .start_file(name, entry_options())
            .map_err(|source| Error::ArchiveWrite {
                entry: name.to_string(),
                source,
            })
    }

    fn write_asset(&mut self, path: &str, reader: &mut dyn Read) -> Result<()> {
        validate_entry_path(path)?;
        if self.manifest.contains(path) {
            return Err(Error::DuplicatePath(path.to_string()));
        }

        self.start_entry(path)?;
        let digest = copy_and_checksum(self.zip_mut()?, reader).map_err(|e| e.at(path))?;
        debug!(path, digest = %digest, "added asset");

        self.manifest.insert(path, digest)
    }

    fn write_manifest_entry(&mut self) -> Result<()> {
        let bytes = self.manifest.to_json_bytes()?;

        self.start_entry(MANIFEST_ENTRY)?;
        self.zip_mut()?
            .write_all(&bytes)
            .map_err(|source| Error::WriteFailure {
                path: MANIFEST_ENTRY.into(),
                source,
            })?;
        debug!(entries = self.manifest.len(), "wrote manifest");

        self.manifest_bytes = Some(bytes);
        Ok(())
    }

    fn write_signature_entry(&mut self, signer: &PackageSigner<'_>) -> Result<()> {
        let manifest_bytes = self.manifest_bytes.as_deref().ok_or(Error::InvalidState {
            operation: "sign",
            state: self.state,
        })?;
        let signature = signer.sign(manifest_bytes)?;

        self.start_entry(SIGNATURE_ENTRY)?;
        self.zip_mut()?
            .write_all(signature.as_bytes())
            .map_err(|source| Error::WriteFailure {
                path: SIGNATURE_ENTRY.into(),
                source,
            })
    }
}

fn copy_staged<S: Read + Seek, W: Write>(staging: &mut S, writer: &mut W) -> io::Result<u64> {
    staging.seek(SeekFrom::Start(0))?;
    let size = io::copy(staging, writer)?;
    writer.flush()?;
    Ok(size)
}

/// Build a complete package from `entries` in one call.
///
/// Entries are written in iteration order. The first failure aborts the
/// build and nothing is returned but the error.
pub fn build_package<W, R, I>(writer: W, entries: I, identity: &SigningIdentity) -> Result<W>
where
    W: Write,
    R: Read,
    I: IntoIterator<Item = FileEntry<R>>,
{
    let mut package = PushPackage::new(writer);
    for entry in entries {
        package.add_file(&entry.path, entry.content)?;
    }
    package.finalize(identity)
}

/// One asset to package: its relative path and a reader over its content.
///
/// The content is read exactly once, while it is written into the archive.
#[derive(Debug)]
pub struct FileEntry<R> {
    pub path: String,
    pub content: R,
}

impl<R: Read> FileEntry<R> {
    pub fn new(path: impl Into<String>, content: R) -> Self {
        Self {
            path: path.into(),
            content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::sha512_hex;
    use crate::crypto::testutil::generate_identity;
    use std::cell::Cell;
    use std::io::{self, Cursor};
    use std::rc::Rc;
    use zip::ZipArchive;

    fn entry_names(archive: &[u8]) -> Vec<String> {
        let zip = ZipArchive::new(Cursor::new(archive)).unwrap();
        zip.file_names().map(str::to_string).collect()
    }

    struct BrokenReader;

    impl Read for BrokenReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "no access"))
        }
    }

    /// Staging area that accepts a shared byte budget and then reports a full disk.
    struct BudgetedStaging {
        inner: Cursor<Vec<u8>>,
        budget: Rc<Cell<usize>>,
    }

    impl BudgetedStaging {
        fn new(budget: usize) -> (Self, Rc<Cell<usize>>) {
            let budget = Rc::new(Cell::new(budget));
            let staging = Self {
                inner: Cursor::new(Vec::new()),
                budget: Rc::clone(&budget),
            };
            (staging, budget)
        }
    }

    impl Write for BudgetedStaging {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let left = self.budget.get();
            if left == 0 {
                return Err(io::Error::other("disk full"));
            }
            let n = self.inner.write(&buf[..left.min(buf.len())])?;
            self.budget.set(left - n);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Read for BudgetedStaging {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.inner.read(buf)
        }
    }

    impl Seek for BudgetedStaging {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            self.inner.seek(pos)
        }
    }

    /// Destination that rejects every write.
    #[derive(Debug)]
    struct FullDisk;

    impl Write for FullDisk {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Entry a write error refers to, whichever layer reported it.
    fn failed_entry(err: &Error) -> Option<&str> {
        match err {
            Error::WriteFailure { path, .. } => Some(path),
            Error::ArchiveWrite { entry, .. } => Some(entry),
            _ => None,
        }
    }

    #[test]
    fn test_state_progression() {
        let identity = generate_identity("Website Push ID: web.com.example");
        let mut package = PushPackage::new(Cursor::new(Vec::new()));
        assert_eq!(package.state(), BuildState::Empty);

        package.add_bytes("icon.png", b"X").unwrap();
        assert_eq!(package.state(), BuildState::WritingFiles);

        let bytes = package.write_manifest().unwrap().to_vec();
        assert_eq!(package.state(), BuildState::ManifestReady);
        assert_eq!(bytes, package.manifest().to_json_bytes().unwrap());

        package.sign(&PackageSigner::new(&identity)).unwrap();
        assert_eq!(package.state(), BuildState::Signed);

        let archive = package.finish().unwrap().into_inner();
        assert_eq!(entry_names(&archive).len(), 3);
    }

    #[test]
    fn test_layout_order() {
        let identity = generate_identity("Website Push ID: web.com.example");
        let mut package = PushPackage::new(Cursor::new(Vec::new()));
        package.add_bytes("website.json", b"{}").unwrap();
        package.add_bytes("icon.iconset/icon_16x16.png", b"png").unwrap();

        let archive = package.finalize(&identity).unwrap().into_inner();
        let mut zip = ZipArchive::new(Cursor::new(archive)).unwrap();

        let names: Vec<String> = (0..zip.len())
            .map(|i| zip.by_index(i).unwrap().name().to_string())
            .collect();
        assert_eq!(
            names,
            ["website.json", "icon.iconset/icon_16x16.png", "manifest.json", "signature"]
        );
        for i in 0..zip.len() {
            assert_eq!(zip.by_index(i).unwrap().compression(), CompressionMethod::Stored);
        }
    }

    #[test]
    fn test_sign_before_manifest_is_rejected() {
        let identity = generate_identity("Website Push ID: web.com.example");
        let mut package = PushPackage::new(Cursor::new(Vec::new()));
        package.add_bytes("icon.png", b"X").unwrap();

        let err = package.sign(&PackageSigner::new(&identity)).unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidState { state: BuildState::WritingFiles, .. }
        ));
        // An out-of-order call does not poison the build.
        assert_eq!(package.state(), BuildState::WritingFiles);
    }

    #[test]
    fn test_add_after_manifest_is_rejected() {
        let mut package = PushPackage::new(Cursor::new(Vec::new()));
        package.add_bytes("icon.png", b"X").unwrap();
        package.write_manifest().unwrap();

        let err = package.add_bytes("late.png", b"Y").unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidState { state: BuildState::ManifestReady, .. }
        ));
        assert!(!package.manifest().contains("late.png"));
    }

    #[test]
    fn test_finish_requires_signature() {
        let mut package = PushPackage::new(Cursor::new(Vec::new()));
        package.write_manifest().unwrap();

        let err = package.finish().unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidState { state: BuildState::ManifestReady, .. }
        ));
    }

    #[test]
    fn test_duplicate_path_fails_build() {
        let identity = generate_identity("Website Push ID: web.com.example");
        let mut package = PushPackage::new(Cursor::new(Vec::new()));
        package.add_bytes("icon.png", b"X").unwrap();

        let err = package.add_bytes("icon.png", b"Y").unwrap_err();
        assert!(matches!(err, Error::DuplicatePath(ref p) if p == "icon.png"));
        assert_eq!(package.state(), BuildState::Failed);
        assert_eq!(package.manifest().get("icon.png"), Some(sha512_hex(b"X").as_str()));

        let err = package.finalize(&identity).unwrap_err();
        assert!(matches!(err, Error::InvalidState { state: BuildState::Failed, .. }));
    }

    #[test]
    fn test_read_failure_names_asset() {
        let mut package = PushPackage::new(Cursor::new(Vec::new()));
        let err = package.add_file("icon.png", BrokenReader).unwrap_err();

        match err {
            Error::ReadFailure { path, source } => {
                assert_eq!(path, "icon.png");
                assert_eq!(source.kind(), io::ErrorKind::PermissionDenied);
            }
            other => panic!("expected read failure, got {other:?}"),
        }
        assert_eq!(package.state(), BuildState::Failed);
        assert!(package.manifest().is_empty());
    }

    #[test]
    fn test_invalid_path_fails_build() {
        let mut package = PushPackage::new(Cursor::new(Vec::new()));
        let err = package.add_bytes("manifest.json", b"{}").unwrap_err();
        assert!(matches!(err, Error::InvalidPath { .. }));
        assert_eq!(package.state(), BuildState::Failed);
    }

    #[test]
    fn test_signing_failure_fails_build() {
        let identity = generate_identity("Website Push ID: web.com.example");
        let signer = PackageSigner::new(&identity).at(chrono::Utc::now() + chrono::Duration::days(30));

        let mut package = PushPackage::new(Cursor::new(Vec::new()));
        package.add_bytes("icon.png", b"X").unwrap();
        package.write_manifest().unwrap();

        let err = package.sign(&signer).unwrap_err();
        assert!(matches!(err, Error::Signing(_)));
        assert_eq!(package.state(), BuildState::Failed);
    }

    #[test]
    fn test_add_json_writes_serialized_value() {
        let identity = generate_identity("Website Push ID: web.com.example");
        let website = Website {
            website_name: "Example".into(),
            website_push_id: "web.com.example".into(),
            allowed_domains: vec!["https://example.com".into()],
            url_format_string: "https://example.com/%@".into(),
            authentication_token: "19f8d7a6e9fb8a7f6d9330dabe".into(),
            web_service_url: "https://example.com/push".into(),
        };

        let mut package = PushPackage::new(Cursor::new(Vec::new()));
        package.add_json(WEBSITE_ENTRY, &website).unwrap();
        let expected = serde_json::to_vec(&website).unwrap();
        assert_eq!(
            package.manifest().get(WEBSITE_ENTRY),
            Some(sha512_hex(&expected).as_str())
        );

        let archive = package.finalize(&identity).unwrap().into_inner();
        let mut zip = ZipArchive::new(Cursor::new(archive)).unwrap();
        let mut stored = Vec::new();
        zip.by_name(WEBSITE_ENTRY).unwrap().read_to_end(&mut stored).unwrap();
        assert_eq!(stored, expected);
    }

    #[test]
    fn test_build_package_from_entries() {
        let identity = generate_identity("Website Push ID: web.com.example");
        let entries = vec![
            FileEntry::new("icon.png", &b"X"[..]),
            FileEntry::new("icon@2x.png", &b"Y"[..]),
        ];

        let archive = build_package(Cursor::new(Vec::new()), entries, &identity)
            .unwrap()
            .into_inner();
        assert_eq!(
            entry_names(&archive),
            ["icon.png", "icon@2x.png", "manifest.json", "signature"]
        );
    }

    #[test]
    fn test_manifest_bytes_are_deterministic() {
        let build = || {
            let mut package = PushPackage::new(Cursor::new(Vec::new()));
            package.add_bytes("icon.png", b"X").unwrap();
            package.write_manifest().unwrap().to_vec()
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn test_failed_build_leaves_destination_untouched() {
        let identity = generate_identity("Website Push ID: web.com.example");
        let expired =
            PackageSigner::new(&identity).at(chrono::Utc::now() + chrono::Duration::days(30));
        let mut out = Vec::new();

        let mut package = PushPackage::new(&mut out);
        package.add_bytes("icon.png", b"X").unwrap();
        package.write_manifest().unwrap();
        assert!(matches!(package.sign(&expired), Err(Error::Signing(_))));
        drop(package);

        assert!(out.is_empty());
    }

    #[test]
    fn test_destination_receives_nothing_before_finish() {
        let identity = generate_identity("Website Push ID: web.com.example");
        let mut out = Vec::new();

        let mut package = PushPackage::new(&mut out);
        package.add_bytes("icon.png", b"X").unwrap();
        package.write_manifest().unwrap();
        package.sign(&PackageSigner::new(&identity)).unwrap();
        package.finish().unwrap();

        assert_eq!(entry_names(&out), ["icon.png", "manifest.json", "signature"]);
    }

    #[test]
    fn test_asset_write_failure_fails_build() {
        let (staging, _) = BudgetedStaging::new(1000);
        let mut out = Vec::new();
        let mut package = PushPackage::with_staging(&mut out, staging);

        let err = package.add_bytes("icon.png", &[7u8; 8192]).unwrap_err();

        match err {
            Error::WriteFailure { ref path, ref source } => {
                assert_eq!(path, "icon.png");
                assert_eq!(source.to_string(), "disk full");
            }
            other => panic!("expected write failure, got {other:?}"),
        }
        assert_eq!(package.state(), BuildState::Failed);
        assert!(!package.manifest().contains("icon.png"));
        drop(package);
        assert!(out.is_empty());
    }

    #[test]
    fn test_manifest_write_failure_fails_build() {
        let (staging, budget) = BudgetedStaging::new(usize::MAX);
        let mut package = PushPackage::with_staging(Vec::new(), staging);
        package.add_bytes("icon.png", b"X").unwrap();

        budget.set(20);
        let err = package.write_manifest().unwrap_err();

        assert_eq!(failed_entry(&err), Some(MANIFEST_ENTRY), "{err}");
        assert_eq!(package.state(), BuildState::Failed);
        assert!(package.manifest_bytes().is_none());
    }

    #[test]
    fn test_signature_write_failure_fails_build() {
        let identity = generate_identity("Website Push ID: web.com.example");
        let (staging, budget) = BudgetedStaging::new(usize::MAX);
        let mut package = PushPackage::with_staging(Vec::new(), staging);
        package.add_bytes("icon.png", b"X").unwrap();
        package.write_manifest().unwrap();

        budget.set(50);
        let err = package.sign(&PackageSigner::new(&identity)).unwrap_err();

        assert_eq!(failed_entry(&err), Some(SIGNATURE_ENTRY), "{err}");
        assert_eq!(package.state(), BuildState::Failed);
    }

    #[test]
    fn test_central_directory_failure_fails_finish() {
        let identity = generate_identity("Website Push ID: web.com.example");
        let (staging, budget) = BudgetedStaging::new(usize::MAX);
        let mut out = Vec::new();
        let mut package = PushPackage::with_staging(&mut out, staging);
        package.add_bytes("icon.png", b"X").unwrap();
        package.write_manifest().unwrap();
        package.sign(&PackageSigner::new(&identity)).unwrap();

        budget.set(10);
        let err = package.finish().unwrap_err();

        assert!(
            matches!(err, Error::ArchiveWrite { ref entry, .. } if entry == "central directory"),
            "{err}"
        );
        assert!(out.is_empty());
    }

    #[test]
    fn test_destination_failure_is_reported() {
        let identity = generate_identity("Website Push ID: web.com.example");
        let mut package = PushPackage::new(FullDisk);
        package.add_bytes("icon.png", b"X").unwrap();

        let err = package.finalize(&identity).unwrap_err();

        assert!(
            matches!(err, Error::WriteFailure { ref path, .. } if path == ARCHIVE_OUTPUT),
            "{err}"
        );
    }
}
