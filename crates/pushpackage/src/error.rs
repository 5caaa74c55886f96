//! Error types for push package operations.
//!
//! This module defines the [`enum@Error`] enum covering every failure in the
//! build pipeline (reading assets, writing the archive, signing the manifest),
//! plus identity loading, package verification, and payload validation.
//!
//! Each variant carries the file or stage it failed at, so callers can tell
//! which asset or step aborted the build without re-running it.
//!
//! # See Also
//!
//! - [`crate::Result`] - Convenience type alias using this error

use crate::package::BuildState;
use thiserror::Error;

/// Error type for push package operations.
///
/// All public functions in this crate return [`crate::Result<T>`], which uses this error type.
/// Match on variants to handle specific failure cases.
///
/// # Examples
///
/// ```no_run
/// use pushpackage::{Error, PushPackager};
///
/// let result = PushPackager::new()
///     .pkcs12("website.p12")
///     .build_dir("pushPackage.raw", "pushPackage.zip");
/// match result {
///     Ok(()) => println!("Package written"),
///     Err(Error::DuplicatePath(path)) => eprintln!("Listed twice: {path}"),
///     Err(Error::Signing(msg)) => eprintln!("Identity unusable: {msg}"),
///     Err(e) => eprintln!("Other error: {e}"),
/// }
/// ```
#[derive(Debug, Error)]
pub enum Error {
    /// I/O operation failed outside of a specific package entry.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The content of a package asset could not be read.
    ///
    /// The build is aborted; no archive is produced.
    #[error("Failed to read {path}: {source}")]
    ReadFailure {
        /// Relative package path of the asset being read.
        path: String,
        source: std::io::Error,
    },

    /// Bytes could not be written to the destination.
    ///
    /// Raised when streaming an asset into the archive fails, or when the
    /// finished archive cannot be flushed to its output file.
    #[error("Failed to write {path}: {source}")]
    WriteFailure {
        /// Package entry or output path being written.
        path: String,
        source: std::io::Error,
    },

    /// Two assets share the same relative path.
    ///
    /// Entries are never silently overwritten; the build is aborted.
    #[error("Duplicate path in package: {0}")]
    DuplicatePath(String),

    /// An asset path is not a valid relative package path.
    ///
    /// See [`crate::manifest::validate_entry_path`] for the accepted form.
    #[error("Invalid package path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    /// The manifest could not be signed.
    ///
    /// Occurs when the certificate is outside its validity window, the private
    /// key does not belong to the certificate, or the CMS operation fails.
    #[error("Signing failed: {0}")]
    Signing(String),

    /// An archive entry could not be started, or the archive could not be finalized.
    #[error("Archive write failed for {entry}: {source}")]
    ArchiveWrite {
        /// Entry name, or `"central directory"` when finalization failed.
        entry: String,
        source: zip::result::ZipError,
    },

    /// A build step was invoked out of order, or after a failed step.
    #[error("Cannot {operation} while package is {state}")]
    InvalidState {
        operation: &'static str,
        state: BuildState,
    },

    /// Invalid or malformed certificate or private key.
    ///
    /// The signing identity could not be loaded. See
    /// [`crate::SigningIdentity::from_p12`] and [`crate::SigningIdentity::from_pem`].
    #[error("Invalid certificate: {0}")]
    Certificate(String),

    /// Required credentials not configured.
    ///
    /// A build was attempted through [`crate::PushPackager`] without a
    /// PKCS#12 file or a certificate/key pair.
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    /// Invalid builder configuration.
    ///
    /// A configuration value is invalid or conflicting options were specified.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A finished package failed reverification.
    ///
    /// The signature does not cover the embedded manifest, or an asset no
    /// longer matches its recorded digest.
    #[error("Verification failed: {0}")]
    Verification(String),

    /// A notification payload has neither an alert body nor a badge change.
    #[error("Payload must contain an alert body or a badge")]
    IncompletePayload,

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// ZIP archive could not be read.
    ///
    /// Occurs while opening a package for verification.
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}
