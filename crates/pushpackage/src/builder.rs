//! PushPackager builder API
//!
//! Provides a builder pattern interface for producing signed push packages
//! from credentials on disk.

use crate::crypto::SigningIdentity;
use crate::manifest::Manifest;
use crate::package::{verify_package, write_package};
use crate::signer::PackageSigner;
use crate::{Error, Result};
use secrecy::{ExposeSecret, SecretString};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Push package tool with builder pattern API.
///
/// # Example
///
/// ```no_run
/// use pushpackage::PushPackager;
///
/// PushPackager::new()
///     .pkcs12("website.p12")
///     .password("secret")
///     .build_dir("pushPackage.raw", "pushPackage.zip")?;
/// # Ok::<(), pushpackage::Error>(())
/// ```
#[derive(Clone)]
pub struct PushPackager {
    certificate: Option<PathBuf>,
    private_key: Option<PathBuf>,
    pkcs12: Option<PathBuf>,
    password: Option<SecretString>,
}

impl PushPackager {
    /// Create a new PushPackager builder.
    pub fn new() -> Self {
        Self {
            certificate: None,
            private_key: None,
            pkcs12: None,
            password: None,
        }
    }

    /// Set certificate file path (PEM format, optionally followed by the chain).
    ///
    /// Use together with `private_key()`.
    /// Alternatively, use `pkcs12()` for PKCS#12 files that contain both.
    pub fn certificate(mut self, path: impl AsRef<Path>) -> Self {
        self.certificate = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set private key file path (unencrypted PKCS#8 PEM).
    ///
    /// Use together with `certificate()`.
    pub fn private_key(mut self, path: impl AsRef<Path>) -> Self {
        self.private_key = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set PKCS#12 file path (.p12 format).
    ///
    /// Use `password()` to set the decryption password.
    pub fn pkcs12(mut self, path: impl AsRef<Path>) -> Self {
        self.pkcs12 = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set password for the PKCS#12 file.
    ///
    /// The password is stored securely and will be zeroized when dropped.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(SecretString::new(password.into()));
        self
    }

    /// Validate the builder configuration.
    ///
    /// Returns an error if:
    /// - Both PKCS#12 and PEM credentials are specified
    /// - Neither PKCS#12 nor PEM credentials are specified
    /// - Only one of certificate/private_key is specified (need both)
    pub fn validate(&self) -> Result<()> {
        let has_p12 = self.pkcs12.is_some();
        let has_pem = self.certificate.is_some() || self.private_key.is_some();

        if has_p12 && has_pem {
            return Err(Error::Config(
                "Cannot specify both PKCS#12 and PEM certificate/key".into(),
            ));
        }

        if !has_p12 && !has_pem {
            return Err(Error::MissingCredentials(
                "Must specify either PKCS#12 or certificate/key pair".into(),
            ));
        }

        if has_pem && (self.certificate.is_none() || self.private_key.is_none()) {
            return Err(Error::MissingCredentials(
                "Both certificate and private key must be specified".into(),
            ));
        }

        Ok(())
    }

    /// Load the signing identity from the configured paths.
    ///
    /// Uses PKCS#12 if configured, otherwise the separate certificate and
    /// private key. An empty password is used for a PKCS#12 file when none
    /// is set.
    pub fn load_identity(&self) -> Result<SigningIdentity> {
        self.validate()?;

        if let Some(ref p12) = self.pkcs12 {
            let data = read_credential(p12)?;
            let password = self
                .password
                .as_ref()
                .map(|p| p.expose_secret().as_str())
                .unwrap_or("");
            return SigningIdentity::from_p12(&data, password);
        }

        let cert = self
            .certificate
            .as_ref()
            .ok_or_else(|| Error::Certificate("No certificate configured".into()))?;
        let key = self
            .private_key
            .as_ref()
            .ok_or_else(|| Error::Certificate("No private key configured".into()))?;
        if self.password.is_some() {
            warn!("password is ignored for PEM credentials");
        }
        SigningIdentity::from_pem(&read_credential(cert)?, &read_credential(key)?)
    }

    /// Build a signed push package from the files under `source`.
    ///
    /// The identity is checked before any file is read, so an expired or
    /// mismatched certificate fails fast. Nothing is written to `output`
    /// unless the whole build succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Credentials cannot be loaded
    /// - The certificate is not usable for signing
    /// - A source file cannot be read or has an invalid name
    /// - The output archive cannot be written
    pub fn build_dir(&self, source: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<()> {
        let identity = self.load_identity()?;
        PackageSigner::new(&identity).check_identity()?;

        debug!(
            source = %source.as_ref().display(),
            signer = identity.common_name().as_deref().unwrap_or("unknown"),
            "building push package"
        );
        write_package(source, output, &identity)
    }

    /// Verify an existing push package, returning its manifest.
    ///
    /// Needs no credentials.
    pub fn verify(&self, package: impl AsRef<Path>) -> Result<Manifest> {
        let package = package.as_ref();
        let file = File::open(package).map_err(|source| Error::ReadFailure {
            path: package.display().to_string(),
            source,
        })?;
        verify_package(BufReader::new(file))
    }
}

impl Default for PushPackager {
    fn default() -> Self {
        Self::new()
    }
}

fn read_credential(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| {
        Error::Certificate(format!("Failed to read {}: {}", path.display(), e))
    })
}
