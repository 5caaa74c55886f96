//! Certificate and private key handling for package signing.
//!
//! This module loads a [`SigningIdentity`] from PEM-encoded data or a PKCS#12
//! (.p12) container. Website Push ID certificates exported from Keychain
//! Access are usually PKCS#12; RSA, ECDSA and Ed25519 keys are accepted.
//!
//! # Supported Formats
//!
//! - **PEM**: certificate (optionally followed by its chain) and an unencrypted PKCS#8 key
//! - **PKCS#12**: certificate, key and chain in a password-protected container
//!
//! # Examples
//!
//! ```no_run
//! use pushpackage::SigningIdentity;
//!
//! let p12_data = std::fs::read("website_aps_production.p12")?;
//! let identity = SigningIdentity::from_p12(&p12_data, "password")?;
//!
//! let cert_pem = std::fs::read("certificate.pem")?;
//! let key_pem = std::fs::read("private_key.pem")?;
//! let identity = SigningIdentity::from_pem(&cert_pem, &key_pem)?;
//! # Ok::<(), pushpackage::Error>(())
//! ```

use crate::{Error, Result};
use x509_certificate::{CapturedX509Certificate, InMemorySigningKeyPair};

/// Signing identity: certificate, private key, and certificate chain.
///
/// The identity is never mutated after construction, so a single instance can
/// be shared by reference between concurrent package builds.
///
/// # Security
///
/// The private key contained in this struct should be treated as sensitive data.
/// Avoid logging or exposing [`SigningIdentity`] instances.
pub struct SigningIdentity {
    /// X.509 certificate whose key signs the manifest.
    pub certificate: CapturedX509Certificate,

    /// Private key corresponding to the certificate's public key.
    pub signing_key: InMemorySigningKeyPair,

    /// Intermediate CA certificates embedded in the signature.
    pub cert_chain: Vec<CapturedX509Certificate>,
}

impl SigningIdentity {
    /// Assemble an identity from already-parsed parts.
    pub fn new(
        certificate: CapturedX509Certificate,
        signing_key: InMemorySigningKeyPair,
        cert_chain: Vec<CapturedX509Certificate>,
    ) -> Self {
        Self {
            certificate,
            signing_key,
            cert_chain,
        }
    }

    /// Load an identity from PEM-encoded certificate(s) and a PKCS#8 private key.
    ///
    /// The first certificate in `cert_pem` is the signing certificate; any
    /// that follow are kept as the chain.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Certificate`] if:
    /// - The certificate PEM is malformed or contains no certificate
    /// - The private key PEM is malformed or not valid PKCS#8
    pub fn from_pem(cert_pem: &[u8], key_pem: &[u8]) -> Result<Self> {
        let mut certs = CapturedX509Certificate::from_pem_multiple(cert_pem)
            .map_err(|e| Error::Certificate(format!("Failed to parse certificate PEM: {}", e)))?;

        if certs.is_empty() {
            return Err(Error::Certificate("No certificate in PEM data".into()));
        }
        let certificate = certs.remove(0);

        let signing_key = InMemorySigningKeyPair::from_pkcs8_pem(key_pem)
            .map_err(|e| Error::Certificate(format!("Failed to parse private key PEM: {}", e)))?;

        Ok(Self::new(certificate, signing_key, certs))
    }

    /// Load an identity from a PKCS#12 (.p12) container.
    ///
    /// The first certificate in the container is taken as the signing
    /// certificate and the remaining ones as its chain.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Certificate`] if:
    /// - The PKCS#12 data is malformed
    /// - The password is incorrect
    /// - No certificate or no private key is found in the container
    ///
    /// # Security
    ///
    /// The password is used only during parsing and is not stored in the
    /// returned [`SigningIdentity`].
    pub fn from_p12(p12_data: &[u8], password: &str) -> Result<Self> {
        let pfx = p12::PFX::parse(p12_data)
            .map_err(|e| Error::Certificate(format!("Failed to parse PKCS#12: {:?}", e)))?;

        let keys = pfx
            .key_bags(password)
            .map_err(|e| Error::Certificate(format!("Failed to extract keys from PKCS#12: {:?}", e)))?;

        let certs = pfx
            .cert_x509_bags(password)
            .map_err(|e| Error::Certificate(format!("Failed to extract certs from PKCS#12: {:?}", e)))?;

        if certs.is_empty() {
            return Err(Error::Certificate("No certificate in PKCS#12".into()));
        }
        if keys.is_empty() {
            return Err(Error::Certificate("No private key in PKCS#12".into()));
        }

        let certificate = CapturedX509Certificate::from_der(certs[0].clone())
            .map_err(|e| Error::Certificate(format!("Failed to parse certificate DER: {}", e)))?;

        let signing_key = InMemorySigningKeyPair::from_pkcs8_der(&keys[0])
            .map_err(|e| Error::Certificate(format!("Failed to parse private key DER: {}", e)))?;

        let cert_chain = certs
            .iter()
            .skip(1)
            .filter_map(|der| CapturedX509Certificate::from_der(der.clone()).ok())
            .collect();

        Ok(Self::new(certificate, signing_key, cert_chain))
    }

    /// Common name of the signing certificate, if it has one.
    ///
    /// For Website Push ID certificates this reads `Website Push ID: <id>`.
    pub fn common_name(&self) -> Option<String> {
        self.certificate.subject_common_name()
    }
}

impl std::fmt::Debug for SigningIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningIdentity")
            .field("subject", &self.common_name())
            .field("chain_len", &self.cert_chain.len())
            .finish_non_exhaustive()
    }
}
