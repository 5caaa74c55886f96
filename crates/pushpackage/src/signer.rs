//! Manifest signing.
//!
//! [`PackageSigner`] turns a [`Manifest`] into the pair of artifacts stored in
//! a push package: the canonical manifest bytes and a detached CMS signature
//! over exactly those bytes. Before signing it checks that the identity can
//! actually produce a signature a consumer would accept: the certificate must
//! be within its validity window at the signing time and the private key must
//! belong to the certificate.

use crate::crypto::cms::sign_detached;
use crate::crypto::SigningIdentity;
use crate::manifest::Manifest;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use tracing::debug;
use x509_certificate::Sign;

/// Detached signature bytes (DER-encoded CMS `SignedData`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature(Vec<u8>);

impl Signature {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }
}

impl AsRef<[u8]> for Signature {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Serialized manifest together with the signature that covers it.
#[derive(Debug, Clone)]
pub struct SignedManifest {
    pub manifest_bytes: Vec<u8>,
    pub signature: Signature,
}

/// Signs manifests with a borrowed [`SigningIdentity`].
///
/// The signer holds no mutable state; several builds may each create one
/// over the same identity.
#[derive(Debug, Clone, Copy)]
pub struct PackageSigner<'a> {
    identity: &'a SigningIdentity,
    signing_time: Option<DateTime<Utc>>,
}

impl<'a> PackageSigner<'a> {
    pub fn new(identity: &'a SigningIdentity) -> Self {
        Self {
            identity,
            signing_time: None,
        }
    }

    /// Check certificate validity against `time` instead of the current clock.
    pub fn at(mut self, time: DateTime<Utc>) -> Self {
        self.signing_time = Some(time);
        self
    }

    /// Confirm the identity is usable for signing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Signing`] if the certificate is expired or not yet
    /// valid, or if the private key does not match the certificate.
    pub fn check_identity(&self) -> Result<()> {
        let now = self.signing_time.unwrap_or_else(Utc::now);
        let cert = &self.identity.certificate;

        let not_before = cert.validity_not_before();
        let not_after = cert.validity_not_after();
        if now < not_before {
            return Err(Error::Signing(format!(
                "Certificate is not valid until {}",
                not_before.to_rfc3339()
            )));
        }
        if now > not_after {
            return Err(Error::Signing(format!(
                "Certificate expired at {}",
                not_after.to_rfc3339()
            )));
        }

        if self.identity.signing_key.public_key_data().as_ref() != cert.public_key_data().as_ref() {
            return Err(Error::Signing(
                "Private key does not match certificate public key".into(),
            ));
        }

        Ok(())
    }

    /// Produce a detached signature over exactly `manifest_bytes`.
    pub fn sign(&self, manifest_bytes: &[u8]) -> Result<Signature> {
        self.check_identity()?;

        let der = sign_detached(
            manifest_bytes,
            &self.identity.signing_key,
            &self.identity.certificate,
            &self.identity.cert_chain,
        )?;
        debug!(
            manifest_len = manifest_bytes.len(),
            signature_len = der.len(),
            "signed manifest"
        );
        Ok(Signature(der))
    }

    /// Serialize `manifest` canonically and sign the result.
    pub fn sign_manifest(&self, manifest: &Manifest) -> Result<SignedManifest> {
        let manifest_bytes = manifest.to_json_bytes()?;
        let signature = self.sign(&manifest_bytes)?;
        Ok(SignedManifest {
            manifest_bytes,
            signature,
        })
    }
}
