//! Detached CMS signatures over manifest bytes
//!
//! Uses cryptographic-message-syntax crate for CMS signature generation and
//! verification. The content is never embedded: the signature covers the
//! `manifest.json` bytes that sit next to it in the package.

use crate::{Error, Result};
use cryptographic_message_syntax::{SignedData, SignedDataBuilder, SignerBuilder};
use x509_certificate::{CapturedX509Certificate, KeyInfoSigner};

/// Generate a detached CMS `SignedData` (DER) over `data`
///
/// # Arguments
///
/// * `data` - The exact bytes to sign
/// * `signing_key` - The private key implementing KeyInfoSigner trait
/// * `signing_cert` - The signing certificate as CapturedX509Certificate
/// * `cert_chain` - Certificate chain (intermediate CAs)
pub fn sign_detached<K: KeyInfoSigner>(
    data: &[u8],
    signing_key: &K,
    signing_cert: &CapturedX509Certificate,
    cert_chain: &[CapturedX509Certificate],
) -> Result<Vec<u8>> {
    let signer = SignerBuilder::new(signing_key, signing_cert.clone());

    let mut builder = SignedDataBuilder::default()
        .content_external(data.to_vec())
        .signer(signer);

    for cert in cert_chain {
        builder = builder.certificate(cert.clone());
    }

    let der = builder
        .build_der()
        .map_err(|e| Error::Signing(format!("Failed to build CMS signature: {}", e)))?;

    Ok(der)
}

/// Verify a detached CMS signature against `data`
///
/// Every signer in the structure must carry a valid signature and a message
/// digest matching `data`. Certificate trust is not evaluated; that is up to
/// the consumer of the package.
pub fn verify_detached(signature: &[u8], data: &[u8]) -> Result<()> {
    let signed_data = SignedData::parse_ber(signature)
        .map_err(|e| Error::Verification(format!("Malformed signature: {}", e)))?;

    let mut signers = 0usize;
    for signer in signed_data.signers() {
        signer
            .verify_signature_with_signed_data(&signed_data)
            .map_err(|e| Error::Verification(format!("Bad signature: {}", e)))?;
        signer
            .verify_message_digest_with_content(data)
            .map_err(|e| Error::Verification(format!("Manifest digest mismatch: {}", e)))?;
        signers += 1;
    }

    if signers == 0 {
        return Err(Error::Verification("Signature has no signers".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::testutil::generate_identity;

    #[test]
    fn test_sign_and_verify() {
        let identity = generate_identity("Website Push ID: web.com.example");
        let data = br#"{"icon.png":"00"}"#;

        let der = sign_detached(data, &identity.signing_key, &identity.certificate, &[]).unwrap();

        assert!(!der.is_empty());
        assert_eq!(der[0], 0x30);
        verify_detached(&der, data).unwrap();
    }

    #[test]
    fn test_signature_is_detached() {
        let identity = generate_identity("Website Push ID: web.com.example");
        let data = b"detached-marker-content-0123456789";

        let der = sign_detached(data, &identity.signing_key, &identity.certificate, &[]).unwrap();

        assert!(!der.windows(data.len()).any(|w| w == data));
    }

    #[test]
    fn test_verify_rejects_modified_content() {
        let identity = generate_identity("Website Push ID: web.com.example");
        let der = sign_detached(b"{}", &identity.signing_key, &identity.certificate, &[]).unwrap();

        let result = verify_detached(&der, b"{ }");
        assert!(matches!(result, Err(Error::Verification(_))));
    }

    #[test]
    fn test_chain_certificates_are_embedded() {
        let identity = generate_identity("Website Push ID: web.com.example");
        let intermediate = generate_identity("Intermediate CA");

        let der = sign_detached(
            b"{}",
            &identity.signing_key,
            &identity.certificate,
            std::slice::from_ref(&intermediate.certificate),
        )
        .unwrap();

        let signed_data = SignedData::parse_ber(&der).unwrap();
        assert!(signed_data.certificates().count() >= 2);
        verify_detached(&der, b"{}").unwrap();
    }

    #[test]
    fn test_verify_rejects_garbage() {
        let result = verify_detached(b"not a signature", b"{}");
        assert!(matches!(result, Err(Error::Verification(_))));
    }
}
