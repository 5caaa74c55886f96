//! Reverification of finished push packages.
//!
//! This is the check a consumer of the package performs: the signature must
//! cover the embedded `manifest.json` bytes exactly, and the manifest must
//! describe exactly the assets in the archive with matching digests.

use crate::checksum::copy_and_checksum;
use crate::crypto::cms::verify_detached;
use crate::manifest::{Manifest, MANIFEST_ENTRY, SIGNATURE_ENTRY};
use crate::{Error, Result};
use std::collections::BTreeSet;
use std::io::{self, Read, Seek};
use tracing::info;
use zip::result::ZipError;
use zip::ZipArchive;

/// Verify the package in `reader`, returning its manifest.
///
/// # Errors
///
/// - [`Error::Zip`] if the archive cannot be opened
/// - [`Error::Verification`] if `manifest.json` or `signature` is missing,
///   the signature does not verify over the manifest bytes, the manifest is
///   not valid JSON, an asset digest differs, or the manifest and the archive
///   list different assets
pub fn verify_package<R: Read + Seek>(reader: R) -> Result<Manifest> {
    let mut archive = ZipArchive::new(reader)?;

    let manifest_bytes = read_entry(&mut archive, MANIFEST_ENTRY)?;
    let signature = read_entry(&mut archive, SIGNATURE_ENTRY)?;

    verify_detached(&signature, &manifest_bytes)?;

    let manifest = Manifest::from_json_bytes(&manifest_bytes)
        .map_err(|e| Error::Verification(format!("Unreadable manifest: {}", e)))?;

    let mut seen = BTreeSet::new();
    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        if file.is_dir() {
            continue;
        }
        let name = file.name().to_string();
        if name == MANIFEST_ENTRY || name == SIGNATURE_ENTRY {
            continue;
        }

        let expected = manifest
            .get(&name)
            .ok_or_else(|| Error::Verification(format!("{} is not listed in the manifest", name)))?
            .to_string();
        let actual = copy_and_checksum(&mut io::sink(), &mut file).map_err(|e| e.at(name.as_str()))?;
        if actual != expected {
            return Err(Error::Verification(format!("Digest mismatch for {}", name)));
        }
        seen.insert(name);
    }

    if let Some((missing, _)) = manifest.sorted().iter().find(|(path, _)| !seen.contains(*path)) {
        return Err(Error::Verification(format!(
            "{} is listed in the manifest but missing from the package",
            missing
        )));
    }

    info!(assets = manifest.len(), "push package verified");
    Ok(manifest)
}

fn read_entry<R: Read + Seek>(archive: &mut ZipArchive<R>, name: &str) -> Result<Vec<u8>> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => {
            return Err(Error::Verification(format!("Package has no {}", name)))
        }
        Err(e) => return Err(e.into()),
    };
    let mut buf = Vec::new();
    file.read_to_end(&mut buf).map_err(|source| Error::ReadFailure {
        path: name.to_string(),
        source,
    })?;
    Ok(buf)
}
