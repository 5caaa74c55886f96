//! SHA-512 checksums computed while copying.
//!
//! Every asset in a push package is hashed in the same pass that writes it
//! into the archive. [`ChecksumWriter`] is a decorator around any
//! [`Write`] that feeds the bytes accepted by the inner writer into a running
//! SHA-512, and [`copy_and_checksum`] drives a reader through it with a single
//! fixed-size buffer, so memory use does not grow with the stream.

use sha2::{Digest, Sha512};
use std::io::{self, ErrorKind, Read, Write};
use thiserror::Error;

/// Length of a hex-encoded SHA-512 digest.
pub const DIGEST_HEX_LEN: usize = 128;

const COPY_BUFFER_SIZE: usize = 8 * 1024;

/// Which side of a [`copy_and_checksum`] failed.
#[derive(Debug, Error)]
pub enum CopyError {
    #[error("read failed: {0}")]
    Read(#[source] io::Error),
    #[error("write failed: {0}")]
    Write(#[source] io::Error),
}

impl CopyError {
    /// Attach the package path the copy was for.
    pub fn at(self, path: impl Into<String>) -> crate::Error {
        match self {
            CopyError::Read(source) => crate::Error::ReadFailure {
                path: path.into(),
                source,
            },
            CopyError::Write(source) => crate::Error::WriteFailure {
                path: path.into(),
                source,
            },
        }
    }
}

/// Writer decorator that hashes everything written through it.
///
/// Only the bytes the inner writer reports as accepted are hashed, so the
/// digest always describes what actually reached the destination.
pub struct ChecksumWriter<W> {
    inner: W,
    hasher: Sha512,
    written: u64,
}

impl<W: Write> ChecksumWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            hasher: Sha512::new(),
            written: 0,
        }
    }

    /// Number of bytes forwarded to the inner writer so far.
    pub fn bytes_written(&self) -> u64 {
        self.written
    }

    /// Consume the wrapper, returning the inner writer and the lowercase hex digest.
    pub fn finalize(self) -> (W, String) {
        (self.inner, format!("{:x}", self.hasher.finalize()))
    }
}

impl<W: Write> Write for ChecksumWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.hasher.update(&buf[..n]);
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Copy `reader` into `writer`, returning the hex SHA-512 of the copied bytes.
///
/// Reads interrupted by a signal are retried. Any other read or write error
/// aborts the copy; the error says which side failed so it can be reported
/// as a read or a write failure of the asset.
pub fn copy_and_checksum<W, R>(writer: &mut W, reader: &mut R) -> Result<String, CopyError>
where
    W: Write + ?Sized,
    R: Read + ?Sized,
{
    let mut out = ChecksumWriter::new(writer);
    let mut buf = [0u8; COPY_BUFFER_SIZE];

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(CopyError::Read(e)),
        };
        out.write_all(&buf[..n]).map_err(CopyError::Write)?;
    }

    let (_, digest) = out.finalize();
    Ok(digest)
}

/// Hex SHA-512 of an in-memory buffer.
pub fn sha512_hex(data: &[u8]) -> String {
    format!("{:x}", Sha512::digest(data))
}
