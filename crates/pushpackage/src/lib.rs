pub mod builder;
pub mod checksum;
pub mod crypto;
pub mod error;
pub mod manifest;
pub mod package;
pub mod payload;
pub mod signer;

pub use builder::PushPackager;
pub use crypto::SigningIdentity;
pub use error::Error;
pub use manifest::Manifest;
pub use package::{
    build_from_dir, build_package, collect_files, verify_package, write_package, BuildState,
    FileEntry, PushPackage, Website, WEBSITE_ENTRY,
};
pub use signer::{PackageSigner, Signature, SignedManifest};

pub type Result<T> = std::result::Result<T, Error>;
