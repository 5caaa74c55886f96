pub mod cms;
pub mod identity;

pub use identity::SigningIdentity;
