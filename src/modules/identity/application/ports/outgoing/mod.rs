pub mod identity_verifier;

pub use identity_verifier::{IdentityError, IdentityVerifier};
