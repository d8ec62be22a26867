mod jwt_config;
mod jwt_identity_verifier;

pub use jwt_config::JwtConfig;
pub use jwt_identity_verifier::{JwtIdentityVerifier, SessionClaims};
