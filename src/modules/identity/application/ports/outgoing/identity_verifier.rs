use crate::identity::application::domain::entities::SessionIdentity;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    #[error("session token has expired")]
    Expired,
    #[error("session token is invalid: {0}")]
    Invalid(String),
    #[error("session token carries an unusable subject")]
    InvalidSubject,
}

/// Resolves a bearer session token into the identity of the signed-in user.
pub trait IdentityVerifier: Send + Sync {
    fn verify(&self, session_token: &str) -> Result<SessionIdentity, IdentityError>;
}
