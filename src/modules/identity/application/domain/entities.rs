use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityValueError {
    #[error("owner id must not be empty")]
    EmptyOwnerId,
    #[error("owner id must not contain '/'")]
    PathSeparatorInOwnerId,
    #[error("delegated token must not be empty")]
    EmptyDelegatedToken,
}

/// Identity of the capturing user as issued by the session provider.
///
/// The value is opaque, but it becomes the first segment of every storage path,
/// so it can never be empty or contain a path separator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OwnerId(String);

impl OwnerId {
    pub fn try_new(value: impl Into<String>) -> Result<Self, IdentityValueError> {
        let value = value.into();
        let trimmed = value.trim();

        if trimmed.is_empty() {
            return Err(IdentityValueError::EmptyOwnerId);
        }
        if trimmed.contains('/') {
            return Err(IdentityValueError::PathSeparatorInOwnerId);
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for OwnerId {
    type Error = IdentityValueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl From<OwnerId> for String {
    fn from(owner: OwnerId) -> Self {
        owner.0
    }
}

/// Short-lived credential for the secondary document service.
///
/// Debug output is redacted so tokens never end up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct DelegatedToken(String);

impl DelegatedToken {
    pub fn new(value: impl Into<String>) -> Result<Self, IdentityValueError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(IdentityValueError::EmptyDelegatedToken);
        }
        Ok(Self(value.trim().to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for DelegatedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DelegatedToken(***)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    pub owner_id: OwnerId,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub delegated_token: Option<DelegatedToken>,
}
