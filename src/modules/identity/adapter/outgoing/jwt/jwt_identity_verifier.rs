use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use super::jwt_config::JwtConfig;
use crate::identity::application::{
    domain::entities::{OwnerId, SessionIdentity},
    ports::outgoing::{IdentityError, IdentityVerifier},
};

/// Claims of a session token issued by the identity provider
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String, // Owner id
    pub exp: i64,
    pub aud: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Clone)]
pub struct JwtIdentityVerifier {
    config: JwtConfig,
    decoding_key: DecodingKey,
}

impl JwtIdentityVerifier {
    pub fn new(config: JwtConfig) -> Self {
        let decoding_key = DecodingKey::from_secret(config.secret_key.as_bytes());
        Self {
            config,
            decoding_key,
        }
    }

    /// Sign a session token with the verifier's secret. Only tests mint tokens.
    #[cfg(test)]
    pub fn issue(
        &self,
        owner: &str,
        email: Option<&str>,
        expires_in_secs: i64,
    ) -> Result<String, String> {
        use jsonwebtoken::{encode, EncodingKey, Header};

        let claims = SessionClaims {
            sub: owner.to_string(),
            exp: chrono::Utc::now().timestamp() + expires_in_secs,
            aud: self.config.audience.clone(),
            email: email.map(str::to_string),
            name: None,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.config.secret_key.as_bytes()),
        )
        .map_err(|e| e.to_string())
    }
}

impl IdentityVerifier for JwtIdentityVerifier {
    fn verify(&self, session_token: &str) -> Result<SessionIdentity, IdentityError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[self.config.audience.as_str()]);

        let decoded = decode::<SessionClaims>(session_token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => IdentityError::Expired,
                _ => IdentityError::Invalid(e.to_string()),
            })?;

        let claims = decoded.claims;
        let owner_id = OwnerId::try_new(claims.sub).map_err(|_| IdentityError::InvalidSubject)?;

        Ok(SessionIdentity {
            owner_id,
            email: claims.email,
            display_name: claims.name,
            // The provider token travels separately from the session token
            delegated_token: None,
        })
    }
}
