use actix_web::{dev::Payload, web, Error as ActixError, FromRequest, HttpRequest, HttpResponse};
use std::{
    future::{ready, Ready},
    sync::Arc,
};

use crate::identity::application::{
    domain::entities::{DelegatedToken, SessionIdentity},
    ports::outgoing::{IdentityError, IdentityVerifier},
};
use crate::shared::api::ApiResponse;

/// Header carrying the delegated token for the secondary document service
pub const PROVIDER_TOKEN_HEADER: &str = "X-Provider-Token";

/// Represents the signed-in user of the current request
#[derive(Debug, Clone)]
pub struct SignedInUser(pub SessionIdentity);

impl SignedInUser {
    pub fn identity(&self) -> &SessionIdentity {
        &self.0
    }
}

fn create_api_error(response: HttpResponse) -> ActixError {
    actix_web::error::InternalError::from_response("", response).into()
}

impl FromRequest for SignedInUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let verifier = match req.app_data::<web::Data<Arc<dyn IdentityVerifier>>>() {
            Some(verifier) => verifier,
            None => {
                tracing::error!("IdentityVerifier is not registered as app data");
                return ready(Err(create_api_error(ApiResponse::internal_error())));
            }
        };

        let token = match extract_token_from_header(req) {
            Some(t) => t,
            None => {
                return ready(Err(create_api_error(ApiResponse::unauthorized(
                    "MISSING_AUTH_HEADER",
                    "Missing or invalid authorization header",
                ))));
            }
        };

        match verifier.verify(&token) {
            Ok(mut identity) => {
                identity.delegated_token = extract_provider_token(req);
                ready(Ok(SignedInUser(identity)))
            }
            Err(IdentityError::Expired) => ready(Err(create_api_error(ApiResponse::unauthorized(
                "TOKEN_EXPIRED",
                "Session has expired, please sign in again",
            )))),
            Err(_) => ready(Err(create_api_error(ApiResponse::unauthorized(
                "INVALID_TOKEN",
                "Invalid or expired token",
            )))),
        }
    }
}

fn extract_token_from_header(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get("Authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|s| s.to_string())
}

fn extract_provider_token(req: &HttpRequest) -> Option<DelegatedToken> {
    let raw = req.headers().get(PROVIDER_TOKEN_HEADER)?.to_str().ok()?;
    DelegatedToken::new(raw).ok()
}
