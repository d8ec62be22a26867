use actix_web::web;
use std::sync::Arc;

use crate::identity::adapter::outgoing::jwt::{JwtConfig, JwtIdentityVerifier};
use crate::identity::application::ports::outgoing::IdentityVerifier;

pub fn test_verifier() -> JwtIdentityVerifier {
    JwtIdentityVerifier::new(JwtConfig {
        secret_key: "test_secret_key_for_testing_purposes_only".to_string(),
        audience: JwtConfig::DEFAULT_AUDIENCE.to_string(),
    })
}

pub fn verifier_data() -> web::Data<Arc<dyn IdentityVerifier>> {
    let verifier: Arc<dyn IdentityVerifier> = Arc::new(test_verifier());
    web::Data::new(verifier)
}

/// `Authorization` header value for a fresh ten minute session of `owner`.
pub fn bearer(owner: &str) -> String {
    let token = test_verifier()
        .issue(owner, None, 600)
        .expect("test session token");
    format!("Bearer {}", token)
}
