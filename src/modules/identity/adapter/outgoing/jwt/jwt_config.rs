use std::env;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret_key: String,
    pub audience: String,
}

impl JwtConfig {
    pub const DEFAULT_AUDIENCE: &'static str = "authenticated";

    /// Load session token verification settings from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let secret_key = env::var("SESSION_JWT_SECRET").expect("SESSION_JWT_SECRET must be set");

        // HS256 requires at least 32 bytes
        if secret_key.len() < 32 {
            panic!("SESSION_JWT_SECRET must be at least 32 characters long for HS256 algorithm");
        }

        let audience = env::var("SESSION_JWT_AUDIENCE")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| Self::DEFAULT_AUDIENCE.to_string());

        Self {
            secret_key,
            audience,
        }
    }
}
