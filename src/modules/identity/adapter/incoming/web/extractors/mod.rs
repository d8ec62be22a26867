pub mod auth;

pub use auth::{SignedInUser, PROVIDER_TOKEN_HEADER};
