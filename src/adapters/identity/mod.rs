//! Identity provider adapters.

mod http_verifier;
mod mock;
mod token_cache;

pub use http_verifier::HttpIdentityVerifier;
pub use mock::MockIdentityVerifier;
pub use token_cache::TokenCache;
