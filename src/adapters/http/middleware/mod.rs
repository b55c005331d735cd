mod auth;

pub use auth::{authenticate, RequireAuth};
