mod helpers;
mod middleware;
mod password;
mod token;

pub use helpers::{SessionValidationError, ValidatedSession, validate_session};
pub use middleware::{AuthError, RequireAuth};
pub use password::{hash_password, verify_password};
pub use token::{SESSION_TTL_DAYS, TokenGenerator, parse_token};
