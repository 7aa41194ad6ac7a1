use std::sync::Arc;

use chrono::Utc;

use super::{TokenGenerator, parse_token};
use crate::server::AppState;
use crate::types::{Account, Session};

#[derive(Debug)]
pub enum SessionValidationError {
    InvalidScheme,
    InvalidToken,
    SessionExpired,
    InternalError,
}

pub struct ValidatedSession {
    pub session: Session,
    pub account: Account,
}

/// Validates a raw bearer token against the session store.
/// Returns the session and the account it belongs to.
pub fn validate_session(
    state: &Arc<AppState>,
    raw_token: &str,
) -> Result<ValidatedSession, SessionValidationError> {
    let (lookup, _secret) =
        parse_token(raw_token).map_err(|_| SessionValidationError::InvalidToken)?;

    let session = state
        .store
        .get_session_by_lookup(&lookup)
        .map_err(|_| SessionValidationError::InternalError)?
        .ok_or(SessionValidationError::InvalidToken)?;

    let generator = TokenGenerator::new();
    if !generator
        .verify(raw_token, &session.token_hash)
        .map_err(|_| SessionValidationError::InternalError)?
    {
        return Err(SessionValidationError::InvalidToken);
    }

    if let Some(expires_at) = &session.expires_at {
        if expires_at < &Utc::now() {
            return Err(SessionValidationError::SessionExpired);
        }
    }

    // A session whose account has been deleted is no longer valid.
    let account = state
        .store
        .get_account(session.account_id)
        .map_err(|_| SessionValidationError::InternalError)?
        .ok_or(SessionValidationError::InvalidToken)?;

    Ok(ValidatedSession { session, account })
}

/// Extracts the bearer token from an Authorization header.
/// Returns None if no auth header is present.
/// Returns Err if the auth scheme is not Bearer.
pub fn extract_token_from_header(
    auth_header: Option<&str>,
) -> Result<Option<String>, SessionValidationError> {
    match auth_header {
        Some(header) if header.starts_with("Bearer ") => {
            Ok(Some(header.strip_prefix("Bearer ").unwrap().to_string()))
        }
        Some(_) => Err(SessionValidationError::InvalidScheme),
        None => Ok(None),
    }
}
