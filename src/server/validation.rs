use crate::server::response::ApiError;

const MAX_USERNAME_LEN: usize = 64;
const MAX_TITLE_LEN: usize = 200;
const MIN_PASSWORD_LEN: usize = 8;

fn is_valid_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

pub fn validate_username(name: &str) -> Result<(), ApiError> {
    if name.is_empty() {
        return Err(ApiError::bad_request("Username cannot be empty"));
    }
    if name.len() > MAX_USERNAME_LEN {
        return Err(ApiError::bad_request(format!(
            "Username cannot exceed {MAX_USERNAME_LEN} characters"
        )));
    }
    if !name.chars().all(is_valid_name_char) {
        return Err(ApiError::bad_request(
            "Username can only contain alphanumeric characters, hyphens, and underscores",
        ));
    }
    if name.starts_with('-') || name.starts_with('_') {
        return Err(ApiError::bad_request(
            "Username cannot start with a hyphen or underscore",
        ));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::bad_request(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Titles may be empty; the length cap matches the legacy column width.
pub fn validate_note_title(title: &str) -> Result<(), ApiError> {
    if title.len() > MAX_TITLE_LEN {
        return Err(ApiError::bad_request(format!(
            "Title cannot exceed {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(())
}
