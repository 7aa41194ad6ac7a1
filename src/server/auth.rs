use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::auth::{RequireAuth, SESSION_TTL_DAYS, TokenGenerator, hash_password, verify_password};
use crate::server::AppState;
use crate::server::dto::{LoginRequest, LoginResponse};
use crate::server::response::{ApiError, ApiResponse, StoreResultExt};
use crate::types::Session;

/// One message for every way a login can fail, so the response never says
/// whether the username exists.
const LOGIN_FAILED: &str = "Invalid username or password";

pub fn auth_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> impl IntoResponse {
    let store = state.store.as_ref();

    let account = store
        .get_account_by_username(&req.username)
        .api_err("Failed to look up account")?;

    let Some(account) = account else {
        // Burn the same hashing cost as a real verification so unknown
        // names are not observably faster.
        let _ = hash_password(&req.password);
        return Err(ApiError::unauthorized(LOGIN_FAILED));
    };

    let verified = verify_password(&req.password, &account.password_hash)
        .map_err(|_| ApiError::unauthorized(LOGIN_FAILED))?;
    if !verified {
        return Err(ApiError::unauthorized(LOGIN_FAILED));
    }

    let generator = TokenGenerator::new();
    let (raw_token, lookup, hash) = generator.generate().api_err("Failed to create session")?;

    let session = Session {
        id: Uuid::new_v4().to_string(),
        token_hash: hash,
        token_lookup: lookup,
        account_id: account.id,
        created_at: Utc::now(),
        expires_at: Some(Utc::now() + Duration::days(SESSION_TTL_DAYS)),
    };
    store
        .create_session(&session)
        .api_err("Failed to create session")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(LoginResponse {
        token: raw_token,
        username: account.username,
        role: account.role,
    })))
}

pub async fn logout(auth: RequireAuth, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state
        .store
        .delete_session(&auth.session.id)
        .api_err("Failed to delete session")?;

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}
