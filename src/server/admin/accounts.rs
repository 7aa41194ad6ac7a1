use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::auth::{RequireAuth, hash_password};
use crate::authz::{Action, Resource, authorize};
use crate::server::AppState;
use crate::server::access::{fetch_account, require};
use crate::server::dto::{CreateAccountRequest, UpdatePasswordRequest, UpdateRoleRequest};
use crate::server::response::{ApiError, ApiResponse, StoreResultExt};
use crate::server::validation::{validate_password, validate_username};
use crate::types::{NewAccount, Role};

pub async fn list_accounts(
    auth: RequireAuth,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let principal = &auth.principal;

    require(authorize(
        Some(principal),
        Action::ListAccounts,
        &Resource::AccountCollection,
    ))?;

    let accounts = state
        .store
        .list_accounts()
        .api_err("Failed to list accounts")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(accounts)))
}

pub async fn create_account(
    auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateAccountRequest>,
) -> impl IntoResponse {
    let principal = &auth.principal;
    let store = state.store.as_ref();

    require(authorize(
        Some(principal),
        Action::CreateAccount,
        &Resource::AccountCollection,
    ))?;
    validate_username(&req.username)?;
    validate_password(&req.password)?;

    if store
        .get_account_by_username(&req.username)
        .api_err("Failed to check username")?
        .is_some()
    {
        return Err(ApiError::conflict("Username already exists"));
    }

    let password_hash = hash_password(&req.password).api_err("Failed to hash password")?;
    let account = store
        .create_account(&NewAccount {
            username: req.username,
            password_hash,
            role: req.role.unwrap_or(Role::Member),
        })
        .api_err("Failed to create account")?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(account))))
}

pub async fn update_account_role(
    auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateRoleRequest>,
) -> impl IntoResponse {
    let principal = &auth.principal;
    let store = state.store.as_ref();

    let mut account = fetch_account(store, principal, Action::EditAccountRole, id)?;

    store
        .update_account_role(account.id, req.role)
        .api_err("Failed to update role")?;
    account.role = req.role;

    Ok::<_, ApiError>(Json(ApiResponse::success(account)))
}

pub async fn update_account_password(
    auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<UpdatePasswordRequest>,
) -> impl IntoResponse {
    let principal = &auth.principal;
    let store = state.store.as_ref();

    validate_password(&req.password)?;

    let account = fetch_account(store, principal, Action::ResetAccountPassword, id)?;

    let password_hash = hash_password(&req.password).api_err("Failed to hash password")?;
    store
        .update_account_password(account.id, &password_hash)
        .api_err("Failed to update password")?;

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}

pub async fn delete_account(
    auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let principal = &auth.principal;
    let store = state.store.as_ref();

    let account = fetch_account(store, principal, Action::DeleteAccount, id)?;

    // Notes stay behind under the deleted owner's name; sessions go with
    // the account.
    store
        .delete_account(account.id)
        .api_err("Failed to delete account")?;

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}
