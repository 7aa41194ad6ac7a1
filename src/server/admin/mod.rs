mod accounts;

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::server::AppState;

pub fn admin_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/accounts", get(accounts::list_accounts))
        .route("/accounts", post(accounts::create_account))
        .route("/accounts/{id}/role", put(accounts::update_account_role))
        .route(
            "/accounts/{id}/password",
            put(accounts::update_account_password),
        )
        .route("/accounts/{id}", delete(accounts::delete_account))
}
