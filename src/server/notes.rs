use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use chrono::Utc;

use crate::auth::RequireAuth;
use crate::authz::{Action, Resource, authorize};
use crate::server::AppState;
use crate::server::access::{fetch_note, require};
use crate::server::dto::{CreateNoteRequest, UpdateNoteRequest};
use crate::server::response::{ApiError, ApiResponse, StoreResultExt};
use crate::server::validation::validate_note_title;
use crate::types::{NewNote, canonical_offset};

pub fn notes_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/notes", get(list_notes))
        .route("/notes", post(create_note))
        .route("/notes/{id}", get(get_note))
        .route("/notes/{id}", put(update_note))
        .route("/notes/{id}", delete(delete_note))
}

pub async fn list_notes(
    auth: RequireAuth,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let principal = &auth.principal;
    let store = state.store.as_ref();

    // Members get a pre-filtered list. Per-note checks alone would still
    // reveal which ids exist.
    let notes = if principal.role.is_admin() {
        store.list_notes().api_err("Failed to list notes")?
    } else {
        store
            .list_notes_by_owner(&principal.username)
            .api_err("Failed to list notes")?
    };

    Ok::<_, ApiError>(Json(ApiResponse::success(notes)))
}

pub async fn create_note(
    auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateNoteRequest>,
) -> impl IntoResponse {
    let principal = &auth.principal;
    let store = state.store.as_ref();

    require(authorize(
        Some(principal),
        Action::CreateNote,
        &Resource::NoteCollection,
    ))?;
    validate_note_title(&req.title)?;

    let note = store
        .create_note(&NewNote {
            owner_username: principal.username.clone(),
            title: req.title,
            content: req.content,
            created_at: Utc::now().with_timezone(&canonical_offset()),
        })
        .api_err("Failed to create note")?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(note))))
}

pub async fn get_note(
    auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let principal = &auth.principal;
    let store = state.store.as_ref();

    let note = fetch_note(store, principal, Action::ReadNote, id)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(note)))
}

pub async fn update_note(
    auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateNoteRequest>,
) -> impl IntoResponse {
    let principal = &auth.principal;
    let store = state.store.as_ref();

    let mut note = fetch_note(store, principal, Action::UpdateNote, id)?;

    if let Some(title) = req.title {
        validate_note_title(&title)?;
        note.title = title;
    }
    if let Some(content) = req.content {
        note.content = content;
    }

    store
        .update_note(note.id, &note.title, &note.content)
        .api_err("Failed to update note")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(note)))
}

pub async fn delete_note(
    auth: RequireAuth,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let principal = &auth.principal;
    let store = state.store.as_ref();

    let note = fetch_note(store, principal, Action::DeleteNote, id)?;

    store
        .delete_note(note.id)
        .api_err("Failed to delete note")?;

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}
