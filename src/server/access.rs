use crate::authz::{Action, Decision, DenyReason, Resource, authorize};
use crate::server::response::{ApiError, StoreOptionExt, StoreResultExt};
use crate::store::Store;
use crate::types::{Account, Note, Principal};

/// Converts an authorization decision into a handler result.
pub fn require(decision: Decision) -> Result<(), ApiError> {
    match decision {
        Decision::Allow => Ok(()),
        Decision::Deny(reason) => Err(deny_to_error(reason)),
    }
}

fn deny_to_error(reason: DenyReason) -> ApiError {
    match reason {
        DenyReason::Unauthenticated => ApiError::unauthorized("Authentication required"),
        // A foreign note answers exactly like a missing one.
        DenyReason::NotOwner => ApiError::not_found("Note not found"),
        DenyReason::CannotDeleteSelf => ApiError::forbidden("Cannot delete your own account"),
        DenyReason::AdminOnly => ApiError::forbidden("Admin access required"),
        DenyReason::UnknownAction => ApiError::forbidden("Action not permitted"),
    }
}

/// Loads a note and checks `action` against it.
///
/// Foreign and missing notes produce byte-identical 404 responses, so a
/// member cannot probe which ids exist.
pub fn fetch_note(
    store: &dyn Store,
    principal: &Principal,
    action: Action,
    id: i64,
) -> Result<Note, ApiError> {
    let note = store
        .get_note(id)
        .api_err("Failed to get note")?
        .or_not_found("Note not found")?;

    require(authorize(Some(principal), action, &Resource::Note(&note)))?;
    Ok(note)
}

/// Loads an account and checks `action` against it.
///
/// When the id does not exist, members still get the admin-only denial;
/// only a principal allowed to see the account table learns the id is free.
pub fn fetch_account(
    store: &dyn Store,
    principal: &Principal,
    action: Action,
    id: i64,
) -> Result<Account, ApiError> {
    match store.get_account(id).api_err("Failed to get account")? {
        Some(account) => {
            require(authorize(
                Some(principal),
                action,
                &Resource::Account(&account),
            ))?;
            Ok(account)
        }
        None => {
            require(authorize(
                Some(principal),
                Action::ListAccounts,
                &Resource::AccountCollection,
            ))?;
            Err(ApiError::not_found("Account not found"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;
    use crate::types::{NewAccount, NewNote, Role, canonical_offset};
    use axum::http::StatusCode;
    use chrono::Utc;
    use tempfile::TempDir;

    fn seeded_store(temp: &TempDir) -> (SqliteStore, Principal, Principal, i64, i64) {
        let store = SqliteStore::new(temp.path().join("test.db")).unwrap();
        store.initialize().unwrap();

        let alice = store
            .create_account(&NewAccount {
                username: "alice".to_string(),
                password_hash: "$argon2id$a".to_string(),
                role: Role::Member,
            })
            .unwrap();
        let admin = store
            .create_account(&NewAccount {
                username: "root".to_string(),
                password_hash: "$argon2id$b".to_string(),
                role: Role::Admin,
            })
            .unwrap();
        let note = store
            .create_note(&NewNote {
                owner_username: "root".to_string(),
                title: "private".to_string(),
                content: "x".to_string(),
                created_at: Utc::now().with_timezone(&canonical_offset()),
            })
            .unwrap();

        let admin_id = admin.id;
        (
            store,
            Principal::from(&alice),
            Principal::from(&admin),
            note.id,
            admin_id,
        )
    }

    #[test]
    fn test_foreign_and_missing_notes_are_indistinguishable() {
        let temp = TempDir::new().unwrap();
        let (store, alice, _, foreign_note_id, _) = seeded_store(&temp);

        let foreign = fetch_note(&store, &alice, Action::ReadNote, foreign_note_id).unwrap_err();
        let missing = fetch_note(&store, &alice, Action::ReadNote, 9999).unwrap_err();

        assert_eq!(foreign.status, StatusCode::NOT_FOUND);
        assert_eq!(missing.status, StatusCode::NOT_FOUND);
        assert_eq!(foreign.message, missing.message);
    }

    #[test]
    fn test_member_cannot_probe_account_ids() {
        let temp = TempDir::new().unwrap();
        let (store, alice, _, _, admin_id) = seeded_store(&temp);

        let existing =
            fetch_account(&store, &alice, Action::DeleteAccount, admin_id).unwrap_err();
        let missing = fetch_account(&store, &alice, Action::DeleteAccount, 9999).unwrap_err();

        assert_eq!(existing.status, StatusCode::FORBIDDEN);
        assert_eq!(missing.status, StatusCode::FORBIDDEN);
        assert_eq!(existing.message, missing.message);
    }

    #[test]
    fn test_admin_sees_missing_account_as_not_found() {
        let temp = TempDir::new().unwrap();
        let (store, _, admin, _, _) = seeded_store(&temp);

        let missing = fetch_account(&store, &admin, Action::DeleteAccount, 9999).unwrap_err();
        assert_eq!(missing.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_self_delete_maps_to_forbidden() {
        let temp = TempDir::new().unwrap();
        let (store, _, admin, _, admin_id) = seeded_store(&temp);

        let denied = fetch_account(&store, &admin, Action::DeleteAccount, admin_id).unwrap_err();
        assert_eq!(denied.status, StatusCode::FORBIDDEN);
    }
}
