//! Authorization rules for notes and accounts.
//!
//! Every role and ownership decision goes through [`authorize`], a pure
//! function over the principal, the attempted action, and a snapshot of the
//! target resource. It performs no I/O and never consults the store, so it is
//! safe to call from any number of concurrent requests. Handlers must invoke
//! it before every mutation and before returning note content on a read path.

use crate::types::{Account, Note, Principal};

/// An action a principal may attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateNote,
    ReadNote,
    UpdateNote,
    DeleteNote,
    ListAccounts,
    CreateAccount,
    EditAccountRole,
    ResetAccountPassword,
    DeleteAccount,
}

/// Snapshot of the resource an action targets. Creation and listing target
/// the collection variants; everything else targets a concrete row.
#[derive(Debug, Clone, Copy)]
pub enum Resource<'a> {
    Note(&'a Note),
    NoteCollection,
    Account(&'a Account),
    AccountCollection,
}

/// Outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    #[must_use]
    pub const fn is_allow(self) -> bool {
        matches!(self, Decision::Allow)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    Unauthenticated,
    CannotDeleteSelf,
    NotOwner,
    AdminOnly,
    UnknownAction,
}

/// Decides whether `principal` may perform `action` on `resource`.
///
/// Rules are evaluated in order, first match wins:
///
/// 1. No principal: deny everything.
/// 2. Admins: allow every well-formed action on any note or account, except
///    deleting their own account.
/// 3. Members: create notes freely; read/update/delete only notes they own
///    (owner name compared case-sensitively against the principal name);
///    no account administration.
/// 4. Anything else, including an action aimed at the wrong kind of
///    resource: deny (fail closed).
#[must_use]
pub fn authorize(
    principal: Option<&Principal>,
    action: Action,
    resource: &Resource<'_>,
) -> Decision {
    let Some(principal) = principal else {
        return Decision::Deny(DenyReason::Unauthenticated);
    };

    if !targets_matching_resource(action, resource) {
        return Decision::Deny(DenyReason::UnknownAction);
    }

    if principal.role.is_admin() {
        if let (Action::DeleteAccount, Resource::Account(account)) = (action, resource) {
            if account.id == principal.account_id {
                return Decision::Deny(DenyReason::CannotDeleteSelf);
            }
        }
        return Decision::Allow;
    }

    match (action, resource) {
        (Action::CreateNote, Resource::NoteCollection) => Decision::Allow,
        (Action::ReadNote | Action::UpdateNote | Action::DeleteNote, Resource::Note(note)) => {
            if note.owner_username == principal.username {
                Decision::Allow
            } else {
                Decision::Deny(DenyReason::NotOwner)
            }
        }
        // Only account actions remain after the shape check above.
        _ => Decision::Deny(DenyReason::AdminOnly),
    }
}

/// Returns true when the action is aimed at the kind of resource it is
/// defined for. Mismatched pairs are denied before any role rule applies.
fn targets_matching_resource(action: Action, resource: &Resource<'_>) -> bool {
    match action {
        Action::CreateNote => matches!(resource, Resource::NoteCollection),
        Action::ReadNote | Action::UpdateNote | Action::DeleteNote => {
            matches!(resource, Resource::Note(_))
        }
        Action::ListAccounts | Action::CreateAccount => {
            matches!(resource, Resource::AccountCollection)
        }
        Action::EditAccountRole | Action::ResetAccountPassword | Action::DeleteAccount => {
            matches!(resource, Resource::Account(_))
        }
    }
}
