//! First-run initialization.

use crate::auth::hash_password;
use crate::error::Result;
use crate::store::Store;
use crate::types::{NewAccount, Role};

/// What [`ensure_admin`] found or did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// A new admin account was created with the supplied credentials.
    Created { username: String },
    /// An admin account already existed; nothing was changed.
    AdminExists,
}

/// Makes sure the store holds at least one admin account.
///
/// A no-op when any admin already exists, whatever its name. Repeated
/// invocations never create a second admin or touch the existing one's
/// credentials.
pub fn ensure_admin(store: &dyn Store, username: &str, password: &str) -> Result<BootstrapOutcome> {
    if store.has_admin_account()? {
        tracing::info!("Admin account already present, leaving it alone");
        return Ok(BootstrapOutcome::AdminExists);
    }

    let account = store.create_account(&NewAccount {
        username: username.to_string(),
        password_hash: hash_password(password)?,
        role: Role::Admin,
    })?;
    tracing::info!("Created admin account '{}'", account.username);

    Ok(BootstrapOutcome::Created {
        username: account.username,
    })
}
