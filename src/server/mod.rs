mod admin;
mod auth;
mod notes;
pub mod access;
pub mod dto;
pub mod response;
mod router;
pub mod validation;

pub use admin::admin_router;
pub use auth::auth_router;
pub use notes::notes_router;
pub use router::{AppState, create_router};
