//! # Jotter
//!
//! A multi-user note server, usable both as a standalone binary and as a library.
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! jotter = { version = "0.0.1", default-features = false }
//! ```
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use jotter::server::{AppState, create_router};
//! use jotter::store::{SqliteStore, Store};
//!
//! let store = SqliteStore::new("./data/jotter.db").unwrap();
//! store.initialize().unwrap();
//!
//! let state = Arc::new(AppState::new(Arc::new(store)));
//! let router = create_router(state);
//! // Serve with axum...
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Pulls in the binary's argument parsing and prompts.
//!   Disable with `default-features = false` for library use.

pub mod auth;
pub mod authz;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod migrate;
pub mod server;
pub mod store;
pub mod types;
