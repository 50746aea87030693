//! # helpdesk-store
//!
//! SQLite persistence for the helpdesk: the customer set and the ticket set,
//! with each ticket owning its ordered message thread.
//!
//! The crate exposes a synchronous [`Database`] handle that wraps a
//! `rusqlite::Connection` and provides typed CRUD helpers for every domain
//! model.  Every mutating call persists before returning; callers treat a
//! [`StoreError`] as fatal for the current operation (no retry layer here).

pub mod customers;
pub mod database;
pub mod messages;
pub mod migrations;
pub mod models;
pub mod tickets;

mod error;

pub use database::Database;
pub use error::StoreError;
pub use models::*;
