//! Database module: the `students` record store.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows plus validated write payloads
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `actor.rs`: ractor actor owning the pool; callers use `DbActorHandle`

pub mod actor;
pub mod models;
pub mod schema;

pub use models::{DbStudent, NewStudent, PendingReminder, parse_study_date};
pub use schema::SQLITE_INIT;

pub use actor::{DbActorHandle, spawn};
