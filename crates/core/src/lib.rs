//! Domain core for inline page-text editing.
//!
//! - [`pending`] -- client-side staged edits with a bounded undo/redo log.
//! - [`ledger`] -- the Version Ledger storage seam and its save planning.
//! - [`session`] -- composes pending edits, the text cache and a ledger gateway.

pub mod cache;
pub mod error;
pub mod ledger;
pub mod pending;
pub mod roles;
pub mod session;
pub mod text_field;
pub mod types;
