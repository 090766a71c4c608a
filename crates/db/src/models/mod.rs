//! Row structs for the ledger tables.
//!
//! Each row converts into the storage-agnostic type from `livetext_core`.

pub mod text_field;
pub mod text_field_version;
