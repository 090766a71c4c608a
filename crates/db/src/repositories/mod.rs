//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods.
//! Reads accept `&PgPool`; writes that must share a unit of work accept an
//! open transaction.

pub mod text_field_repo;
pub mod text_field_version_repo;

pub use text_field_repo::TextFieldRepo;
pub use text_field_version_repo::TextFieldVersionRepo;
