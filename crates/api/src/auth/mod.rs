//! Authentication primitives.
//!
//! - [`jwt`] -- JWT access-token generation and validation.
//!
//! Token issuance (login, sessions) lives outside this service; it only
//! verifies bearer tokens signed with the shared secret.

pub mod jwt;
