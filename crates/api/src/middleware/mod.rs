//! Authentication and authorization middleware extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated editor from a JWT Bearer token.
//! - [`rbac::RequireEditor`] -- Requires the `editor` or `admin` role.

pub mod auth;
pub mod rbac;
