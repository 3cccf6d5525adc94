//! Authentication extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated owner from a JWT Bearer token.
//! - [`auth::RequireAuth`] -- Requires any authenticated user.

pub mod auth;
