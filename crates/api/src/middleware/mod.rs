//! API middleware.

pub mod auth;

pub use auth::{AuthUser, auth_middleware, require_admin, require_recorder};
