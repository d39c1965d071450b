//! Authentication middleware and role checks for protected routes.

use axum::{
    Json,
    extract::{FromRequestParts, Request, State},
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::str::FromStr;

use crate::AppState;
use tally_shared::{Claims, Role};

/// Extracts the bearer token from the Authorization header.
fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
}

/// Authentication middleware that validates JWT tokens.
///
/// Extracts the Bearer token, validates it, and stores the claims in
/// request extensions for handlers to access.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let Some(token) = auth_header.and_then(extract_bearer_token) else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": "missing_token",
                "message": "Authorization header with Bearer token is required"
            })),
        )
            .into_response();
    };

    match state.jwt_service.validate_token(token) {
        Ok(claims) => {
            request.extensions_mut().insert(claims);
            next.run(request).await
        }
        Err(e) => {
            let (error, message) = match e {
                tally_shared::JwtError::Expired => ("token_expired", "Token has expired"),
                _ => ("invalid_token", "Invalid or malformed token"),
            };

            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": error, "message": message })),
            )
                .into_response()
        }
    }
}

/// Extractor for authenticated user claims.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    /// Returns the user ID from the claims.
    #[must_use]
    pub fn user_id(&self) -> uuid::Uuid {
        self.0.user_id()
    }

    /// Returns the user's role string.
    #[must_use]
    pub fn role(&self) -> &str {
        &self.0.role
    }

    /// Parses the role string into a capability-checked [`Role`].
    #[must_use]
    pub fn parsed_role(&self) -> Option<Role> {
        Role::from_str(&self.0.role).ok()
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<serde_json::Value>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({
                        "error": "unauthorized",
                        "message": "Authentication required"
                    })),
                )
            })
    }
}

fn forbidden(message: &str) -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(json!({
            "error": "forbidden",
            "message": message
        })),
    )
        .into_response()
}

/// Requires a role that may mutate ledger records (admin or accountant).
///
/// # Errors
///
/// Returns a 403 response for staff or unrecognized roles.
pub fn require_recorder(auth: &AuthUser) -> Result<(), Response> {
    match auth.parsed_role() {
        Some(role) if role.can_record() => Ok(()),
        _ => Err(forbidden("Your role cannot modify ledger records")),
    }
}

/// Requires the admin role.
///
/// # Errors
///
/// Returns a 403 response for any other role.
pub fn require_admin(auth: &AuthUser) -> Result<(), Response> {
    match auth.parsed_role() {
        Some(role) if role.can_delete_accounts() => Ok(()),
        _ => Err(forbidden("Administrator access required")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rstest::rstest;
    use uuid::Uuid;

    fn auth_with_role(role: &str) -> AuthUser {
        let expires = Utc::now() + chrono::Duration::minutes(15);
        AuthUser(Claims::new(Uuid::new_v4(), role, expires))
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc"), Some("abc"));
        assert_eq!(extract_bearer_token("bearer abc"), Some("abc"));
        assert_eq!(extract_bearer_token("Basic abc"), None);
    }

    #[rstest]
    #[case("admin", true)]
    #[case("accountant", true)]
    #[case("staff", false)]
    #[case("intern", false)]
    fn test_require_recorder(#[case] role: &str, #[case] allowed: bool) {
        assert_eq!(require_recorder(&auth_with_role(role)).is_ok(), allowed);
    }

    #[rstest]
    #[case("admin", true)]
    #[case("accountant", false)]
    #[case("staff", false)]
    fn test_require_admin(#[case] role: &str, #[case] allowed: bool) {
        assert_eq!(require_admin(&auth_with_role(role)).is_ok(), allowed);
    }
}
