//! Authentication routes: register and login.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;
use validator::Validate;

use super::internal_error;
use crate::AppState;
use tally_core::auth::{hash_password, verify_password};
use tally_db::{
    UserRepository,
    entities::sea_orm_active_enums::UserRole,
    repositories::user::{CreateUserInput, UserError},
};

/// Creates the authentication routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

/// Registration request payload.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// User email.
    #[validate(email)]
    pub email: String,
    /// User password.
    #[validate(length(min = 8))]
    pub password: String,
    /// User full name.
    #[validate(length(min = 1))]
    pub full_name: String,
    /// Role to assign; defaults to staff.
    pub role: Option<String>,
}

/// Login request payload.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// User email.
    pub email: String,
    /// User password.
    pub password: String,
}

/// User info returned in auth responses.
#[derive(Debug, Serialize)]
pub struct UserInfo {
    /// User ID.
    pub id: Uuid,
    /// User email.
    pub email: String,
    /// User full name.
    pub full_name: String,
    /// User role.
    pub role: String,
}

/// Login response payload.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Authenticated user info.
    pub user: UserInfo,
    /// Access token.
    pub access_token: String,
    /// Token expiration in seconds.
    pub expires_in: i64,
}

fn role_to_string(role: UserRole) -> &'static str {
    match role {
        UserRole::Admin => "admin",
        UserRole::Accountant => "accountant",
        UserRole::Staff => "staff",
    }
}

fn string_to_role(s: &str) -> Option<UserRole> {
    match s.to_lowercase().as_str() {
        "admin" => Some(UserRole::Admin),
        "accountant" => Some(UserRole::Accountant),
        "staff" => Some(UserRole::Staff),
        _ => None,
    }
}

/// POST `/auth/register` - Register a new user.
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> impl IntoResponse {
    if let Err(e) = payload.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_payload",
                "message": e.to_string()
            })),
        )
            .into_response();
    }

    let role = match payload.role.as_deref() {
        None => UserRole::Staff,
        Some(s) => match string_to_role(s) {
            Some(role) => role,
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "invalid_role",
                        "message": "Role must be admin, accountant, or staff"
                    })),
                )
                    .into_response();
            }
        },
    };

    let password_hash = match hash_password(&payload.password) {
        Ok(hash) => hash,
        Err(e) => {
            error!(error = %e, "Failed to hash password");
            return internal_error();
        }
    };

    let user_repo = UserRepository::new((*state.db).clone());
    let input = CreateUserInput {
        email: payload.email,
        password_hash,
        full_name: payload.full_name,
        role,
    };

    match user_repo.create_user(input).await {
        Ok(user) => {
            info!(user_id = %user.id, "User registered");
            (
                StatusCode::CREATED,
                Json(json!({
                    "user": UserInfo {
                        id: user.id,
                        email: user.email,
                        full_name: user.full_name,
                        role: role_to_string(user.role).to_string(),
                    }
                })),
            )
                .into_response()
        }
        Err(UserError::DuplicateEmail(_)) => (
            StatusCode::CONFLICT,
            Json(json!({
                "error": "email_taken",
                "message": "This email is already registered"
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to register user");
            internal_error()
        }
    }
}

/// POST `/auth/login` - Authenticate and issue an access token.
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> impl IntoResponse {
    let user_repo = UserRepository::new((*state.db).clone());

    let user = match user_repo.find_by_email(&payload.email).await {
        Ok(Some(user)) => user,
        Ok(None) => return invalid_credentials(),
        Err(e) => {
            error!(error = %e, "Failed to look up user");
            return internal_error();
        }
    };

    match verify_password(&payload.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => return invalid_credentials(),
        Err(e) => {
            error!(error = %e, "Password verification failed");
            return internal_error();
        }
    }

    let role = role_to_string(user.role);
    match state.jwt_service.generate_access_token(user.id, role) {
        Ok(access_token) => {
            info!(user_id = %user.id, "User logged in");
            (
                StatusCode::OK,
                Json(LoginResponse {
                    user: UserInfo {
                        id: user.id,
                        email: user.email,
                        full_name: user.full_name,
                        role: role.to_string(),
                    },
                    access_token,
                    expires_in: state.jwt_service.access_token_expires_in(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to issue token");
            internal_error()
        }
    }
}

fn invalid_credentials() -> axum::response::Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": "invalid_credentials",
            "message": "Email or password is incorrect"
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [UserRole::Admin, UserRole::Accountant, UserRole::Staff] {
            assert_eq!(string_to_role(role_to_string(role)), Some(role));
        }
        assert_eq!(string_to_role("superuser"), None);
    }

    #[test]
    fn test_register_payload_validation() {
        let payload = RegisterRequest {
            email: "not-an-email".to_string(),
            password: "short".to_string(),
            full_name: String::new(),
            role: None,
        };
        assert!(payload.validate().is_err());

        let payload = RegisterRequest {
            email: "books@example.com".to_string(),
            password: "long-enough-password".to_string(),
            full_name: "Jo Books".to_string(),
            role: None,
        };
        assert!(payload.validate().is_ok());
    }
}
