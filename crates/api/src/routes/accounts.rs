//! Account management routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, patch, post},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use tracing::{error, info};
use uuid::Uuid;

use super::internal_error;
use crate::{AppState, middleware::{AuthUser, require_admin, require_recorder}};
use tally_db::{
    AccountRepository,
    entities::{accounts, sea_orm_active_enums::AccountType},
    repositories::account::{AccountError, AccountFilter, CreateAccountInput, UpdateAccountInput},
};

/// Creates the account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accounts", get(list_accounts))
        .route("/accounts", post(create_account))
        .route("/accounts/{account_id}", get(get_account))
        .route("/accounts/{account_id}", patch(update_account))
        .route("/accounts/{account_id}", delete(delete_account))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing accounts.
#[derive(Debug, Deserialize)]
pub struct ListAccountsQuery {
    /// Filter by classification.
    #[serde(rename = "type")]
    pub account_type: Option<String>,
}

/// Request body for creating an account.
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    /// Classification: asset, liability, income, or expense.
    #[serde(rename = "type")]
    pub account_type: String,
    /// Unique display name.
    pub name: String,
    /// Opening balance (decimal string). Defaults to zero.
    pub amount: Option<String>,
    /// Free-form sub-classification tag, e.g. "Bank Account".
    #[serde(rename = "accountType")]
    pub subtype: Option<String>,
}

/// Request body for updating an account.
#[derive(Debug, Deserialize)]
pub struct UpdateAccountRequest {
    /// New display name.
    pub name: Option<String>,
    /// New classification.
    #[serde(rename = "type")]
    pub account_type: Option<String>,
    /// New sub-classification tag.
    #[serde(rename = "accountType")]
    pub subtype: Option<String>,
}

/// Response for an account.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    /// Account ID.
    pub id: Uuid,
    /// Classification.
    #[serde(rename = "type")]
    pub account_type: String,
    /// Display name.
    pub name: String,
    /// Current balance.
    pub balance: String,
    /// Sub-classification tag.
    #[serde(rename = "accountType")]
    pub subtype: String,
    /// Created at timestamp.
    pub created_at: String,
    /// Updated at timestamp.
    pub updated_at: String,
}

impl From<accounts::Model> for AccountResponse {
    fn from(model: accounts::Model) -> Self {
        Self {
            id: model.id,
            account_type: account_type_to_string(model.account_type).to_string(),
            name: model.name,
            balance: model.balance.to_string(),
            subtype: model.subtype,
            created_at: model.created_at.to_rfc3339(),
            updated_at: model.updated_at.to_rfc3339(),
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/accounts` - List accounts.
async fn list_accounts(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<ListAccountsQuery>,
) -> impl IntoResponse {
    let account_type = match query.account_type.as_deref().map(string_to_account_type) {
        Some(None) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "invalid_account_type",
                    "message": "Type must be asset, liability, income, or expense"
                })),
            )
                .into_response();
        }
        Some(some) => some,
        None => None,
    };

    let repo = AccountRepository::new((*state.db).clone());
    match repo.list_accounts(AccountFilter { account_type }).await {
        Ok(accounts) => {
            let items: Vec<AccountResponse> =
                accounts.into_iter().map(AccountResponse::from).collect();
            (StatusCode::OK, Json(json!({ "accounts": items }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list accounts");
            internal_error()
        }
    }
}

/// POST `/accounts` - Create a new account.
async fn create_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateAccountRequest>,
) -> impl IntoResponse {
    if let Err(response) = require_recorder(&auth) {
        return response;
    }

    let Some(account_type) = string_to_account_type(&payload.account_type) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_account_type",
                "message": "Type must be asset, liability, income, or expense"
            })),
        )
            .into_response();
    };

    if payload.name.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "missing_name",
                "message": "Account name is required"
            })),
        )
            .into_response();
    }

    let opening_balance = match payload.amount.as_deref() {
        None => Decimal::ZERO,
        Some(raw) => match Decimal::from_str(raw) {
            Ok(amount) => amount,
            Err(_) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "invalid_amount",
                        "message": "Invalid amount format"
                    })),
                )
                    .into_response();
            }
        },
    };

    let repo = AccountRepository::new((*state.db).clone());
    let input = CreateAccountInput {
        account_type,
        name: payload.name,
        opening_balance,
        subtype: payload.subtype.unwrap_or_default(),
    };

    match repo.create_account(input).await {
        Ok(account) => {
            info!(account_id = %account.id, "Account created");
            (StatusCode::CREATED, Json(AccountResponse::from(account))).into_response()
        }
        Err(AccountError::DuplicateName(name)) => (
            StatusCode::CONFLICT,
            Json(json!({
                "error": "duplicate_name",
                "message": format!("Account name '{name}' already exists")
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to create account");
            internal_error()
        }
    }
}

/// GET `/accounts/{account_id}` - Get one account.
async fn get_account(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(account_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = AccountRepository::new((*state.db).clone());

    match repo.find_account_by_id(account_id).await {
        Ok(Some(account)) => (StatusCode::OK, Json(AccountResponse::from(account))).into_response(),
        Ok(None) => account_not_found(),
        Err(e) => {
            error!(error = %e, "Failed to get account");
            internal_error()
        }
    }
}

/// PATCH `/accounts/{account_id}` - Update an account's details.
async fn update_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(account_id): Path<Uuid>,
    Json(payload): Json<UpdateAccountRequest>,
) -> impl IntoResponse {
    if let Err(response) = require_recorder(&auth) {
        return response;
    }

    let account_type = match payload.account_type.as_deref().map(string_to_account_type) {
        Some(None) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "invalid_account_type",
                    "message": "Type must be asset, liability, income, or expense"
                })),
            )
                .into_response();
        }
        Some(some) => some,
        None => None,
    };

    let repo = AccountRepository::new((*state.db).clone());
    let input = UpdateAccountInput {
        name: payload.name,
        subtype: payload.subtype,
        account_type,
    };

    match repo.update_account(account_id, input).await {
        Ok(account) => {
            info!(account_id = %account.id, "Account updated");
            (StatusCode::OK, Json(AccountResponse::from(account))).into_response()
        }
        Err(AccountError::NotFound(_)) => account_not_found(),
        Err(AccountError::DuplicateName(name)) => (
            StatusCode::CONFLICT,
            Json(json!({
                "error": "duplicate_name",
                "message": format!("Account name '{name}' already exists")
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to update account");
            internal_error()
        }
    }
}

/// DELETE `/accounts/{account_id}` - Delete an account. Admin only.
async fn delete_account(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(account_id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(response) = require_admin(&auth) {
        return response;
    }

    let repo = AccountRepository::new((*state.db).clone());

    match repo.delete_account(account_id).await {
        Ok(()) => {
            info!(account_id = %account_id, "Account deleted");
            (StatusCode::NO_CONTENT, ()).into_response()
        }
        Err(AccountError::NotFound(_)) => account_not_found(),
        Err(AccountError::HasTransactions(count)) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "account_in_use",
                "message": format!("{count} transactions still reference this account")
            })),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to delete account");
            internal_error()
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn account_type_to_string(account_type: AccountType) -> &'static str {
    match account_type {
        AccountType::Asset => "asset",
        AccountType::Liability => "liability",
        AccountType::Income => "income",
        AccountType::Expense => "expense",
    }
}

fn string_to_account_type(s: &str) -> Option<AccountType> {
    match s.to_lowercase().as_str() {
        "asset" => Some(AccountType::Asset),
        "liability" => Some(AccountType::Liability),
        "income" => Some(AccountType::Income),
        "expense" => Some(AccountType::Expense),
        _ => None,
    }
}

fn account_not_found() -> axum::response::Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "not_found",
            "message": "Account not found"
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_type_round_trip() {
        for account_type in [
            AccountType::Asset,
            AccountType::Liability,
            AccountType::Income,
            AccountType::Expense,
        ] {
            assert_eq!(
                string_to_account_type(account_type_to_string(account_type)),
                Some(account_type)
            );
        }
        assert_eq!(string_to_account_type("equity"), None);
    }
}
