//! Transaction management routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, patch, post},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use tracing::{error, info};
use uuid::Uuid;

use super::internal_error;
use crate::{AppState, middleware::{AuthUser, require_recorder}};
use tally_core::ledger::{NewTransactionInput, TransactionKind, TransactionPatch};
use tally_db::{
    TransactionRepository,
    entities::transactions,
    repositories::transaction::{TransactionError, TransactionFilter},
};

/// Creates the transaction routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/transactions", get(list_transactions))
        .route("/transactions", post(create_transaction))
        .route("/transactions/{transaction_id}", get(get_transaction))
        .route("/transactions/{transaction_id}", patch(edit_transaction))
        .route("/transactions/{transaction_id}", delete(soft_delete_transaction))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Query parameters for listing transactions.
#[derive(Debug, Deserialize)]
pub struct ListTransactionsQuery {
    /// Filter by kind.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Filter by owning account.
    pub account: Option<Uuid>,
    /// Filter by date range start (YYYY-MM-DD).
    pub from: Option<NaiveDate>,
    /// Filter by date range end (YYYY-MM-DD).
    pub to: Option<NaiveDate>,
    /// Include soft-deleted records.
    #[serde(default)]
    pub include_deleted: bool,
}

/// Request body for creating a transaction.
#[derive(Debug, Deserialize)]
pub struct CreateTransactionRequest {
    /// Kind: income, expense, loan, or investment.
    #[serde(rename = "type")]
    pub kind: String,
    /// Category label.
    pub category: String,
    /// Pre-tax amount (decimal string).
    pub amount: String,
    /// Flat tax percentage (decimal string); defaults to zero.
    pub tax_rate: Option<String>,
    /// Payment mode, e.g. "Cash".
    pub payment_mode: String,
    /// Owning account ID.
    pub account: Uuid,
    /// Effective date (YYYY-MM-DD); defaults to today.
    pub date: Option<NaiveDate>,
    /// Free-text description.
    pub description: Option<String>,
}

/// Query parameters for fetching one transaction.
#[derive(Debug, Deserialize)]
pub struct GetTransactionQuery {
    /// Return the record even if soft-deleted.
    #[serde(default)]
    pub include_deleted: bool,
}

/// Request body for editing a transaction.
#[derive(Debug, Deserialize)]
pub struct EditTransactionRequest {
    /// New kind.
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// New category label.
    pub category: Option<String>,
    /// New pre-tax amount (decimal string).
    pub amount: Option<String>,
    /// New tax percentage (decimal string).
    pub tax_rate: Option<String>,
    /// New payment mode.
    pub payment_mode: Option<String>,
    /// New owning account ID.
    pub account: Option<Uuid>,
    /// New effective date.
    pub date: Option<NaiveDate>,
    /// New description.
    pub description: Option<String>,
}

/// Response for a transaction.
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    /// Transaction ID.
    pub id: Uuid,
    /// Kind.
    #[serde(rename = "type")]
    pub kind: String,
    /// Category label.
    pub category: String,
    /// Pre-tax amount.
    pub amount: String,
    /// Tax percentage.
    pub tax_rate: String,
    /// Derived tax amount.
    pub tax_amount: String,
    /// Derived taxed total.
    pub total: String,
    /// Payment mode.
    pub payment_mode: String,
    /// Owning account ID.
    pub account: Uuid,
    /// Effective date.
    pub date: String,
    /// Description.
    pub description: Option<String>,
    /// Creating user ID.
    pub created_by: Uuid,
    /// Soft-delete flag.
    pub is_deleted: bool,
    /// Created at timestamp.
    pub created_at: String,
    /// Updated at timestamp.
    pub updated_at: String,
}

impl From<transactions::Model> for TransactionResponse {
    fn from(model: transactions::Model) -> Self {
        let kind: TransactionKind = model.kind.into();
        Self {
            id: model.id,
            kind: kind.to_string(),
            category: model.category,
            amount: model.amount.to_string(),
            tax_rate: model.tax_rate.to_string(),
            tax_amount: model.tax_amount.to_string(),
            total: model.total.to_string(),
            payment_mode: model.payment_mode,
            account: model.account_id,
            date: model.txn_date.to_string(),
            description: model.description,
            created_by: model.created_by,
            is_deleted: model.is_deleted,
            created_at: model.created_at.to_rfc3339(),
            updated_at: model.updated_at.to_rfc3339(),
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/transactions` - List transactions with filters.
async fn list_transactions(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<ListTransactionsQuery>,
) -> impl IntoResponse {
    let kind = match query.kind.as_deref().map(TransactionKind::from_str) {
        Some(Err(_)) => return invalid_kind(),
        Some(Ok(kind)) => Some(kind.into()),
        None => None,
    };

    let repo = TransactionRepository::new((*state.db).clone());
    let filter = TransactionFilter {
        kind,
        account_id: query.account,
        date_from: query.from,
        date_to: query.to,
        include_deleted: query.include_deleted,
    };

    match repo.list_transactions(filter).await {
        Ok(models) => {
            let items: Vec<TransactionResponse> =
                models.into_iter().map(TransactionResponse::from).collect();
            (StatusCode::OK, Json(json!({ "transactions": items }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list transactions");
            internal_error()
        }
    }
}

/// POST `/transactions` - Record a transaction against an account.
async fn create_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateTransactionRequest>,
) -> impl IntoResponse {
    if let Err(response) = require_recorder(&auth) {
        return response;
    }

    let Ok(kind) = TransactionKind::from_str(&payload.kind) else {
        return invalid_kind();
    };

    let Ok(amount) = Decimal::from_str(&payload.amount) else {
        return invalid_amount();
    };

    let tax_rate = match payload.tax_rate.as_deref() {
        None => None,
        Some(raw) => match Decimal::from_str(raw) {
            Ok(rate) => Some(rate),
            Err(_) => return invalid_amount(),
        },
    };

    let repo = TransactionRepository::new((*state.db).clone());
    let input = NewTransactionInput {
        kind,
        category: payload.category,
        amount,
        tax_rate,
        payment_mode: payload.payment_mode,
        account_id: payload.account,
        txn_date: payload.date,
        description: payload.description,
        created_by: auth.user_id(),
    };

    match repo.create_transaction(input).await {
        Ok(model) => {
            info!(transaction_id = %model.id, "Transaction created");
            (StatusCode::CREATED, Json(TransactionResponse::from(model))).into_response()
        }
        Err(e) => transaction_error_response(&e),
    }
}

/// GET `/transactions/{transaction_id}` - Get one transaction.
async fn get_transaction(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(transaction_id): Path<Uuid>,
    Query(query): Query<GetTransactionQuery>,
) -> impl IntoResponse {
    let repo = TransactionRepository::new((*state.db).clone());

    match repo.get_transaction(transaction_id, query.include_deleted).await {
        Ok(model) => (StatusCode::OK, Json(TransactionResponse::from(model))).into_response(),
        Err(e) => transaction_error_response(&e),
    }
}

/// PATCH `/transactions/{transaction_id}` - Edit a transaction.
///
/// The repository reverses the stored balance effect and applies the new one
/// inside a single atomic unit.
async fn edit_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(transaction_id): Path<Uuid>,
    Json(payload): Json<EditTransactionRequest>,
) -> impl IntoResponse {
    if let Err(response) = require_recorder(&auth) {
        return response;
    }

    let kind = match payload.kind.as_deref().map(TransactionKind::from_str) {
        Some(Err(_)) => return invalid_kind(),
        Some(Ok(kind)) => Some(kind),
        None => None,
    };

    let amount = match payload.amount.as_deref().map(Decimal::from_str) {
        Some(Err(_)) => return invalid_amount(),
        Some(Ok(amount)) => Some(amount),
        None => None,
    };

    let tax_rate = match payload.tax_rate.as_deref().map(Decimal::from_str) {
        Some(Err(_)) => return invalid_amount(),
        Some(Ok(rate)) => Some(rate),
        None => None,
    };

    let repo = TransactionRepository::new((*state.db).clone());
    let patch = TransactionPatch {
        kind,
        category: payload.category,
        amount,
        tax_rate,
        payment_mode: payload.payment_mode,
        account_id: payload.account,
        txn_date: payload.date,
        description: payload.description.map(Some),
    };

    match repo.edit_transaction(transaction_id, patch).await {
        Ok(model) => {
            info!(transaction_id = %model.id, "Transaction edited");
            (StatusCode::OK, Json(TransactionResponse::from(model))).into_response()
        }
        Err(e) => transaction_error_response(&e),
    }
}

/// DELETE `/transactions/{transaction_id}` - Soft-delete a transaction.
async fn soft_delete_transaction(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(transaction_id): Path<Uuid>,
) -> impl IntoResponse {
    if let Err(response) = require_recorder(&auth) {
        return response;
    }

    let repo = TransactionRepository::new((*state.db).clone());

    match repo.soft_delete_transaction(transaction_id).await {
        Ok(model) => {
            info!(transaction_id = %model.id, "Transaction soft-deleted");
            (StatusCode::NO_CONTENT, ()).into_response()
        }
        Err(e) => transaction_error_response(&e),
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn transaction_error_response(err: &TransactionError) -> axum::response::Response {
    match err {
        TransactionError::NotFound(_) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": "Transaction not found"
            })),
        )
            .into_response(),
        TransactionError::AccountNotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "account_not_found",
                "message": format!("Account not found: {id}")
            })),
        )
            .into_response(),
        TransactionError::Validation(e) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "validation_error",
                "message": e.to_string()
            })),
        )
            .into_response(),
        TransactionError::ConcurrentModification(_) => (
            StatusCode::CONFLICT,
            Json(json!({
                "error": "concurrent_modification",
                "message": "The account was updated concurrently, please retry"
            })),
        )
            .into_response(),
        TransactionError::Database(e) => {
            error!(error = %e, "Transaction operation failed");
            internal_error()
        }
    }
}

fn invalid_kind() -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": "invalid_transaction_type",
            "message": "Type must be income, expense, loan, or investment"
        })),
    )
        .into_response()
}

fn invalid_amount() -> axum::response::Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": "invalid_amount",
            "message": "Invalid amount format"
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("income", true)]
    #[case("expense", true)]
    #[case("loan", true)]
    #[case("investment", true)]
    #[case("transfer", false)]
    fn test_kind_parsing(#[case] raw: &str, #[case] ok: bool) {
        assert_eq!(TransactionKind::from_str(raw).is_ok(), ok);
    }
}
