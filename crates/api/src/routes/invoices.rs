//! Invoice management routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;
use tracing::{error, info};
use uuid::Uuid;

use super::internal_error;
use crate::{AppState, middleware::{AuthUser, require_recorder}};
use tally_core::invoice::LineItemInput;
use tally_db::{
    InvoiceRepository,
    entities::{invoice_items, invoices, sea_orm_active_enums::PaymentStatus},
    repositories::invoice::{
        CreateInvoiceInput, InvoiceError, InvoiceWithItems, UpdateInvoiceInput,
    },
};

/// Creates the invoice routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/invoices", get(list_invoices))
        .route("/invoices", post(create_invoice))
        .route("/invoices/{invoice_id}", get(get_invoice))
        .route("/invoices/{invoice_id}", patch(update_invoice))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for an invoice line item.
#[derive(Debug, Deserialize)]
pub struct LineItemRequest {
    /// What was sold.
    pub description: String,
    /// How many units (decimal string).
    pub quantity: String,
    /// Price per unit (decimal string).
    pub price: String,
    /// Flat tax percentage (decimal string); defaults to the standard 18%.
    pub tax_rate: Option<String>,
}

/// Request body for creating an invoice.
#[derive(Debug, Deserialize)]
pub struct CreateInvoiceRequest {
    /// Unique invoice number.
    pub invoice_number: String,
    /// Customer display name.
    pub customer_name: String,
    /// Customer email.
    pub customer_email: String,
    /// Line items, in order.
    pub items: Vec<LineItemRequest>,
    /// Payment method label.
    pub payment_method: String,
}

/// Request body for updating an invoice.
#[derive(Debug, Deserialize)]
pub struct UpdateInvoiceRequest {
    /// New customer name.
    pub customer_name: Option<String>,
    /// New customer email.
    pub customer_email: Option<String>,
    /// Replacement line items; non-empty triggers full repricing.
    pub items: Option<Vec<LineItemRequest>>,
    /// New payment method label.
    pub payment_method: Option<String>,
    /// New payment status: pending or paid.
    pub status: Option<String>,
}

/// Response for an invoice line item.
#[derive(Debug, Serialize)]
pub struct LineItemResponse {
    /// What was sold.
    pub description: String,
    /// How many units.
    pub quantity: String,
    /// Price per unit.
    pub price: String,
    /// Applied tax percentage.
    pub tax_rate: String,
    /// Derived tax amount.
    pub tax_amount: String,
    /// Derived line total.
    pub total: String,
}

impl From<invoice_items::Model> for LineItemResponse {
    fn from(model: invoice_items::Model) -> Self {
        Self {
            description: model.description,
            quantity: model.quantity.to_string(),
            price: model.unit_price.to_string(),
            tax_rate: model.tax_rate.to_string(),
            tax_amount: model.tax_amount.to_string(),
            total: model.line_total.to_string(),
        }
    }
}

/// Response for an invoice.
#[derive(Debug, Serialize)]
pub struct InvoiceResponse {
    /// Invoice ID.
    pub id: Uuid,
    /// Invoice number.
    pub invoice_number: String,
    /// Customer display name.
    pub customer_name: String,
    /// Customer email.
    pub customer_email: String,
    /// Line items, in order.
    pub items: Vec<LineItemResponse>,
    /// Sum of pre-tax line bases.
    pub sub_total: String,
    /// Sum of line tax amounts.
    pub tax_total: String,
    /// Subtotal plus tax total.
    pub grand_total: String,
    /// Payment status.
    pub status: String,
    /// Payment method label.
    pub payment_method: String,
    /// Creating user ID.
    pub created_by: Uuid,
    /// Created at timestamp.
    pub created_at: String,
    /// Updated at timestamp.
    pub updated_at: String,
}

impl From<InvoiceWithItems> for InvoiceResponse {
    fn from(result: InvoiceWithItems) -> Self {
        let invoice = result.invoice;
        Self {
            id: invoice.id,
            invoice_number: invoice.invoice_number,
            customer_name: invoice.customer_name,
            customer_email: invoice.customer_email,
            items: result
                .items
                .into_iter()
                .map(LineItemResponse::from)
                .collect(),
            sub_total: invoice.sub_total.to_string(),
            tax_total: invoice.tax_total.to_string(),
            grand_total: invoice.grand_total.to_string(),
            status: status_to_string(invoice.status).to_string(),
            payment_method: invoice.payment_method,
            created_by: invoice.created_by,
            created_at: invoice.created_at.to_rfc3339(),
            updated_at: invoice.updated_at.to_rfc3339(),
        }
    }
}

/// Response for an invoice list entry (no items).
#[derive(Debug, Serialize)]
pub struct InvoiceListItem {
    /// Invoice ID.
    pub id: Uuid,
    /// Invoice number.
    pub invoice_number: String,
    /// Customer display name.
    pub customer_name: String,
    /// Grand total.
    pub grand_total: String,
    /// Payment status.
    pub status: String,
    /// Created at timestamp.
    pub created_at: String,
}

impl From<invoices::Model> for InvoiceListItem {
    fn from(model: invoices::Model) -> Self {
        Self {
            id: model.id,
            invoice_number: model.invoice_number,
            customer_name: model.customer_name,
            grand_total: model.grand_total.to_string(),
            status: status_to_string(model.status).to_string(),
            created_at: model.created_at.to_rfc3339(),
        }
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/invoices` - List invoice headers.
async fn list_invoices(State(state): State<AppState>, _auth: AuthUser) -> impl IntoResponse {
    let repo = InvoiceRepository::new((*state.db).clone());

    match repo.list_invoices().await {
        Ok(models) => {
            let items: Vec<InvoiceListItem> =
                models.into_iter().map(InvoiceListItem::from).collect();
            (StatusCode::OK, Json(json!({ "invoices": items }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list invoices");
            internal_error()
        }
    }
}

/// POST `/invoices` - Create an invoice with computed totals.
async fn create_invoice(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(payload): Json<CreateInvoiceRequest>,
) -> impl IntoResponse {
    if let Err(response) = require_recorder(&auth) {
        return response;
    }

    if payload.invoice_number.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "missing_invoice_number",
                "message": "Invoice number is required"
            })),
        )
            .into_response();
    }

    let items = match parse_items(payload.items) {
        Ok(items) => items,
        Err(response) => return response,
    };

    let repo = InvoiceRepository::new((*state.db).clone());
    let input = CreateInvoiceInput {
        invoice_number: payload.invoice_number,
        customer_name: payload.customer_name,
        customer_email: payload.customer_email,
        items,
        payment_method: payload.payment_method,
        created_by: auth.user_id(),
    };

    match repo.create_invoice(input).await {
        Ok(result) => {
            info!(invoice_id = %result.invoice.id, "Invoice created");
            (StatusCode::CREATED, Json(InvoiceResponse::from(result))).into_response()
        }
        Err(e) => invoice_error_response(&e),
    }
}

/// GET `/invoices/{invoice_id}` - Get one invoice with items.
async fn get_invoice(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(invoice_id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = InvoiceRepository::new((*state.db).clone());

    match repo.get_invoice(invoice_id).await {
        Ok(result) => (StatusCode::OK, Json(InvoiceResponse::from(result))).into_response(),
        Err(e) => invoice_error_response(&e),
    }
}

/// PATCH `/invoices/{invoice_id}` - Update allow-listed invoice fields.
///
/// Replacing items reprices the invoice; totals can never be set directly.
async fn update_invoice(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(invoice_id): Path<Uuid>,
    Json(payload): Json<UpdateInvoiceRequest>,
) -> impl IntoResponse {
    if let Err(response) = require_recorder(&auth) {
        return response;
    }

    let status = match payload.status.as_deref().map(string_to_status) {
        Some(None) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "invalid_status",
                    "message": "Status must be pending or paid"
                })),
            )
                .into_response();
        }
        Some(some) => some,
        None => None,
    };

    let items = match payload.items {
        None => None,
        Some(raw) => match parse_items(raw) {
            Ok(items) => Some(items),
            Err(response) => return response,
        },
    };

    let repo = InvoiceRepository::new((*state.db).clone());
    let input = UpdateInvoiceInput {
        customer_name: payload.customer_name,
        customer_email: payload.customer_email,
        items,
        payment_method: payload.payment_method,
        status,
    };

    match repo.update_invoice(invoice_id, input).await {
        Ok(result) => {
            info!(invoice_id = %result.invoice.id, "Invoice updated");
            (StatusCode::OK, Json(InvoiceResponse::from(result))).into_response()
        }
        Err(e) => invoice_error_response(&e),
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn parse_items(
    raw: Vec<LineItemRequest>,
) -> Result<Vec<LineItemInput>, axum::response::Response> {
    let mut items = Vec::with_capacity(raw.len());

    for item in raw {
        let (Ok(quantity), Ok(price)) = (
            Decimal::from_str(&item.quantity),
            Decimal::from_str(&item.price),
        ) else {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "invalid_amount",
                    "message": "Invalid quantity or price format"
                })),
            )
                .into_response());
        };

        let tax_rate = match item.tax_rate.as_deref().map(Decimal::from_str) {
            Some(Err(_)) => {
                return Err((
                    StatusCode::BAD_REQUEST,
                    Json(json!({
                        "error": "invalid_amount",
                        "message": "Invalid tax rate format"
                    })),
                )
                    .into_response());
            }
            Some(Ok(rate)) => Some(rate),
            None => None,
        };

        items.push(LineItemInput {
            description: item.description,
            quantity,
            unit_price: price,
            tax_rate,
        });
    }

    Ok(items)
}

fn invoice_error_response(err: &InvoiceError) -> axum::response::Response {
    match err {
        InvoiceError::NotFound(_) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": "Invoice not found"
            })),
        )
            .into_response(),
        InvoiceError::DuplicateNumber(number) => (
            StatusCode::CONFLICT,
            Json(json!({
                "error": "duplicate_invoice_number",
                "message": format!("Invoice number '{number}' already exists")
            })),
        )
            .into_response(),
        InvoiceError::EmptyItems => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "empty_items",
                "message": "Invoice must have at least one line item"
            })),
        )
            .into_response(),
        InvoiceError::Database(e) => {
            error!(error = %e, "Invoice operation failed");
            internal_error()
        }
    }
}

fn status_to_string(status: PaymentStatus) -> &'static str {
    match status {
        PaymentStatus::Pending => "pending",
        PaymentStatus::Paid => "paid",
    }
}

fn string_to_status(s: &str) -> Option<PaymentStatus> {
    match s.to_lowercase().as_str() {
        "pending" => Some(PaymentStatus::Pending),
        "paid" => Some(PaymentStatus::Paid),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [PaymentStatus::Pending, PaymentStatus::Paid] {
            assert_eq!(string_to_status(status_to_string(status)), Some(status));
        }
        assert_eq!(string_to_status("overdue"), None);
    }
}
