//! Invoice repository: persistence around the pure pricing logic.
//!
//! Totals are never written directly; every create and every items
//! replacement goes through `InvoiceCalculator` first.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use tally_core::invoice::{InvoiceCalculator, LineItemInput, PricedInvoice};

use crate::entities::{invoice_items, invoices, sea_orm_active_enums::PaymentStatus};

/// Error types for invoice operations.
#[derive(Debug, thiserror::Error)]
pub enum InvoiceError {
    /// Invoice number already exists.
    #[error("Invoice number '{0}' already exists")]
    DuplicateNumber(String),

    /// Invoice not found.
    #[error("Invoice not found: {0}")]
    NotFound(Uuid),

    /// An invoice needs at least one line item.
    #[error("Invoice must have at least one line item")]
    EmptyItems,

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating an invoice.
#[derive(Debug, Clone)]
pub struct CreateInvoiceInput {
    /// Unique invoice number.
    pub invoice_number: String,
    /// Customer display name.
    pub customer_name: String,
    /// Customer email.
    pub customer_email: String,
    /// Line items, in order.
    pub items: Vec<LineItemInput>,
    /// Payment method label.
    pub payment_method: String,
    /// Creating user.
    pub created_by: Uuid,
}

/// Allow-listed partial update of an invoice. Totals are absent by design:
/// they only change through an items replacement.
#[derive(Debug, Clone, Default)]
pub struct UpdateInvoiceInput {
    /// New customer name.
    pub customer_name: Option<String>,
    /// New customer email.
    pub customer_email: Option<String>,
    /// Replacement line items; non-empty triggers full repricing.
    pub items: Option<Vec<LineItemInput>>,
    /// New payment method label.
    pub payment_method: Option<String>,
    /// New payment status.
    pub status: Option<PaymentStatus>,
}

/// An invoice with its ordered line items.
#[derive(Debug, Clone)]
pub struct InvoiceWithItems {
    /// Invoice header.
    pub invoice: invoices::Model,
    /// Line items ordered by position.
    pub items: Vec<invoice_items::Model>,
}

/// Invoice repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    db: DatabaseConnection,
}

impl InvoiceRepository {
    /// Creates a new invoice repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an invoice with computed totals.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateNumber` when the invoice number is taken and
    /// `EmptyItems` when no line items were supplied.
    pub async fn create_invoice(
        &self,
        input: CreateInvoiceInput,
    ) -> Result<InvoiceWithItems, InvoiceError> {
        if input.items.is_empty() {
            return Err(InvoiceError::EmptyItems);
        }

        let existing = invoices::Entity::find()
            .filter(invoices::Column::InvoiceNumber.eq(&input.invoice_number))
            .one(&self.db)
            .await?;

        if existing.is_some() {
            return Err(InvoiceError::DuplicateNumber(input.invoice_number));
        }

        let priced = InvoiceCalculator::price_invoice(input.items);

        let txn = self.db.begin().await?;

        let now = Utc::now().into();
        let invoice = invoices::ActiveModel {
            id: Set(Uuid::new_v4()),
            invoice_number: Set(input.invoice_number),
            customer_name: Set(input.customer_name),
            customer_email: Set(input.customer_email),
            sub_total: Set(priced.sub_total),
            tax_total: Set(priced.tax_total),
            grand_total: Set(priced.grand_total),
            status: Set(PaymentStatus::Pending),
            payment_method: Set(input.payment_method),
            created_by: Set(input.created_by),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let items = insert_items(&txn, invoice.id, &priced).await?;

        txn.commit().await?;

        info!(
            invoice_id = %invoice.id,
            invoice_number = %invoice.invoice_number,
            grand_total = %invoice.grand_total,
            "Invoice created"
        );
        Ok(InvoiceWithItems { invoice, items })
    }

    /// Updates an invoice's allow-listed fields. A non-empty items
    /// replacement reprices the whole invoice and overwrites every total.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the invoice is absent.
    pub async fn update_invoice(
        &self,
        id: Uuid,
        input: UpdateInvoiceInput,
    ) -> Result<InvoiceWithItems, InvoiceError> {
        let txn = self.db.begin().await?;

        let invoice = invoices::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or(InvoiceError::NotFound(id))?;

        let repriced = if should_reprice(input.items.as_deref()) {
            let priced = InvoiceCalculator::price_invoice(input.items.unwrap_or_default());

            invoice_items::Entity::delete_many()
                .filter(invoice_items::Column::InvoiceId.eq(id))
                .exec(&txn)
                .await?;
            insert_items(&txn, id, &priced).await?;

            Some(priced)
        } else {
            None
        };

        let mut active: invoices::ActiveModel = invoice.into();

        if let Some(priced) = &repriced {
            active.sub_total = Set(priced.sub_total);
            active.tax_total = Set(priced.tax_total);
            active.grand_total = Set(priced.grand_total);
        }
        if let Some(customer_name) = input.customer_name {
            active.customer_name = Set(customer_name);
        }
        if let Some(customer_email) = input.customer_email {
            active.customer_email = Set(customer_email);
        }
        if let Some(payment_method) = input.payment_method {
            active.payment_method = Set(payment_method);
        }
        if let Some(status) = input.status {
            active.status = Set(status);
        }
        active.updated_at = Set(Utc::now().into());

        let invoice = active.update(&txn).await?;

        let items = invoice_items::Entity::find()
            .filter(invoice_items::Column::InvoiceId.eq(id))
            .order_by_asc(invoice_items::Column::Position)
            .all(&txn)
            .await?;

        txn.commit().await?;

        info!(invoice_id = %invoice.id, "Invoice updated");
        Ok(InvoiceWithItems { invoice, items })
    }

    /// Gets an invoice with its ordered items.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` when the invoice is absent.
    pub async fn get_invoice(&self, id: Uuid) -> Result<InvoiceWithItems, InvoiceError> {
        let invoice = invoices::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(InvoiceError::NotFound(id))?;

        let items = invoice_items::Entity::find()
            .filter(invoice_items::Column::InvoiceId.eq(id))
            .order_by_asc(invoice_items::Column::Position)
            .all(&self.db)
            .await?;

        Ok(InvoiceWithItems { invoice, items })
    }

    /// Lists invoice headers, newest first.
    pub async fn list_invoices(&self) -> Result<Vec<invoices::Model>, InvoiceError> {
        Ok(invoices::Entity::find()
            .order_by_desc(invoices::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }
}

/// Inserts priced items under an invoice, preserving submission order.
async fn insert_items(
    txn: &DatabaseTransaction,
    invoice_id: Uuid,
    priced: &PricedInvoice,
) -> Result<Vec<invoice_items::Model>, InvoiceError> {
    let mut models = Vec::with_capacity(priced.items.len());
    let mut position: i32 = 0;

    for item in &priced.items {
        let model = invoice_items::ActiveModel {
            id: Set(Uuid::new_v4()),
            invoice_id: Set(invoice_id),
            position: Set(position),
            description: Set(item.description.clone()),
            quantity: Set(item.quantity),
            unit_price: Set(item.unit_price),
            tax_rate: Set(item.tax_rate),
            tax_amount: Set(item.tax_amount),
            line_total: Set(item.line_total),
        }
        .insert(txn)
        .await?;

        models.push(model);
        position += 1;
    }

    Ok(models)
}

/// Whether an items field in an update should trigger repricing.
///
/// Present-but-empty items are ignored rather than wiping the invoice.
#[must_use]
pub fn should_reprice(items: Option<&[LineItemInput]>) -> bool {
    items.is_some_and(|items| !items.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn item() -> LineItemInput {
        LineItemInput {
            description: "Widget".to_string(),
            quantity: dec!(1),
            unit_price: dec!(10),
            tax_rate: None,
        }
    }

    #[test]
    fn test_should_reprice_requires_non_empty_items() {
        assert!(!should_reprice(None));
        assert!(!should_reprice(Some(&[])));
        assert!(should_reprice(Some(&[item()])));
    }
}
