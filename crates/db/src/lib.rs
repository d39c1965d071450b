//! Database layer with `SeaORM` entities and repositories.
//!
//! This crate provides:
//! - `SeaORM` entity definitions
//! - Repository abstractions for data access
//! - Database migrations
//!
//! Every paired account-balance/record mutation runs inside one database
//! transaction opened here; nothing outside this crate touches balances.

pub mod entities;
pub mod migration;
pub mod repositories;

pub use repositories::{
    AccountRepository, InvoiceRepository, ReportRepository, TransactionRepository, UserRepository,
};

use sea_orm::{Database, DatabaseConnection, DbErr};

/// Establishes a connection to the database.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    Database::connect(database_url).await
}
