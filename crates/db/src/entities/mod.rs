//! `SeaORM` entity definitions.

pub mod accounts;
pub mod invoice_items;
pub mod invoices;
pub mod sea_orm_active_enums;
pub mod transactions;
pub mod users;
