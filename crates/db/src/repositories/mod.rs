//! Repository abstractions for data access.

pub mod account;
pub mod invoice;
pub mod report;
pub mod transaction;
pub mod user;

pub use account::AccountRepository;
pub use invoice::InvoiceRepository;
pub use report::ReportRepository;
pub use transaction::TransactionRepository;
pub use user::UserRepository;
