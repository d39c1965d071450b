//! Transaction posting rules and edit resolution.
//!
//! Everything here is pure: the functions resolve what a transaction should
//! look like and which signed balance deltas it implies, and leave the
//! atomic persistence of both to the database layer.

mod error;
mod service;
#[cfg(test)]
mod service_props;
mod types;

pub use error::LedgerError;
pub use service::PostingService;
pub use types::{
    BalanceChange, EditResolution, NewTransactionInput, ResolvedTransaction, TransactionKind,
    TransactionPatch,
};
