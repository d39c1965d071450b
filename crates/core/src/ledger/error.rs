//! Ledger resolution errors.

use thiserror::Error;

/// Errors raised while resolving transaction inputs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// A required field is missing or empty.
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_the_field() {
        assert_eq!(
            LedgerError::MissingField("category").to_string(),
            "missing required field: category"
        );
    }
}
