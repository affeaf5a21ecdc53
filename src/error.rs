// ⚠️ Import Errors - Contract violations at the import boundary
// "No match" and "rate limited" are values, not errors. These are for
// malformed input handed to the core by the caller.

use thiserror::Error;

/// Result type for boundary validation
pub type Result<T> = std::result::Result<T, ImportError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    /// A required field was empty or blank
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Date was not an ISO calendar date (YYYY-MM-DD)
    #[error("Invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    /// Amount was not a decimal number
    #[error("Invalid amount '{0}'")]
    InvalidAmount(String),

    /// Rate limit policy or matcher threshold that can never admit anything
    #[error("Invalid policy: {0}")]
    InvalidPolicy(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ImportError::MissingField("supplier").to_string(),
            "Missing required field: supplier"
        );
        assert_eq!(
            ImportError::InvalidDate("12/25/2024".to_string()).to_string(),
            "Invalid date '12/25/2024': expected YYYY-MM-DD"
        );
    }
}
