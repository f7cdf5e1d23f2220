//! Error taxonomy for the WFAP protocol core.

use thiserror::Error;

/// Diagnostic attached to an offer that could not be parsed during selection.
///
/// Parse failures are recovered per-offer and reported alongside the final
/// result rather than raised.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ParseDiagnostic {
    /// Index of the offending entry in the input batch.
    pub index: usize,
    /// Why the entry was excluded.
    pub reason: String,
}

impl std::fmt::Display for ParseDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "offer[{}]: {}", self.index, self.reason)
    }
}

/// WFAP protocol errors.
#[derive(Debug, Error)]
pub enum WfapError {
    /// Malformed or missing Intent/Offer field. Surfaced to the caller,
    /// never retried.
    #[error("validation error: {field}: {message}")]
    Validation { field: String, message: String },

    /// Signing/serialization failure. Fatal to the single operation only.
    #[error("encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// Signature material could not be decoded or compared.
    #[error("crypto error: {0}")]
    Crypto(String),

    /// Every lender evaluation failed or every signature check failed.
    #[error("no offers collected: {0}")]
    NoOffers(String),

    /// All offers were unparsable during selection.
    #[error("no valid offers after sanitization ({} rejected)", .0.len())]
    NoValidOffers(Vec<ParseDiagnostic>),

    /// All-zero criteria weight vector.
    #[error("invalid criteria: all weights are zero")]
    InvalidCriteria,
}

impl WfapError {
    /// Shorthand for a validation error naming the offending field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for WFAP operations.
pub type WfapResult<T> = Result<T, WfapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_names_field() {
        let err = WfapError::validation("amount", "must be a positive number");
        assert_eq!(
            err.to_string(),
            "validation error: amount: must be a positive number"
        );
    }

    #[test]
    fn no_valid_offers_reports_count() {
        let err = WfapError::NoValidOffers(vec![
            ParseDiagnostic {
                index: 0,
                reason: "unable to parse JSON".to_string(),
            },
            ParseDiagnostic {
                index: 2,
                reason: "offer is null".to_string(),
            },
        ]);
        assert_eq!(err.to_string(), "no valid offers after sanitization (2 rejected)");
    }

    #[test]
    fn parse_diagnostic_display() {
        let diag = ParseDiagnostic {
            index: 1,
            reason: "unable to parse JSON".to_string(),
        };
        assert_eq!(diag.to_string(), "offer[1]: unable to parse JSON");
    }
}
