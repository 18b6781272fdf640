//! # Payment Error Types
//!
//! Typed error handling for the checkout engine.
//! All payment operations return `Result<T, PaymentError>`.

use thiserror::Error;

/// Core error type for all checkout operations
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Configuration errors (missing keys, invalid config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The checkout request broke one of the validation rules.
    /// The message is the rule text shown to the caller.
    #[error("{0}")]
    Validation(String),

    /// Payment provider API error
    #[error("Provider error [{provider}]: {message}")]
    ProviderError { provider: String, message: String },

    /// Network/HTTP error communicating with a remote service
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Account lookup from a bearer credential failed
    #[error("Account lookup failed: {0}")]
    AccountLookup(String),

    /// Customer-mapping storage failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PaymentError {
    /// Shorthand for a validation failure
    pub fn validation(message: impl Into<String>) -> Self {
        PaymentError::Validation(message.into())
    }

    /// Returns true if the caller sent a malformed request
    pub fn is_validation(&self) -> bool {
        matches!(self, PaymentError::Validation(_))
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            PaymentError::Validation(_) => 400,
            PaymentError::Configuration(_)
            | PaymentError::ProviderError { .. }
            | PaymentError::NetworkError(_)
            | PaymentError::AccountLookup(_)
            | PaymentError::Storage(_)
            | PaymentError::Serialization(_)
            | PaymentError::Internal(_) => 500,
        }
    }

    /// Message placed in the `error` field of a response body.
    ///
    /// The underlying message without the category prefix `Display` adds.
    pub fn client_message(&self) -> String {
        match self {
            PaymentError::Configuration(message)
            | PaymentError::Validation(message)
            | PaymentError::ProviderError { message, .. }
            | PaymentError::NetworkError(message)
            | PaymentError::AccountLookup(message)
            | PaymentError::Storage(message)
            | PaymentError::Serialization(message)
            | PaymentError::Internal(message) => message.clone(),
        }
    }
}

/// Result type alias for payment operations
pub type PaymentResult<T> = Result<T, PaymentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(PaymentError::validation("Mode is required").status_code(), 400);
        assert_eq!(
            PaymentError::ProviderError {
                provider: "stripe".into(),
                message: "No such price".into()
            }
            .status_code(),
            500
        );
        assert_eq!(PaymentError::NetworkError("timeout".into()).status_code(), 500);
    }

    #[test]
    fn test_client_message_is_verbatim() {
        let err = PaymentError::ProviderError {
            provider: "stripe".into(),
            message: "No such price: 'price_missing'".into(),
        };
        assert_eq!(err.client_message(), "No such price: 'price_missing'");

        let err = PaymentError::validation("Cancel URL is required");
        assert_eq!(err.client_message(), "Cancel URL is required");
        assert_eq!(err.to_string(), "Cancel URL is required");
        assert!(err.is_validation());
    }

    #[test]
    fn test_client_message_drops_category_prefix() {
        let err = PaymentError::NetworkError("error sending request: connection reset".into());
        assert_eq!(err.to_string(), "Network error: error sending request: connection reset");
        assert_eq!(err.client_message(), "error sending request: connection reset");

        let err = PaymentError::Serialization("Failed to parse Stripe response: EOF".into());
        assert_eq!(err.client_message(), "Failed to parse Stripe response: EOF");
    }
}
