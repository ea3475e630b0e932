//! Error handling for the Royal Burger client core
//!
//! The event bus, state store and renderer never fail: contract
//! violations there are logged no-ops. Errors only arise at the API
//! boundary, where loosely shaped JSON payloads are normalized into the
//! typed domain structs in [`crate::data`].
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Domain payload error type
///
/// Represents a payload that could not be mapped onto its typed struct,
/// or one that was mapped but carries values the client refuses to show.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// A required field is absent under every accepted name
    #[error("Missing field '{field}' in {payload} payload")]
    MissingField {
        /// The payload kind (e.g. "cart item").
        payload: &'static str,
        /// The canonical field name.
        field: &'static str,
    },

    /// A field is present but holds an unusable value
    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue {
        /// The canonical field name.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// Unknown order status string
    #[error("Unknown order status: {status}")]
    UnknownStatus {
        /// The raw status string received from the API.
        status: String,
    },

    /// The payload did not match the expected shape at all
    #[error("Malformed {payload} payload: {reason}")]
    Malformed {
        /// The payload kind.
        payload: &'static str,
        /// The deserializer message.
        reason: String,
    },
}

impl DomainError {
    /// Shorthand for [`DomainError::InvalidValue`]
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        DomainError::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}

/// Main error type for the client core
#[derive(Error, Debug)]
pub enum Error {
    /// Domain payload error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a domain payload error
    pub fn is_domain_error(&self) -> bool {
        matches!(self, Error::Domain(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_error_display() {
        let err = DomainError::MissingField {
            payload: "ingredient",
            field: "name",
        };
        assert_eq!(err.to_string(), "Missing field 'name' in ingredient payload");

        let err = DomainError::invalid("quantity", "must not be negative");
        assert_eq!(
            err.to_string(),
            "Invalid value for 'quantity': must not be negative"
        );
    }

    #[test]
    fn test_error_conversion() {
        let err: Error = DomainError::UnknownStatus {
            status: "lost".to_string(),
        }
        .into();
        assert!(err.is_domain_error());
        assert_eq!(err.to_string(), "Unknown order status: lost");

        let err = Error::other("boom");
        assert!(!err.is_domain_error());
    }
}
