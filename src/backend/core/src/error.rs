//! Error handling for Cadence Core.
//!
//! Schedule resolution and resource merging are total and never fail. Errors
//! come from the edges: configuration that does not validate at startup,
//! malformed manifests, and malformed identities handed in by callers.
//!
//! ```rust,ignore
//! use cadence_core::error::{CadenceError, ErrorCode, Result};
//!
//! fn load() -> Result<()> {
//!     Err(CadenceError::new(ErrorCode::InvalidConfiguration, "bad value"))
//! }
//! ```

use std::borrow::Cow;
use std::fmt;

use metrics::counter;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};

use crate::resources::QuantityError;
use crate::telemetry::metrics::ERRORS_TOTAL;

// ═══════════════════════════════════════════════════════════════════════════════
// Result Type Alias
// ═══════════════════════════════════════════════════════════════════════════════

/// A specialized Result type for Cadence operations.
pub type Result<T> = std::result::Result<T, CadenceError>;

// ═══════════════════════════════════════════════════════════════════════════════
// Error Codes
// ═══════════════════════════════════════════════════════════════════════════════

/// Machine-readable error codes.
///
/// These codes are stable and appear in logs and CLI output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Serialization Errors (2200-2299)
    SerializationError,
    DeserializationError,

    // Validation Errors (4100-4199)
    ValidationError,
    InvalidInput,
    InvalidIdentity,
    InvalidQuantity,

    // Configuration Errors (5000-5099)
    ConfigurationError,
    MissingConfiguration,
    InvalidConfiguration,

    // Internal Errors (9000-9099)
    InternalError,
}

impl ErrorCode {
    /// Get the numeric code for this error.
    pub const fn numeric_code(&self) -> u32 {
        match self {
            Self::SerializationError => 2200,
            Self::DeserializationError => 2201,

            Self::ValidationError => 4100,
            Self::InvalidInput => 4101,
            Self::InvalidIdentity => 4102,
            Self::InvalidQuantity => 4103,

            Self::ConfigurationError => 5000,
            Self::MissingConfiguration => 5001,
            Self::InvalidConfiguration => 5002,

            Self::InternalError => 9000,
        }
    }

    /// Get the error category for grouping.
    pub const fn category(&self) -> &'static str {
        match self.numeric_code() {
            2200..=2299 => "serialization",
            4100..=4199 => "validation",
            5000..=5099 => "configuration",
            9000..=9099 => "internal",
            _ => "unknown",
        }
    }

    /// Configuration errors must stop the process before it serves anything.
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ConfigurationError | Self::MissingConfiguration | Self::InvalidConfiguration
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Main Error Type
// ═══════════════════════════════════════════════════════════════════════════════

/// The main error type for Cadence Core.
#[derive(Error, Debug)]
pub struct CadenceError {
    /// Machine-readable error code
    code: ErrorCode,

    /// User-facing message
    user_message: Cow<'static, str>,

    /// Detailed internal message (for logging only)
    internal_message: Option<String>,

    /// The source error that caused this error
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl fmt::Display for CadenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.user_message)?;
        if let Some(ref internal) = self.internal_message {
            write!(f, " ({})", internal)?;
        }
        Ok(())
    }
}

impl CadenceError {
    // ─────────────────────────────────────────────────────────────────────────
    // Constructors
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a new error with code and user message.
    pub fn new(code: ErrorCode, user_message: impl Into<Cow<'static, str>>) -> Self {
        counter!(ERRORS_TOTAL, "category" => code.category()).increment(1);
        Self {
            code,
            user_message: user_message.into(),
            internal_message: None,
            source: None,
        }
    }

    /// Create an error with both user and internal messages.
    pub fn with_internal(
        code: ErrorCode,
        user_message: impl Into<Cow<'static, str>>,
        internal_message: impl Into<String>,
    ) -> Self {
        Self::new(code, user_message).with_internal_message(internal_message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorCode::ValidationError, message)
    }

    /// A global default that failed quantity validation.
    pub fn invalid_global_default(setting: &str, value: &str, source: QuantityError) -> Self {
        Self::new(
            ErrorCode::InvalidConfiguration,
            format!("global default '{}' has invalid quantity '{}'", setting, value),
        )
        .with_source(source)
    }

    /// An object identity that is not of the form `namespace/name`.
    pub fn invalid_identity(key: &str) -> Self {
        Self::new(
            ErrorCode::InvalidIdentity,
            format!("object identity '{}' must be of the form namespace/name", key),
        )
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Builder Methods
    // ─────────────────────────────────────────────────────────────────────────

    /// Add a source error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Add internal message.
    pub fn with_internal_message(mut self, message: impl Into<String>) -> Self {
        self.internal_message = Some(message.into());
        self
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn user_message(&self) -> &str {
        &self.user_message
    }

    pub fn internal_message(&self) -> Option<&str> {
        self.internal_message.as_deref()
    }

    pub fn is_fatal(&self) -> bool {
        self.code.is_fatal()
    }

    /// Log this error; fatal errors at ERROR, everything else at DEBUG.
    pub fn log(&self) {
        let code = self.code.to_string();
        let category = self.code.category();

        if self.is_fatal() {
            error!(
                error_code = %code,
                category = category,
                user_message = %self.user_message,
                internal_message = ?self.internal_message,
                source = ?self.source,
                "Fatal configuration error"
            );
        } else {
            debug!(
                error_code = %code,
                category = category,
                user_message = %self.user_message,
                "Error"
            );
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// From Implementations for Common Error Types
// ═══════════════════════════════════════════════════════════════════════════════

impl From<QuantityError> for CadenceError {
    fn from(error: QuantityError) -> Self {
        Self::new(ErrorCode::InvalidQuantity, error.to_string()).with_source(error)
    }
}

impl From<serde_yaml::Error> for CadenceError {
    fn from(error: serde_yaml::Error) -> Self {
        Self::with_internal(
            ErrorCode::DeserializationError,
            "Failed to parse manifest",
            error.to_string(),
        )
        .with_source(error)
    }
}

impl From<serde_json::Error> for CadenceError {
    fn from(error: serde_json::Error) -> Self {
        let code = if error.is_data() || error.is_syntax() || error.is_eof() {
            ErrorCode::DeserializationError
        } else {
            ErrorCode::SerializationError
        };
        Self::with_internal(code, "JSON processing failed", error.to_string()).with_source(error)
    }
}

impl From<config::ConfigError> for CadenceError {
    fn from(error: config::ConfigError) -> Self {
        let (code, user_msg) = match &error {
            config::ConfigError::NotFound(_) => (
                ErrorCode::MissingConfiguration,
                "Required configuration not found",
            ),
            config::ConfigError::PathParse(_) | config::ConfigError::FileParse { .. } => (
                ErrorCode::InvalidConfiguration,
                "Configuration file is invalid",
            ),
            _ => (
                ErrorCode::ConfigurationError,
                "Configuration error occurred",
            ),
        };

        Self::with_internal(code, user_msg, error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_categories() {
        assert_eq!(ErrorCode::InvalidQuantity.category(), "validation");
        assert_eq!(ErrorCode::InvalidConfiguration.category(), "configuration");
        assert_eq!(ErrorCode::DeserializationError.category(), "serialization");
        assert_eq!(ErrorCode::InternalError.category(), "internal");
    }

    #[test]
    fn test_only_configuration_errors_are_fatal() {
        assert!(ErrorCode::InvalidConfiguration.is_fatal());
        assert!(ErrorCode::MissingConfiguration.is_fatal());
        assert!(!ErrorCode::InvalidQuantity.is_fatal());
        assert!(!ErrorCode::DeserializationError.is_fatal());
    }

    #[test]
    fn test_invalid_global_default_carries_source() {
        let source = QuantityError::Invalid {
            input: "ten".to_string(),
            reason: "missing digits",
        };
        let error = CadenceError::invalid_global_default("global_cpu_limit", "ten", source);

        assert_eq!(error.code(), ErrorCode::InvalidConfiguration);
        assert!(error.is_fatal());
        assert!(error.user_message().contains("global_cpu_limit"));
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn test_error_display() {
        let error = CadenceError::with_internal(
            ErrorCode::DeserializationError,
            "Failed to parse manifest",
            "missing field `metadata`",
        );

        let display = format!("{}", error);
        assert!(display.contains("DeserializationError"));
        assert!(display.contains("Failed to parse manifest"));
        assert!(display.contains("missing field"));
    }

    #[test]
    fn test_from_yaml_error() {
        let yaml_error = serde_yaml::from_str::<u32>("not a number").unwrap_err();
        let error = CadenceError::from(yaml_error);
        assert_eq!(error.code(), ErrorCode::DeserializationError);
    }
}
