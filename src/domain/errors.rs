//! Domain error types
//!
//! This module defines the error hierarchy for PharmaGate. Whole-unit failures
//! (unidentified input, bad fixed-width length, XML validation, gateway
//! failures) are variants of [`PharmaGateError`] and propagate to the ingestion
//! front-end. Per-record failures inside a multi-record document are reported
//! as [`PharmaGateError::MalformedRecord`], logged, and skipped by the decoder.

use thiserror::Error;

/// Main PharmaGate error type
#[derive(Debug, Error)]
pub enum PharmaGateError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The dispatcher could not classify the input
    #[error("Unidentified input format ({length} bytes, sha256 {digest})")]
    UnidentifiedFormat {
        /// Input length in bytes
        length: usize,
        /// Hex SHA-256 digest of the payload, for correlating with quarantined files
        digest: String,
    },

    /// The input was classified but no decoder is available for it
    #[error("Unsupported input format: {0}")]
    UnsupportedFormat(String),

    /// A single record (or, when nothing decoded, the whole batch) was malformed
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// Fixed-width input whose length is not a multiple of the record size
    #[error("Invalid {format} input length {length}: not a multiple of {record_size}")]
    InvalidLength {
        /// Layout name
        format: &'static str,
        /// Actual input length
        length: usize,
        /// Declared record size
        record_size: usize,
    },

    /// An XML element marked `required="true"` had no content
    #[error("Missing required field: {0}")]
    MissingRequiredField(String),

    /// An XML element exceeded its declared `size`
    #[error("Field overflow: {field} is {actual} characters, limit {size}")]
    FieldOverflow {
        /// Element name
        field: String,
        /// Declared size limit
        size: usize,
        /// Actual content length
        actual: usize,
    },

    /// An XML element's numeric content exceeded its declared `maxvalue`
    #[error("Numeric overflow: {field} value {value} exceeds {max}")]
    NumericOverflow {
        /// Element name
        field: String,
        /// Declared maximum
        max: f64,
        /// Parsed content
        value: f64,
    },

    /// Gateway transport or acknowledgment failure during commit
    #[error("Gateway write failure: {0}")]
    GatewayWriteFailure(#[from] GatewayError),

    /// Socket listener construction or runtime errors
    #[error("Listener error: {0}")]
    Listener(String),

    /// Serialization/deserialization errors (JSON, XML)
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl PharmaGateError {
    /// Whether this error concerns the shape of the input (as opposed to
    /// configuration or the gateway). Front-ends quarantine on input errors.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            PharmaGateError::UnidentifiedFormat { .. }
                | PharmaGateError::UnsupportedFormat(_)
                | PharmaGateError::MalformedRecord(_)
                | PharmaGateError::InvalidLength { .. }
                | PharmaGateError::MissingRequiredField(_)
                | PharmaGateError::FieldOverflow { .. }
                | PharmaGateError::NumericOverflow { .. }
                | PharmaGateError::Serialization(_)
        )
    }

    /// Whether the gateway refused a write it received. Resending the same
    /// input would be refused again, unlike a connection or transport fault.
    pub fn is_gateway_rejection(&self) -> bool {
        matches!(
            self,
            PharmaGateError::GatewayWriteFailure(GatewayError::Rejected { .. })
        )
    }
}

/// Gateway-specific errors
///
/// Errors raised while writing a transaction to the downstream gateway.
/// A rejection is a gateway-level refusal (the write was not acknowledged);
/// everything else is a transport problem.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Failed to connect to the gateway
    #[error("Failed to connect to gateway {address}: {reason}")]
    ConnectionFailed {
        /// host:port that was dialled
        address: String,
        /// Underlying reason
        reason: String,
    },

    /// The gateway answered with something other than an acknowledgment
    #[error("Gateway rejected write {index} of transaction {transaction_id}")]
    Rejected {
        /// Transaction the write belonged to
        transaction_id: String,
        /// Zero-based index of the rejected write within the transaction
        index: usize,
    },

    /// The connection failed mid-write
    #[error("Write {index} failed: {reason}")]
    WriteFailed {
        /// Zero-based index of the failed write
        index: usize,
        /// Underlying reason
        reason: String,
    },

    /// The gateway did not answer within the configured timeout
    #[error("Gateway timeout: {0}")]
    Timeout(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for PharmaGateError {
    fn from(err: std::io::Error) -> Self {
        PharmaGateError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for PharmaGateError {
    fn from(err: serde_json::Error) -> Self {
        PharmaGateError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for PharmaGateError {
    fn from(err: toml::de::Error) -> Self {
        PharmaGateError::Configuration(format!("TOML parse error: {err}"))
    }
}

// Conversion from XML parse errors
impl From<roxmltree::Error> for PharmaGateError {
    fn from(err: roxmltree::Error) -> Self {
        PharmaGateError::Serialization(format!("XML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PharmaGateError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");

        let err = PharmaGateError::InvalidLength {
            format: "MTS",
            length: 100,
            record_size: 2566,
        };
        assert_eq!(
            err.to_string(),
            "Invalid MTS input length 100: not a multiple of 2566"
        );
    }

    #[test]
    fn test_gateway_error_conversion() {
        let gateway_err = GatewayError::Timeout("5 seconds".to_string());
        let err: PharmaGateError = gateway_err.into();
        assert!(matches!(err, PharmaGateError::GatewayWriteFailure(_)));
        assert!(!err.is_input_error());
    }

    #[test]
    fn test_input_error_classification() {
        assert!(PharmaGateError::MissingRequiredField("Sig".into()).is_input_error());
        assert!(PharmaGateError::UnidentifiedFormat {
            length: 3,
            digest: "ab".into()
        }
        .is_input_error());
        assert!(!PharmaGateError::Io("disk".into()).is_input_error());
    }

    #[test]
    fn test_gateway_rejection_classification() {
        let rejected: PharmaGateError = GatewayError::Rejected {
            transaction_id: "t1".into(),
            index: 0,
        }
        .into();
        assert!(rejected.is_gateway_rejection());
        assert!(!rejected.is_input_error());

        let broken: PharmaGateError = GatewayError::WriteFailed {
            index: 2,
            reason: "connection reset".into(),
        }
        .into();
        assert!(!broken.is_gateway_rejection());
        assert!(!PharmaGateError::MalformedRecord("x".into()).is_gateway_rejection());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: PharmaGateError = io_err.into();
        assert!(matches!(err, PharmaGateError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: PharmaGateError = json_err.into();
        assert!(matches!(err, PharmaGateError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: PharmaGateError = toml_err.into();
        assert!(matches!(err, PharmaGateError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_xml_error_conversion() {
        let xml_err = roxmltree::Document::parse("<Record>").unwrap_err();
        let err: PharmaGateError = xml_err.into();
        assert!(matches!(err, PharmaGateError::Serialization(_)));
    }
}
