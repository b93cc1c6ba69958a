//! Result type alias for PharmaGate
//!
//! This module provides a convenient Result type alias that uses
//! `PharmaGateError` as the error type.

use super::errors::PharmaGateError;

/// Result type alias for PharmaGate operations
///
/// # Examples
///
/// ```
/// use pharmagate::domain::result::Result;
/// use pharmagate::domain::errors::PharmaGateError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(PharmaGateError::MalformedRecord("short row".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, PharmaGateError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::PharmaGateError;

    #[test]
    fn test_result_ok() {
        let result: Result<i32> = Ok(42);
        assert!(result.is_ok());
        if let Ok(value) = result {
            assert_eq!(value, 42);
        }
    }

    #[test]
    fn test_result_err() {
        let result: Result<i32> = Err(PharmaGateError::Other("test error".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> Result<i32> {
            Ok(42)
        }

        let value = inner()?;
        assert_eq!(value, 42);
        Ok(())
    }
}
