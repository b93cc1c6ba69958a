//! HL7 v2 collaborator
//!
//! HL7 message translation is owned by an external component; the gateway
//! only needs the seam. A dispatcher built without a translator rejects HL7
//! input with `UnsupportedFormat`.

use crate::domain::Result;

/// Translates one HL7 v2 message into canonical tagged records
pub trait Hl7Translator: Send + Sync {
    /// Returns the canonical `<Record>…</Record>` strings for `message`, in
    /// commit order.
    ///
    /// # Errors
    ///
    /// Returns an input error when the message cannot be translated.
    fn translate(&self, message: &str) -> Result<Vec<String>>;
}

impl<F> Hl7Translator for F
where
    F: Fn(&str) -> Result<Vec<String>> + Send + Sync,
{
    fn translate(&self, message: &str) -> Result<Vec<String>> {
        self(message)
    }
}
