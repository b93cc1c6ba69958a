//! Canonical tagged text pass-through
//!
//! Input that is already `<Record>…</Record>` text goes to the gateway
//! byte-for-byte as a single write.

use super::{text, DecodeOptions, Decoded, Decoder};
use crate::domain::{InputFormat, PharmaGateError, Result};

/// Pass-through for canonical tagged text
#[derive(Debug, Default, Clone, Copy)]
pub struct TaggedDecoder;

impl Decoder for TaggedDecoder {
    fn format(&self) -> InputFormat {
        InputFormat::Tagged
    }

    fn decode(&self, raw: &[u8], options: &DecodeOptions) -> Result<Decoded> {
        let body = text(raw);
        if body.trim().is_empty() {
            return Err(PharmaGateError::MalformedRecord(
                "tagged input is empty".to_string(),
            ));
        }
        let mut queue = options.queue();
        queue.push_tagged(body.into_owned());
        Ok(Decoded::single(queue))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passthrough_is_unchanged() {
        let raw = "<Record><Table>Store</Table><Action>Add</Action>\
                   <RxSys_StoreID>169252</RxSys_StoreID></Record>\r\n";
        let decoded = TaggedDecoder
            .decode(raw.as_bytes(), &DecodeOptions::default())
            .unwrap();
        let entries = decoded.transactions[0].entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].to_wire(), raw);
    }

    #[test]
    fn test_blank_input_rejected() {
        assert!(TaggedDecoder
            .decode(b"  \n", &DecodeOptions::default())
            .is_err());
    }
}
