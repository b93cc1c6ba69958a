//! HL7 v2 decoder
//!
//! Translation is delegated to an [`Hl7Translator`]; this decoder only
//! queues what the translator returns.

use super::{text, DecodeOptions, Decoded, Decoder};
use crate::adapters::hl7::Hl7Translator;
use crate::domain::{InputFormat, PharmaGateError, Result};
use std::sync::Arc;

/// Decoder backed by an external HL7 translator
#[derive(Clone)]
pub struct Hl7Decoder {
    translator: Arc<dyn Hl7Translator>,
}

impl Hl7Decoder {
    /// Wraps a translator
    pub fn new(translator: Arc<dyn Hl7Translator>) -> Self {
        Self { translator }
    }
}

impl std::fmt::Debug for Hl7Decoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hl7Decoder").finish_non_exhaustive()
    }
}

impl Decoder for Hl7Decoder {
    fn format(&self) -> InputFormat {
        InputFormat::Hl7
    }

    fn decode(&self, raw: &[u8], options: &DecodeOptions) -> Result<Decoded> {
        let records = self.translator.translate(&text(raw))?;
        if records.is_empty() {
            return Err(PharmaGateError::MalformedRecord(
                "HL7 message translated to no records".to_string(),
            ));
        }
        let mut queue = options.queue();
        for record in records {
            queue.push_tagged(record);
        }
        Ok(Decoded::single(queue))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translator_output_is_queued_in_order() {
        let translator = |message: &str| -> Result<Vec<String>> {
            Ok(message
                .lines()
                .filter(|l| l.starts_with("PID"))
                .map(|_| "<Record><Table>Patient</Table></Record>".to_string())
                .chain(std::iter::once("<Record><Table>Rx</Table></Record>".to_string()))
                .collect())
        };
        let decoder = Hl7Decoder::new(Arc::new(translator));
        let decoded = decoder
            .decode(b"MSH|^~\\&|RX\nPID|1||42", &DecodeOptions::default())
            .unwrap();

        let wire: Vec<_> = decoded.transactions[0]
            .entries()
            .iter()
            .map(|e| e.to_wire().into_owned())
            .collect();
        assert_eq!(wire.len(), 2);
        assert!(wire[1].contains("<Table>Rx</Table>"));
    }

    #[test]
    fn test_translator_errors_propagate() {
        let decoder = Hl7Decoder::new(Arc::new(|_: &str| -> Result<Vec<String>> {
            Err(PharmaGateError::MalformedRecord("bad MSH".into()))
        }));
        assert!(matches!(
            decoder.decode(b"MSH|", &DecodeOptions::default()),
            Err(PharmaGateError::MalformedRecord(_))
        ));
    }

    #[test]
    fn test_empty_translation_rejected() {
        let decoder = Hl7Decoder::new(Arc::new(|_: &str| -> Result<Vec<String>> { Ok(vec![]) }));
        assert!(decoder.decode(b"MSH|", &DecodeOptions::default()).is_err());
    }
}
