//! Format dispatcher
//!
//! Looks up the decoder for an input (explicit hint or [`classify`]) and
//! commits the resulting transactions through the shared [`GatewayWriter`].

use super::detect::classify;
use super::summary::CommitResult;
use crate::adapters::gateway::{create_connector, ACK, NAK};
use crate::adapters::hl7::Hl7Translator;
use crate::config::PharmaGateConfig;
use crate::core::commit::{GatewayWriter, TransactionFlags};
use crate::core::decoders::delimited::DelimitedDecoder;
use crate::core::decoders::dispill::DispillDecoder;
use crate::core::decoders::fixed_width::FixedWidthDecoder;
use crate::core::decoders::hl7::Hl7Decoder;
use crate::core::decoders::json::JsonDecoder;
use crate::core::decoders::parada::ParadaDecoder;
use crate::core::decoders::tagged::TaggedDecoder;
use crate::core::decoders::xml::XmlDecoder;
use crate::core::decoders::{DecodeOptions, Decoded, Decoder};
use crate::domain::{InputFormat, PharmaGateError, Result};
use crate::logging::payload;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

/// Routes input units to decoders and commits what they produce
pub struct Dispatcher {
    writer: Arc<GatewayWriter>,
    options: DecodeOptions,
    decoders: HashMap<InputFormat, Box<dyn Decoder>>,
}

impl Dispatcher {
    /// Creates a dispatcher with every built-in decoder registered.
    ///
    /// HL7 is only available after [`Dispatcher::with_hl7_translator`].
    pub fn new(writer: Arc<GatewayWriter>, flags: TransactionFlags) -> Self {
        let mut dispatcher = Self {
            writer,
            options: DecodeOptions { flags },
            decoders: HashMap::new(),
        };
        dispatcher.register(XmlDecoder);
        dispatcher.register(JsonDecoder);
        dispatcher.register(TaggedDecoder);
        dispatcher.register(ParadaDecoder);
        dispatcher.register(DelimitedDecoder);
        dispatcher.register(DispillDecoder);
        dispatcher.register(FixedWidthDecoder::mts());
        dispatcher.register(FixedWidthDecoder::oasis());
        dispatcher
    }

    /// Dispatcher writing to the gateway `config` describes (or a dry-run
    /// connector)
    pub fn from_config(config: &PharmaGateConfig, dry_run: bool) -> Self {
        let writer = GatewayWriter::new(create_connector(config, dry_run));
        Self::new(Arc::new(writer), TransactionFlags::from(&config.gateway))
    }

    /// Gateway address, for logs
    pub fn gateway_address(&self) -> String {
        self.writer.address()
    }

    /// Enables HL7 input through an external translator
    pub fn with_hl7_translator(mut self, translator: Arc<dyn Hl7Translator>) -> Self {
        self.register(Hl7Decoder::new(translator));
        self
    }

    /// Registers (or replaces) the decoder for its format
    pub fn register(&mut self, decoder: impl Decoder + 'static) {
        self.decoders.insert(decoder.format(), Box::new(decoder));
    }

    /// Formats with a registered decoder
    pub fn supported_formats(&self) -> Vec<InputFormat> {
        InputFormat::ALL
            .into_iter()
            .filter(|f| self.decoders.contains_key(f))
            .collect()
    }

    /// Resolves the format of `raw`: the hint when given, else the heuristics.
    ///
    /// # Errors
    ///
    /// Returns `UnidentifiedFormat` (after logging a preview and digest of
    /// the payload) when no heuristic matches.
    pub fn resolve(&self, raw: &[u8], hint: Option<InputFormat>) -> Result<InputFormat> {
        if let Some(format) = hint {
            return Ok(format);
        }
        match classify(raw) {
            Some(classification) => {
                tracing::debug!(%classification, "Input classified");
                Ok(classification.format)
            }
            None => {
                let digest = payload::digest(raw);
                tracing::error!(
                    length = raw.len(),
                    digest = %digest,
                    preview = %payload::preview(raw),
                    "Unidentified input format"
                );
                Err(PharmaGateError::UnidentifiedFormat {
                    length: raw.len(),
                    digest,
                })
            }
        }
    }

    /// Decodes without committing
    ///
    /// # Errors
    ///
    /// Returns `UnidentifiedFormat`, `UnsupportedFormat` (no decoder
    /// registered, e.g. HL7 without a translator) or the decoder's error.
    pub fn decode(&self, raw: &[u8], hint: Option<InputFormat>) -> Result<(InputFormat, Decoded)> {
        let format = self.resolve(raw, hint)?;
        let decoder = self.decoders.get(&format).ok_or_else(|| {
            tracing::error!(
                %format,
                digest = %payload::digest(raw),
                "No decoder registered for format"
            );
            PharmaGateError::UnsupportedFormat(format.to_string())
        })?;

        crate::log_decode_start!(format, raw.len());
        let decoded = decoder.decode(raw, &self.options)?;
        Ok((format, decoded))
    }

    /// Decodes `raw` and commits every transaction it produced, in order.
    ///
    /// The first failed transaction stops the run; transactions committed
    /// before it stay committed.
    ///
    /// # Errors
    ///
    /// Any error of [`Dispatcher::decode`], or `GatewayWriteFailure`.
    pub fn classify_and_parse(&self, raw: &[u8], hint: Option<InputFormat>) -> Result<CommitResult> {
        let mut committed = 0;
        self.classify_and_parse_resuming(raw, hint, &mut committed)
    }

    /// Like [`Dispatcher::classify_and_parse`], but skips the first
    /// `*committed` transactions and advances the counter as each later one
    /// is acknowledged.
    ///
    /// Decoding is deterministic, so a caller that keeps the counter across
    /// a failed attempt can resend the same input without replaying the
    /// transactions the gateway already holds.
    ///
    /// # Errors
    ///
    /// Same as [`Dispatcher::classify_and_parse`]. On error `*committed`
    /// tells how many transactions are on the gateway.
    pub fn classify_and_parse_resuming(
        &self,
        raw: &[u8],
        hint: Option<InputFormat>,
        committed: &mut usize,
    ) -> Result<CommitResult> {
        let started = Instant::now();
        let (format, decoded) = self.decode(raw, hint)?;

        let mut result = CommitResult::new(format);
        result.skipped = decoded.skipped;
        let total = decoded.transactions.len();
        if *committed > 0 {
            tracing::info!(
                %format,
                resumed_at = *committed,
                total,
                "Resuming partially committed input"
            );
        }

        for (index, queue) in decoded.transactions.iter().enumerate().skip(*committed) {
            match self.writer.commit(queue) {
                Ok(receipt) => {
                    *committed = index + 1;
                    result.push(receipt);
                }
                Err(e) => {
                    tracing::error!(
                        %format,
                        transaction_id = %queue.transaction_id(),
                        committed = index,
                        total,
                        error = %e,
                        "Transaction failed, remaining transactions abandoned"
                    );
                    return Err(e);
                }
            }
        }

        result.duration = started.elapsed();
        result.log();
        Ok(result)
    }
}

/// Wire response for an ingestion result: [`ACK`] on success, otherwise
/// [`NAK`] followed by the error text
pub fn respond(outcome: &Result<CommitResult>) -> Vec<u8> {
    match outcome {
        Ok(_) => vec![ACK],
        Err(e) => {
            let mut out = vec![NAK];
            out.extend_from_slice(e.to_string().as_bytes());
            out
        }
    }
}
