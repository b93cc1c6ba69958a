// PharmaGate - Pharmacy Data Interchange Gateway
// Copyright (c) 2025 PharmaGate Contributors
// Licensed under the MIT License

//! # PharmaGate - Pharmacy Data Interchange Gateway
//!
//! PharmaGate accepts prescription, patient and inventory data from pharmacy
//! automation vendors, translates each dialect into canonical tagged records
//! and commits them to the pharmacy management gateway over TCP.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Detecting** the dialect of an input (HL7, XML, JSON, tagged records,
//!   Parada, delimited) with ordered byte-level heuristics
//! - **Decoding** each dialect, including fixed-width MTS / OASIS files and
//!   Dispill comma-separated batches, into [`domain::Record`]s
//! - **Committing** write queues transactionally: every write of a
//!   transaction must be acknowledged or the transaction fails as a whole
//! - **Ingesting** from a watched directory or a (TLS) socket listener
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Decoders, dispatch, commit and ingestion front-ends
//! - [`adapters`] - Gateway connectors and the HL7 translator seam
//! - [`domain`] - Records, formats and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and payload fingerprints
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pharmagate::config::load_config;
//! use pharmagate::core::dispatch::Dispatcher;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("pharmagate.toml")?;
//! let dispatcher = Dispatcher::from_config(&config, false);
//!
//! let raw = std::fs::read("inbound/rx-0001.xml")?;
//! let result = dispatcher.classify_and_parse(&raw, None)?;
//! println!("Committed {} records", result.records_written);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All fallible operations return [`domain::Result`], whose error type
//! [`domain::PharmaGateError`] separates input errors (quarantine the file,
//! answer NAK) from gateway and I/O errors (retry later):
//!
//! ```rust
//! use pharmagate::domain::PharmaGateError;
//!
//! let err = PharmaGateError::MalformedRecord("no patient row".to_string());
//! assert!(err.is_input_error());
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
