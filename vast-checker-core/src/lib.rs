//! Batch validation of VAST 4.2 documents against the IAB XSD schema.
//!
//! # Examples
//! ```rust,no_run
//! use vast_checker_core::{batch::BatchValidator, config::CheckerConfig};
//!
//! let config = CheckerConfig::new("./vast_4.2.xsd", "../../output/v4_2");
//! BatchValidator::new(config).run(&mut std::io::stdout())?;
//! # Ok::<(), vast_checker_core::Error>(())
//! ```
pub mod batch;
pub mod config;
pub mod document;
pub mod schema;

use thiserror::Error;

/// Top-level error wrapper for checker operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] config::ConfigParseError),
    #[error(transparent)]
    Schema(#[from] schema::SchemaError),
    #[error(transparent)]
    Document(#[from] document::DocumentError),
    #[error(transparent)]
    Checker(#[from] batch::CheckerError),
}
