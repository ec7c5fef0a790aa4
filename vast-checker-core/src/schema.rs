//! XSD loading and document validation.
use std::fmt;
use std::path::{Path, PathBuf};

use libxml::{
    error::{StructuredError, XmlErrorLevel},
    schemas::{SchemaParserContext, SchemaValidationContext},
};
use serde::Serialize;
use thiserror::Error;

use crate::document::CandidateDocument;

/// Errors emitted while loading a schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("schema file not found: {}", path.display())]
    NotFound { path: PathBuf },
    #[error("invalid schema path: {}", path.display())]
    InvalidPath { path: PathBuf },
    #[error("failed to compile schema {}: {}", path.display(), messages.join("; "))]
    Compile {
        path: PathBuf,
        messages: Vec<String>,
    },
}

/// Severity of a single validation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Fatal => "fatal",
        };
        f.write_str(label)
    }
}

/// One schema-rule violation found in a candidate document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationMessage {
    pub severity: Severity,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
}

impl ValidationMessage {
    pub fn new(severity: Severity, text: impl Into<String>) -> Self {
        Self {
            severity,
            text: text.into(),
            line: None,
            column: None,
        }
    }
}

impl From<StructuredError> for ValidationMessage {
    fn from(error: StructuredError) -> Self {
        let severity = match error.level {
            XmlErrorLevel::Warning => Severity::Warning,
            XmlErrorLevel::Fatal => Severity::Fatal,
            XmlErrorLevel::None | XmlErrorLevel::Error => Severity::Error,
        };
        let text = error
            .message
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or("unknown validation error")
            .to_string();
        let position = |value: Option<i32>| {
            value
                .and_then(|v| u32::try_from(v).ok())
                .filter(|v| *v > 0)
        };
        Self {
            severity,
            text,
            line: position(error.line),
            column: position(error.col),
        }
    }
}

/// A compiled XSD schema together with its target namespace.
///
/// Compiled once per run and reused for every document.
pub struct Schema {
    namespace: String,
    path: PathBuf,
    context: SchemaValidationContext,
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("namespace", &self.namespace)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl Schema {
    /// Load and compile the XSD at `path`.
    ///
    /// # Examples
    /// ```rust,no_run
    /// use vast_checker_core::{config::VAST_NAMESPACE, schema::Schema};
    ///
    /// let schema = Schema::load("./vast_4.2.xsd", VAST_NAMESPACE)?;
    /// assert_eq!(schema.namespace(), VAST_NAMESPACE);
    /// # Ok::<(), vast_checker_core::schema::SchemaError>(())
    /// ```
    pub fn load(path: impl AsRef<Path>, namespace: impl Into<String>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        // libxml only reports a generic parser failure for missing files
        if !path.is_file() {
            return Err(SchemaError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let xsd_path = path.to_str().ok_or_else(|| SchemaError::InvalidPath {
            path: path.to_path_buf(),
        })?;

        let mut parser_ctx = SchemaParserContext::from_file(xsd_path);
        let context = SchemaValidationContext::from_parser(&mut parser_ctx).map_err(|errors| {
            SchemaError::Compile {
                path: path.to_path_buf(),
                messages: errors
                    .into_iter()
                    .map(|e| ValidationMessage::from(e).text)
                    .collect(),
            }
        })?;
        tracing::debug!(schema = %path.display(), "compiled schema");

        Ok(Self {
            namespace: namespace.into(),
            path: path.to_path_buf(),
            context,
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Validate a document, returning every violation found.
    ///
    /// An empty vector means the document is valid.
    pub fn validate(&mut self, document: &CandidateDocument) -> Vec<ValidationMessage> {
        match self.context.validate_document(document.as_document()) {
            Ok(()) => Vec::new(),
            Err(errors) => errors.into_iter().map(ValidationMessage::from).collect(),
        }
    }
}
