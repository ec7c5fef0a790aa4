//! Directory-driven batch validation.
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{CheckerConfig, FailurePolicy, NamespaceMode};
use crate::document::{CandidateDocument, DocumentError};
use crate::schema::{Schema, SchemaError, Severity, ValidationMessage};

pub const START_BANNER: &str = "Start VAST schema checker!";
pub const DONE_BANNER: &str = "Done!";

/// Errors that abort a batch run.
#[derive(Debug, Error)]
pub enum CheckerError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("cannot read input directory {}: {source}", path.display())]
    InputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to check {}: {source}", path.display())]
    Document {
        path: PathBuf,
        #[source]
        source: DocumentError,
    },
    #[error("failed to write report: {0}")]
    Output(#[from] io::Error),
}

/// Result of checking one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub messages: Vec<ValidationMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileReport {
    fn checked(path: PathBuf, messages: Vec<ValidationMessage>) -> Self {
        Self {
            path,
            messages,
            error: None,
        }
    }

    fn failed(path: PathBuf, error: &DocumentError) -> Self {
        Self {
            path,
            messages: Vec::new(),
            error: Some(error.to_string()),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.error.is_none() && self.messages.is_empty()
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }
}

/// Outcome of a whole batch, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub failure_policy: FailurePolicy,
    pub namespace_mode: NamespaceMode,
    pub files: Vec<FileReport>,
}

impl BatchSummary {
    pub fn checked(&self) -> usize {
        self.files.len()
    }

    pub fn valid(&self) -> usize {
        self.files.iter().filter(|f| f.is_valid()).count()
    }

    pub fn invalid(&self) -> usize {
        self.files
            .iter()
            .filter(|f| !f.is_failed() && !f.messages.is_empty())
            .count()
    }

    pub fn failed(&self) -> usize {
        self.files.iter().filter(|f| f.is_failed()).count()
    }

    pub fn message_count(&self) -> usize {
        self.files.iter().map(|f| f.messages.len()).sum()
    }
}

/// List the regular files directly inside `dir`, sorted by path.
pub fn enumerate_files(dir: &Path) -> Result<Vec<PathBuf>, CheckerError> {
    let input_dir_error = |source: io::Error| CheckerError::InputDir {
        path: dir.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(input_dir_error)? {
        let path = entry.map_err(input_dir_error)?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Validates every file of a directory against one schema.
///
/// # Examples
/// ```rust,no_run
/// use vast_checker_core::{batch::BatchValidator, config::CheckerConfig};
///
/// let validator = BatchValidator::new(CheckerConfig::default());
/// let summary = validator.run(&mut std::io::stdout())?;
/// println!("{} file(s) with messages", summary.invalid());
/// # Ok::<(), vast_checker_core::batch::CheckerError>(())
/// ```
#[derive(Debug, Clone)]
pub struct BatchValidator {
    config: CheckerConfig,
}

impl BatchValidator {
    pub fn new(config: CheckerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    /// Run the batch, writing the line-oriented report to `out`.
    ///
    /// Under [`FailurePolicy::FailFast`] the first file that cannot be
    /// loaded aborts the run and the closing banner is not written.
    pub fn run<W: Write>(&self, out: &mut W) -> Result<BatchSummary, CheckerError> {
        writeln!(out, "{START_BANNER}")?;

        let mut schema = Schema::load(self.config.schema_path(), self.config.namespace())?;
        let files = enumerate_files(self.config.input_dir())?;
        info!(
            dir = %self.config.input_dir().display(),
            files = files.len(),
            policy = %self.config.failure_policy(),
            namespace_mode = %self.config.namespace_mode(),
            "checking directory"
        );

        let mut summary = BatchSummary {
            failure_policy: self.config.failure_policy(),
            namespace_mode: self.config.namespace_mode(),
            files: Vec::new(),
        };
        for path in files {
            writeln!(out, "Check '{}'", path.display())?;
            match self.check_file(&mut schema, &path) {
                Ok(report) => {
                    for message in &report.messages {
                        writeln!(out, "Message: {}", message.text)?;
                    }
                    summary.files.push(report);
                }
                Err(source) => match self.config.failure_policy() {
                    FailurePolicy::FailFast => {
                        return Err(CheckerError::Document { path, source });
                    }
                    FailurePolicy::Continue => {
                        warn!(file = %path.display(), error = %source, "skipping file");
                        writeln!(out, "Error: {source}")?;
                        summary.files.push(FileReport::failed(path, &source));
                    }
                },
            }
        }

        writeln!(out, "{DONE_BANNER}")?;
        info!(
            checked = summary.checked(),
            invalid = summary.invalid(),
            failed = summary.failed(),
            "batch finished"
        );
        Ok(summary)
    }

    /// Check one file with this run's namespace mode.
    pub fn check_file(
        &self,
        schema: &mut Schema,
        path: &Path,
    ) -> Result<FileReport, DocumentError> {
        check_document(schema, path, self.config.namespace_mode())
    }
}

/// Load one file, coerce its root namespace and validate it.
pub fn check_document(
    schema: &mut Schema,
    path: &Path,
    mode: NamespaceMode,
) -> Result<FileReport, DocumentError> {
    let mut document = CandidateDocument::from_file(path)?;
    let mut messages = Vec::new();

    if mode == NamespaceMode::Require && document.original_namespace() != Some(schema.namespace())
    {
        messages.push(ValidationMessage::new(
            Severity::Error,
            format!(
                "Root element '{}' is not in the namespace '{}'.",
                document.original_name(),
                schema.namespace()
            ),
        ));
    }

    document.coerce_namespace(schema.namespace())?;
    messages.extend(schema.validate(&document));
    debug!(file = %path.display(), messages = messages.len(), "validated");

    Ok(FileReport::checked(path.to_path_buf(), messages))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_counts_each_outcome_once() {
        let summary = BatchSummary {
            files: vec![
                FileReport::checked("a.xml".into(), Vec::new()),
                FileReport::checked(
                    "b.xml".into(),
                    vec![
                        ValidationMessage::new(Severity::Error, "one"),
                        ValidationMessage::new(Severity::Error, "two"),
                    ],
                ),
                FileReport::failed("c.xml".into(), &DocumentError::MissingRoot),
            ],
            ..Default::default()
        };
        assert_eq!(summary.checked(), 3);
        assert_eq!(summary.valid(), 1);
        assert_eq!(summary.invalid(), 1);
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.message_count(), 2);
    }

    #[test]
    fn missing_input_dir_is_fatal() {
        let err = enumerate_files(Path::new("definitely/not/here")).unwrap_err();
        assert!(matches!(err, CheckerError::InputDir { .. }));
    }
}
