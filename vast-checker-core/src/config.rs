//! Configuration for a checker run.
use serde::Serialize;
use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};
use thiserror::Error;

/// Target namespace of the IAB VAST 4.x schemas.
pub const VAST_NAMESPACE: &str = "http://www.iab.com/VAST";

/// Schema location used when nothing else is configured.
pub const DEFAULT_SCHEMA_PATH: &str = "./vast_4.2.xsd";

/// Directory holding the serialized VAST 4.2 documents to check.
pub const DEFAULT_INPUT_DIR: &str = "../../output/v4_2";

/// What the batch does when a file cannot be parsed as XML.
///
/// - FailFast: abort the whole run on the first unparseable file.
/// - Continue: report the failure for that file and move on.
///
/// # Examples
/// ```rust
/// use std::str::FromStr;
/// use vast_checker_core::config::FailurePolicy;
///
/// let policy = FailurePolicy::from_str("fail-fast")?;
/// assert_eq!(policy, FailurePolicy::FailFast);
/// # Ok::<(), vast_checker_core::config::ConfigParseError>(())
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    FailFast,
    #[default]
    Continue,
}

/// How the original namespace of a document's root element is treated.
///
/// - Coerce: rewrite the root into the schema namespace and say nothing.
/// - Require: rewrite it as well, but report a message when the document
///   did not declare the schema namespace itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NamespaceMode {
    #[default]
    Coerce,
    Require,
}

/// Error returned when parsing a configuration enum from a string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigParseError {
    #[error("invalid failure policy: {input}")]
    FailurePolicy { input: String },
    #[error("invalid namespace mode: {input}")]
    NamespaceMode { input: String },
}

impl FromStr for FailurePolicy {
    type Err = ConfigParseError;
    fn from_str(policy: &str) -> Result<FailurePolicy, ConfigParseError> {
        match policy.to_ascii_lowercase().replace('_', "-").as_str() {
            "fail-fast" => Ok(FailurePolicy::FailFast),
            "continue" => Ok(FailurePolicy::Continue),
            _ => Err(ConfigParseError::FailurePolicy {
                input: policy.to_string(),
            }),
        }
    }
}

impl FailurePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailurePolicy::FailFast => "fail-fast",
            FailurePolicy::Continue => "continue",
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NamespaceMode {
    type Err = ConfigParseError;
    fn from_str(mode: &str) -> Result<NamespaceMode, ConfigParseError> {
        match mode.to_ascii_lowercase().as_str() {
            "coerce" => Ok(NamespaceMode::Coerce),
            "require" => Ok(NamespaceMode::Require),
            _ => Err(ConfigParseError::NamespaceMode {
                input: mode.to_string(),
            }),
        }
    }
}

impl NamespaceMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            NamespaceMode::Coerce => "coerce",
            NamespaceMode::Require => "require",
        }
    }
}

impl fmt::Display for NamespaceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for a batch run.
///
/// # Examples
/// ```rust
/// use vast_checker_core::config::{CheckerConfig, FailurePolicy};
///
/// let config = CheckerConfig::new("schemas/vast_4.2.xsd", "output/v4_2")
///     .with_failure_policy(FailurePolicy::FailFast);
/// assert_eq!(config.namespace(), vast_checker_core::config::VAST_NAMESPACE);
/// ```
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    schema_path: PathBuf,
    input_dir: PathBuf,
    namespace: String,
    failure_policy: FailurePolicy,
    namespace_mode: NamespaceMode,
}

impl CheckerConfig {
    pub fn new(schema_path: impl Into<PathBuf>, input_dir: impl Into<PathBuf>) -> Self {
        Self {
            schema_path: schema_path.into(),
            input_dir: input_dir.into(),
            ..Self::default()
        }
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn with_namespace_mode(mut self, mode: NamespaceMode) -> Self {
        self.namespace_mode = mode;
        self
    }

    pub fn schema_path(&self) -> &Path {
        &self.schema_path
    }

    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }

    pub fn namespace_mode(&self) -> NamespaceMode {
        self.namespace_mode
    }
}

impl Default for CheckerConfig {
    fn default() -> Self {
        CheckerConfig {
            schema_path: PathBuf::from(DEFAULT_SCHEMA_PATH),
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            namespace: VAST_NAMESPACE.to_string(),
            failure_policy: FailurePolicy::default(),
            namespace_mode: NamespaceMode::default(),
        }
    }
}
