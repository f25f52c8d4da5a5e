use thiserror::Error;

/// Result type alias using the canonical ExError
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code used in log events, CLI output and
/// tests. Codes never change once published.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Report corpus
    /// Report name does not split into exactly `<resource>@<attribute>`
    InvalidIdentifier,
    /// Report content is not valid JSON
    InvalidReport,
    NotFound,

    // Rules
    /// A rule is missing `violation_resource`/`violation` or has bad predicates
    MalformedRule,
    /// A rule declares a `rule_type` this build does not evaluate
    UnknownRuleType,
    /// The rule file is not a mapping of rule name to rule mapping
    MalformedRuleFile,

    // Configuration
    InvalidConfig,

    // Integration/IO
    Io,
    Serialization,
    Persistence,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidIdentifier => "ERR_INVALID_IDENTIFIER",
            ExErrorKind::InvalidReport => "ERR_INVALID_REPORT",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::MalformedRule => "ERR_MALFORMED_RULE",
            ExErrorKind::UnknownRuleType => "ERR_UNKNOWN_RULE_TYPE",
            ExErrorKind::MalformedRuleFile => "ERR_MALFORMED_RULE_FILE",
            ExErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification for programmatic handling plus the context
/// (operation, report path, rule name) needed to act on a log line.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    path: Option<String>,
    rule: Option<String>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            path: None,
            rule: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add report or file path context
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add rule name context
    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.rule = Some(rule.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Stable error code of the kind
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn rule(&self) -> Option<&str> {
        self.rule.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path)?;
        }
        if let Some(rule) = &self.rule {
            write!(f, " (rule: {})", rule)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Domain errors raised while reading the report corpus and the rule file
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DriftError {
    /// Report name is not `<resource>@<attribute>[.ext]`
    #[error("Malformed resource identifier in report name '{name}': {reason}")]
    MalformedIdentifier { name: String, reason: String },

    /// Report could not be read or parsed
    #[error("Unreadable report {path}: {reason}")]
    UnreadableReport { path: String, reason: String },

    /// Rule is missing required keys or has ill-formed predicates
    #[error("Rule {rule} is ill-formatted: {reason}")]
    MalformedRule { rule: String, reason: String },

    /// Rule declares an unrecognised rule_type
    #[error("Rule {rule} has unsupported rule_type '{rule_type}'")]
    UnknownRuleType { rule: String, rule_type: String },

    /// Rule file root is not a mapping of mappings
    #[error("Rule file is ill-formatted: {reason}")]
    MalformedRuleFile { reason: String },

    /// Serialization error (JSON encoding/decoding)
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

/// Conversion from DriftError to ExError
///
/// Domain errors are logged through the canonical facility, so every
/// variant maps onto a kind and keeps its context in structured fields.
impl From<DriftError> for ExError {
    fn from(err: DriftError) -> Self {
        let message = err.to_string();
        match err {
            DriftError::MalformedIdentifier { name, .. } => {
                ExError::new(ExErrorKind::InvalidIdentifier)
                    .with_op("parse_identifier")
                    .with_path(name)
                    .with_message(message)
            }
            DriftError::UnreadableReport { path, .. } => ExError::new(ExErrorKind::InvalidReport)
                .with_op("read_report")
                .with_path(path)
                .with_message(message),
            DriftError::MalformedRule { rule, .. } => ExError::new(ExErrorKind::MalformedRule)
                .with_op("parse_rule")
                .with_rule(rule)
                .with_message(message),
            DriftError::UnknownRuleType { rule, .. } => ExError::new(ExErrorKind::UnknownRuleType)
                .with_op("parse_rule")
                .with_rule(rule)
                .with_message(message),
            DriftError::MalformedRuleFile { .. } => ExError::new(ExErrorKind::MalformedRuleFile)
                .with_op("parse_rule_file")
                .with_message(message),
            DriftError::Serialization { .. } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }
        }
    }
}

impl From<serde_json::Error> for DriftError {
    fn from(err: serde_json::Error) -> Self {
        DriftError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ExError {
    fn from(err: serde_json::Error) -> Self {
        ExError::from(DriftError::from(err))
    }
}
