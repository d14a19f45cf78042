//! Error types for taintgrep

use thiserror::Error;

/// Result type alias for taintgrep operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Main error type, modeling the taxonomy of §7: most variants are contained
/// by the orchestrator and never escape a single candidate or rule.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// No enabled rules for the requested language — aborts the scan.
    #[error("no enabled rules for the requested language")]
    RuleSetEmpty,

    #[error("matcher error: {message}")]
    MatcherError { message: String },

    #[error("AST parse error: {message}")]
    ParseError { message: String },

    #[error("unsupported file extension for rule language")]
    UnsupportedFile,

    #[error("match mode not implemented for this language")]
    UnsupportedMatchMode,

    #[error("new-rule recursion depth exceeded")]
    DepthExceeded,

    #[error("progress file IO error: {message}")]
    ProgressIoError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("configuration error: {message}")]
    ConfigError { message: String },

    #[error("internal error: {message}")]
    InternalError { message: String },
}

impl AnalysisError {
    pub fn matcher_error(message: impl Into<String>) -> Self {
        Self::MatcherError { message: message.into() }
    }

    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::ParseError { message: message.into() }
    }

    pub fn progress_io_error(message: impl Into<String>) -> Self {
        Self::ProgressIoError { message: message.into() }
    }

    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError { message: message.into() }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError { message: message.into() }
    }

    /// Category tag used for logging/metrics.
    pub fn category(&self) -> &'static str {
        match self {
            Self::RuleSetEmpty => "rule_set_empty",
            Self::MatcherError { .. } => "matcher",
            Self::ParseError { .. } => "parse",
            Self::UnsupportedFile => "unsupported_file",
            Self::UnsupportedMatchMode => "unsupported_match_mode",
            Self::DepthExceeded => "depth_exceeded",
            Self::ProgressIoError { .. } => "progress_io",
            Self::IoError(_) => "io",
            Self::JsonError(_) => "json",
            Self::ConfigError { .. } => "config",
            Self::InternalError { .. } => "internal",
        }
    }

    /// Only `RuleSetEmpty` aborts the whole scan; everything else is contained
    /// per-candidate or per-rule (§7 propagation policy).
    pub fn aborts_scan(&self) -> bool {
        matches!(self, Self::RuleSetEmpty)
    }
}
