//! Core types, traits and error handling shared by every taintgrep crate.

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

pub use error::{AnalysisError, Result};
pub use traits::{visit_nodes, AstNode, AstProvider, NewRuleSpec, ParseReport, ParseReportCode};
pub use types::{Candidate, ChainStep, ChainStepKind, Finding, Language, Level, Severity};
