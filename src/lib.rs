//! `taintgrep`: a rule-driven SAST engine with recursive intra-procedural
//! taint analysis. This crate re-exports the workspace's component crates
//! under one root, in the teacher's aggregator-crate style.

pub use tg_ast::{self as ast, PhpLineAst};
pub use tg_core as core;
pub use tg_corpus as corpus;
pub use tg_dataflow as dataflow;
pub use tg_engine as engine;
pub use tg_matcher as matcher;
pub use tg_rules as rules;

pub mod prelude {
    pub use tg_core::{
        visit_nodes, AnalysisError, AstNode, AstProvider, Candidate, ChainStep, ChainStepKind, Finding, Language, Level,
        NewRuleSpec, ParseReport, ParseReportCode, Result, Severity,
    };
    pub use tg_corpus::Corpus;
    pub use tg_dataflow::{SkipReason, TaintCore, TaintVerdict};
    pub use tg_engine::{Orchestrator, ResultCollector, ScanState, ScanStatus, Session};
    pub use tg_matcher::Matcher;
    pub use tg_rules::{load_catalog, load_rules_dir, MatchMode, RepairCatalog, Rule, RuleRegistry, RuleStatus};
}
