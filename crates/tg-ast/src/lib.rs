//! AST Provider (C3, §4.3): the `AstNode`/`AstProvider` contract re-exported
//! from `tg-core`, plus `PhpLineAst`, a concrete line-oriented implementation
//! that is enough to drive and test the taint core end-to-end.

mod hint;
mod node;
mod scan;
mod statements;

use std::path::Path;

use tg_core::{AstNode, AstProvider, Language, NewRuleSpec, ParseReport, Result};

pub use node::LineNode;
pub use statements::{build_statements, Statement, StatementKind};

/// Line-oriented AST provider in the teacher's `base_adapter` idiom: one
/// statement per non-blank, non-comment source line.
#[derive(Debug, Default, Clone, Copy)]
pub struct PhpLineAst;

impl PhpLineAst {
    pub fn new() -> Self {
        Self
    }
}

impl AstProvider for PhpLineAst {
    fn parse(&self, _file: &Path, source: &str) -> Result<Box<dyn AstNode>> {
        Ok(Box::new(LineNode::program(source)))
    }

    fn scan_parser(
        &self,
        sinks: &[String],
        line: usize,
        file: &Path,
        sanitizers: &std::collections::HashMap<String, Vec<String>>,
        sources: &[String],
    ) -> Result<Vec<ParseReport>> {
        scan::scan_sink_calls(sinks, line, file, sanitizers, sources)
    }

    fn init_match_rule(&self, hint: &str, language: Language) -> Result<NewRuleSpec> {
        hint::build_new_rule_spec(hint, language)
    }
}
