//! The AST Provider contract (§4.3, §6) — external to the engine core.
//!
//! The matching pipeline, the rule registry and the taint core are all
//! implemented in this workspace; parsing source bytes into a tree is not.
//! `AstNode`/`AstProvider` are the seam: anything that can hand back a tree
//! walkable through `AstNode` and answer `scan_parser`/`init_match_rule`
//! plugs into the taint core unchanged.

use crate::types::{ChainStep, Language};
use crate::Result;
use std::path::Path;

/// A node in a parsed syntax tree, dyn-compatible so different language
/// backends can hand back trait objects without a shared concrete AST.
pub trait AstNode: Send + Sync {
    /// A language-backend-defined tag, e.g. "assignment", "call", "program".
    fn node_type(&self) -> &str;

    fn child_count(&self) -> usize;

    fn child(&self, index: usize) -> Option<&dyn AstNode>;

    /// 1-based source line this node starts on, if known.
    fn line(&self) -> Option<usize>;

    /// Raw source text this node spans, if retained.
    fn text(&self) -> Option<&str>;
}

/// Visit every node in the tree depth-first.
pub fn visit_nodes(node: &dyn AstNode, visitor: &mut dyn FnMut(&dyn AstNode)) {
    visitor(node);
    for i in 0..node.child_count() {
        if let Some(child) = node.child(i) {
            visit_nodes(child, visitor);
        }
    }
}

/// The four non-sink-reached verdict codes, plus the sink-reached and
/// spawn-new-rule codes, exactly as specified in §4.3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseReportCode {
    /// `1` — tainted sink, argument is controllable.
    Vulnerable,
    /// `2` — tainted but a sanitizer dominates the sink.
    Fixed,
    /// `3` — partially resolved; heuristic positive.
    Unconfirmed,
    /// `-1` — argument provably constant / uncontrollable.
    Uncontrollable,
    /// `4` — taint exits this function through a parameter.
    NewRule,
}

/// One report returned by `AstProvider::scan_parser` for a candidate sink call.
#[derive(Debug, Clone)]
pub struct ParseReport {
    pub code: ParseReportCode,
    pub chain: Vec<ChainStep>,
    /// Present only for `NewRule`: the enclosing function's name, to seed a
    /// synthesized `FUNCTION_PARAM_CONTROLLABLE` rule.
    pub source: Option<String>,
}

impl ParseReport {
    pub fn vulnerable(chain: Vec<ChainStep>) -> Self {
        Self { code: ParseReportCode::Vulnerable, chain, source: None }
    }

    pub fn fixed(chain: Vec<ChainStep>) -> Self {
        Self { code: ParseReportCode::Fixed, chain, source: None }
    }

    pub fn unconfirmed(chain: Vec<ChainStep>) -> Self {
        Self { code: ParseReportCode::Unconfirmed, chain, source: None }
    }

    pub fn uncontrollable(chain: Vec<ChainStep>) -> Self {
        Self { code: ParseReportCode::Uncontrollable, chain, source: None }
    }

    pub fn new_rule(function_name: impl Into<String>, chain: Vec<ChainStep>) -> Self {
        Self { code: ParseReportCode::NewRule, chain, source: Some(function_name.into()) }
    }
}

/// A matcher-ready rule body synthesized from a `NewRule` hint (§6).
#[derive(Debug, Clone)]
pub struct NewRuleSpec {
    pub match_regex: String,
    pub anti_regex: Option<String>,
    pub sink_name: String,
    pub param_index: usize,
}

/// The external AST Provider contract consumed by the taint core (§4.3, §6).
pub trait AstProvider: Send + Sync {
    /// Parse a file's source into a syntax tree suitable for traversal.
    fn parse(&self, file: &Path, source: &str) -> Result<Box<dyn AstNode>>;

    /// Trace every call to one of `sinks` at `line` in `file`, returning a
    /// verdict report per matched call site.
    fn scan_parser(
        &self,
        sinks: &[String],
        line: usize,
        file: &Path,
        sanitizers: &std::collections::HashMap<String, Vec<String>>,
        sources: &[String],
    ) -> Result<Vec<ParseReport>>;

    /// Convert a `NewRule` hint (a function name) into a matcher-ready rule
    /// body for the given language.
    fn init_match_rule(&self, hint: &str, language: Language) -> Result<NewRuleSpec>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Leaf {
        ty: &'static str,
        line: usize,
        text: String,
    }

    impl AstNode for Leaf {
        fn node_type(&self) -> &str {
            self.ty
        }
        fn child_count(&self) -> usize {
            0
        }
        fn child(&self, _index: usize) -> Option<&dyn AstNode> {
            None
        }
        fn line(&self) -> Option<usize> {
            Some(self.line)
        }
        fn text(&self) -> Option<&str> {
            Some(&self.text)
        }
    }

    #[test]
    fn visit_nodes_visits_self_when_no_children() {
        let leaf = Leaf { ty: "call", line: 3, text: "echo($x)".into() };
        let mut seen = Vec::new();
        visit_nodes(&leaf, &mut |n| seen.push(n.node_type().to_string()));
        assert_eq!(seen, vec!["call"]);
    }

    #[test]
    fn parse_report_constructors_set_expected_code() {
        assert_eq!(ParseReport::vulnerable(vec![]).code, ParseReportCode::Vulnerable);
        assert_eq!(ParseReport::fixed(vec![]).code, ParseReportCode::Fixed);
        assert_eq!(ParseReport::unconfirmed(vec![]).code, ParseReportCode::Unconfirmed);
        assert_eq!(ParseReport::uncontrollable(vec![]).code, ParseReportCode::Uncontrollable);
        let nr = ParseReport::new_rule("wrap", vec![]);
        assert_eq!(nr.code, ParseReportCode::NewRule);
        assert_eq!(nr.source.as_deref(), Some("wrap"));
    }
}
