//! Line-oriented statement extraction, in the teacher's
//! `base_adapter::parse_php_style` idiom: classify each non-blank,
//! non-comment source line by shape, without vendoring a real grammar.

use once_cell::sync::Lazy;
use regex::Regex;

static FUNCTION_DECL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^function\s+(\w+)\s*\(([^)]*)\)").unwrap());
static ASSIGNMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\$(\w+)\s*=(?![=>])\s*(.+?);?\s*$").unwrap());
static RETURN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^return\s+(.+?);?\s*$").unwrap());
static CALL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\$?(\w+)\s*\(([^()]*)\)").unwrap());
static VAR_REF: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$(\w+)").unwrap());
static CALL_IN_EXPR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\w+)\s*\(([^()]*)\)").unwrap());

#[derive(Debug, Clone)]
pub enum StatementKind {
    Assignment { variable: String, expr: String },
    Call { callee: String, args: Vec<String> },
    Return { expr: String },
    FunctionDecl { name: String, params: Vec<String> },
    Other,
}

#[derive(Debug, Clone)]
pub struct Statement {
    pub kind: StatementKind,
    pub line: usize,
    pub text: String,
}

impl StatementKind {
    pub fn tag(&self) -> &'static str {
        match self {
            StatementKind::Assignment { .. } => "assignment",
            StatementKind::Call { .. } => "call",
            StatementKind::Return { .. } => "return",
            StatementKind::FunctionDecl { .. } => "function_decl",
            StatementKind::Other => "other",
        }
    }
}

/// Classify every source line into a flat statement list (§4.3). Real
/// nesting (function bodies, if/else blocks) is not tracked; the taint
/// walk treats the whole file as dominated by line order, which is the
/// line-oriented engine's stand-in for scope.
pub fn build_statements(source: &str) -> Vec<Statement> {
    let mut statements = Vec::new();

    for (idx, raw_line) in source.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = raw_line.trim();
        if trimmed.is_empty() || trimmed.starts_with("//") || trimmed.starts_with('#') || trimmed.starts_with("/*") {
            continue;
        }

        let kind = classify(trimmed);
        statements.push(Statement { kind, line: line_no, text: trimmed.to_string() });
    }

    statements
}

fn classify(line: &str) -> StatementKind {
    if let Some(caps) = FUNCTION_DECL.captures(line) {
        let name = caps[1].to_string();
        let params = caps[2]
            .split(',')
            .map(|p| p.trim().trim_start_matches('$').split_whitespace().last().unwrap_or("").to_string())
            .filter(|p| !p.is_empty())
            .collect();
        return StatementKind::FunctionDecl { name, params };
    }

    if let Some(caps) = ASSIGNMENT.captures(line) {
        return StatementKind::Assignment { variable: caps[1].to_string(), expr: caps[2].to_string() };
    }

    if let Some(caps) = RETURN.captures(line) {
        return StatementKind::Return { expr: caps[1].to_string() };
    }

    if let Some(caps) = CALL.captures(line) {
        let callee = caps[1].to_string();
        let args = split_args(&caps[2]);
        return StatementKind::Call { callee, args };
    }

    StatementKind::Other
}

/// Split a naive comma-separated argument list. Does not understand
/// nested parens/strings containing commas; good enough for the
/// single-level call sites this engine is meant to trace.
pub fn split_args(raw: &str) -> Vec<String> {
    raw.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect()
}

/// Every `$name` reference inside an arbitrary expression fragment.
pub fn variable_refs(expr: &str) -> Vec<String> {
    VAR_REF.captures_iter(expr).map(|c| c[1].to_string()).collect()
}

/// The first `name(args)` call inside an arbitrary expression fragment, if
/// any (used to classify an assignment's right-hand side).
pub fn first_call(expr: &str) -> Option<(String, Vec<String>)> {
    CALL_IN_EXPR.captures(expr).map(|c| (c[1].to_string(), split_args(&c[2])))
}

pub fn is_literal(expr: &str) -> bool {
    let expr = expr.trim();
    if expr.is_empty() {
        return false;
    }
    let is_quoted = (expr.starts_with('"') && expr.ends_with('"')) || (expr.starts_with('\'') && expr.ends_with('\''));
    let is_numeric = expr.chars().all(|c| c.is_ascii_digit() || c == '.' || c == '-');
    (is_quoted || is_numeric) && !expr.contains('$')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_assignment_call_return_and_decl() {
        let source = "function handler($input) {\n$clean = htmlspecialchars($input);\necho($clean);\nreturn $clean;\n}\n";
        let statements = build_statements(source);
        assert_eq!(statements.len(), 4);
        assert!(matches!(statements[0].kind, StatementKind::FunctionDecl { .. }));
        assert!(matches!(statements[1].kind, StatementKind::Assignment { .. }));
        assert!(matches!(statements[2].kind, StatementKind::Call { .. }));
        assert!(matches!(statements[3].kind, StatementKind::Return { .. }));
    }

    #[test]
    fn blank_and_comment_lines_are_skipped() {
        let source = "// a comment\n\n$x = 1;\n# also a comment\n";
        let statements = build_statements(source);
        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].line, 3);
    }

    #[test]
    fn assignment_does_not_match_equality_comparison() {
        let statements = build_statements("$x == $y;\n");
        assert!(matches!(statements[0].kind, StatementKind::Other));
    }

    #[test]
    fn is_literal_rejects_expressions_with_variables() {
        assert!(is_literal("\"hello\""));
        assert!(is_literal("42"));
        assert!(!is_literal("$x"));
        assert!(!is_literal("\"a\" . $x"));
    }
}
