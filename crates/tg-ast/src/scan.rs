//! The intra-procedural dominating-definition walk (§4.3, §4.4).
//!
//! `sanitizers` arrives pre-filtered by the caller (`tg-dataflow`) to just
//! the sanitizer functions effective for the rule under evaluation — this
//! module only ever asks "is this function a sanitizer at all", never which
//! rule id it covers, since by the time a candidate reaches here the
//! taint core has already decided that question.

use std::collections::HashMap;
use std::path::Path;

use tg_core::{AnalysisError, ChainStep, ChainStepKind, ParseReport, Result};

use crate::statements::{self, Statement, StatementKind};

const MAX_RESOLUTION_DEPTH: u32 = tg_core::constants::MAX_RECURSION_DEPTH;

enum Resolution {
    Vulnerable(Vec<ChainStep>),
    Fixed(Vec<ChainStep>),
    Uncontrollable(Vec<ChainStep>),
    Unconfirmed(Vec<ChainStep>),
    NewRule(String, Vec<ChainStep>),
}

pub fn scan_sink_calls(
    sinks: &[String],
    line: usize,
    file: &Path,
    sanitizers: &HashMap<String, Vec<String>>,
    sources: &[String],
) -> Result<Vec<ParseReport>> {
    let source = std::fs::read_to_string(file).map_err(AnalysisError::from)?;
    let all = statements::build_statements(&source);

    let Some(call_stmt) = all.iter().find(|s| s.line == line) else {
        return Err(AnalysisError::parse_error(format!("no statement at {}:{}", file.display(), line)));
    };

    let (callee, args) = match &call_stmt.kind {
        StatementKind::Call { callee, args } => (callee.clone(), args.clone()),
        StatementKind::Assignment { expr, .. } => match statements::first_call(expr) {
            Some((callee, args)) => (callee, args),
            None => return Ok(Vec::new()),
        },
        _ => return Ok(Vec::new()),
    };

    if !sinks.iter().any(|s| s == &callee) {
        return Ok(Vec::new());
    }

    if args.is_empty() {
        let chain = vec![ChainStep::new(ChainStepKind::SinkCall, call_stmt.text.clone(), file.to_path_buf(), line)];
        return Ok(vec![ParseReport::uncontrollable(chain)]);
    }

    let mut reports = Vec::new();
    for arg in &args {
        let sink_step = ChainStep::new(ChainStepKind::SinkCall, call_stmt.text.clone(), file.to_path_buf(), line);
        let resolution = resolve_expr(arg, &all, line, file, sanitizers, sources, 0);
        reports.push(into_report(sink_step, resolution));
    }

    Ok(reports)
}

fn into_report(sink_step: ChainStep, resolution: Resolution) -> ParseReport {
    match resolution {
        Resolution::Vulnerable(mut chain) => {
            chain.insert(0, sink_step);
            ParseReport::vulnerable(chain)
        }
        Resolution::Fixed(mut chain) => {
            chain.insert(0, sink_step);
            ParseReport::fixed(chain)
        }
        Resolution::Uncontrollable(mut chain) => {
            chain.insert(0, sink_step);
            ParseReport::uncontrollable(chain)
        }
        Resolution::Unconfirmed(mut chain) => {
            chain.insert(0, sink_step);
            ParseReport::unconfirmed(chain)
        }
        Resolution::NewRule(function, mut chain) => {
            chain.insert(0, sink_step);
            ParseReport::new_rule(function, chain)
        }
    }
}

fn resolve_expr(
    expr: &str,
    all: &[Statement],
    before_line: usize,
    file: &Path,
    sanitizers: &HashMap<String, Vec<String>>,
    sources: &[String],
    depth: u32,
) -> Resolution {
    if depth > MAX_RESOLUTION_DEPTH {
        return Resolution::Unconfirmed(Vec::new());
    }

    let expr = expr.trim();

    if statements::is_literal(expr) {
        return Resolution::Uncontrollable(Vec::new());
    }

    if let Some((callee, call_args)) = statements::first_call(expr) {
        if sanitizers.contains_key(&callee) {
            let step = ChainStep::new(ChainStepKind::Sanitizer, format!("{callee}(...)"), file.to_path_buf(), before_line);
            return Resolution::Fixed(vec![step]);
        }
        if sources.iter().any(|s| s == &callee) {
            let step = ChainStep::new(ChainStepKind::Source, callee.clone(), file.to_path_buf(), before_line);
            return Resolution::Vulnerable(vec![step]);
        }
        return resolve_from_fragments(&call_args.join(","), all, before_line, file, sanitizers, sources, depth);
    }

    // Bare variable reference or mixed expression (string concatenation,
    // array indexing, etc): resolve through every variable mentioned.
    let var_refs = statements::variable_refs(expr);
    if var_refs.is_empty() {
        return Resolution::Unconfirmed(Vec::new());
    }

    resolve_from_fragments(expr, all, before_line, file, sanitizers, sources, depth)
}

fn resolve_from_fragments(
    expr: &str,
    all: &[Statement],
    before_line: usize,
    file: &Path,
    sanitizers: &HashMap<String, Vec<String>>,
    sources: &[String],
    depth: u32,
) -> Resolution {
    let vars = statements::variable_refs(expr);
    if vars.is_empty() {
        return Resolution::Unconfirmed(Vec::new());
    }

    let mut any_vulnerable: Option<Vec<ChainStep>> = None;
    let mut any_unresolved: Option<Resolution> = None;
    let mut last_fixed_chain: Vec<ChainStep> = Vec::new();
    let mut all_fixed = true;

    for var in &vars {
        if sources.iter().any(|s| s == var) {
            if any_vulnerable.is_none() {
                let step = ChainStep::new(ChainStepKind::Source, format!("${var}"), file.to_path_buf(), before_line);
                any_vulnerable = Some(vec![step]);
            }
            all_fixed = false;
            continue;
        }

        match resolve_variable(var, all, before_line, file, sanitizers, sources, depth + 1) {
            Resolution::Vulnerable(chain) => {
                any_vulnerable = Some(chain);
                all_fixed = false;
            }
            Resolution::Fixed(chain) => {
                last_fixed_chain = chain;
            }
            other => {
                all_fixed = false;
                any_unresolved = Some(other);
            }
        }
    }

    if let Some(chain) = any_vulnerable {
        return Resolution::Vulnerable(chain);
    }
    if all_fixed {
        return Resolution::Fixed(last_fixed_chain);
    }
    any_unresolved.unwrap_or(Resolution::Unconfirmed(Vec::new()))
}

fn resolve_variable(
    var: &str,
    all: &[Statement],
    before_line: usize,
    file: &Path,
    sanitizers: &HashMap<String, Vec<String>>,
    sources: &[String],
    depth: u32,
) -> Resolution {
    if depth > MAX_RESOLUTION_DEPTH {
        return Resolution::Unconfirmed(Vec::new());
    }

    if sources.iter().any(|s| s == var) {
        let step = ChainStep::new(ChainStepKind::Source, format!("${var}"), file.to_path_buf(), before_line);
        return Resolution::Vulnerable(vec![step]);
    }

    let assignments: Vec<&Statement> = all
        .iter()
        .filter(|s| s.line < before_line)
        .filter(|s| matches!(&s.kind, StatementKind::Assignment { variable, .. } if variable == var))
        .collect();

    if assignments.is_empty() {
        let enclosing_param = all
            .iter()
            .filter(|s| s.line < before_line)
            .filter_map(|s| match &s.kind {
                StatementKind::FunctionDecl { name, params } if params.iter().any(|p| p == var) => Some(name.clone()),
                _ => None,
            })
            .last();

        return match enclosing_param {
            Some(function) => {
                let step = ChainStep::new(ChainStepKind::ParamIn, format!("${var}"), file.to_path_buf(), before_line);
                Resolution::NewRule(function, vec![step])
            }
            None => Resolution::Unconfirmed(Vec::new()),
        };
    }

    let nearest = *assignments.last().unwrap();
    let nearest_resolution = classify_assignment(nearest, all, file, sanitizers, sources, depth);

    match &nearest_resolution {
        Resolution::Vulnerable(_) | Resolution::Fixed(_) => return nearest_resolution,
        _ => {}
    }

    // Any-branch-tainted tie-break: the nearest dominating assignment
    // resolved clean/ambiguous, but an earlier sibling assignment (e.g. the
    // other arm of an if/else) is known-tainted. Prefer the positive.
    for other in assignments[..assignments.len() - 1].iter().rev() {
        if let Resolution::Vulnerable(chain) = classify_assignment(other, all, file, sanitizers, sources, depth) {
            return Resolution::Vulnerable(chain);
        }
    }

    nearest_resolution
}

fn classify_assignment(
    stmt: &Statement,
    all: &[Statement],
    file: &Path,
    sanitizers: &HashMap<String, Vec<String>>,
    sources: &[String],
    depth: u32,
) -> Resolution {
    let StatementKind::Assignment { expr, .. } = &stmt.kind else {
        return Resolution::Unconfirmed(Vec::new());
    };

    let step = ChainStep::new(ChainStepKind::Assignment, stmt.text.clone(), file.to_path_buf(), stmt.line);
    let resolution = resolve_expr(expr, all, stmt.line, file, sanitizers, sources, depth + 1);

    prepend_step(resolution, step)
}

fn prepend_step(resolution: Resolution, step: ChainStep) -> Resolution {
    match resolution {
        Resolution::Vulnerable(mut chain) => {
            chain.push(step);
            Resolution::Vulnerable(chain)
        }
        Resolution::Fixed(mut chain) => {
            chain.push(step);
            Resolution::Fixed(chain)
        }
        Resolution::Uncontrollable(mut chain) => {
            chain.push(step);
            Resolution::Uncontrollable(chain)
        }
        Resolution::Unconfirmed(mut chain) => {
            chain.push(step);
            Resolution::Unconfirmed(chain)
        }
        Resolution::NewRule(f, mut chain) => {
            chain.push(step);
            Resolution::NewRule(f, chain)
        }
    }
}
