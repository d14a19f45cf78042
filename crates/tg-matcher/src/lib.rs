//! Matcher (C2, §4.2): the five match modes over a file corpus, producing
//! sorted `Candidate`s for the taint core to verify.

use std::path::Path;

use regex::{Regex, RegexBuilder};
use tg_core::{AnalysisError, Candidate, Result};
use tg_corpus::Corpus;
use tg_rules::{MatchMode, Rule};

pub struct Matcher;

impl Matcher {
    pub fn new() -> Self {
        Self
    }

    /// Run `rule` against every file in `corpus` that `rule.language`
    /// targets, dispatching on `rule.match_mode`. Result is sorted by
    /// (path, line) for deterministic downstream processing (§4.2).
    pub fn candidates(&self, corpus: &Corpus, rule: &Rule) -> Result<Vec<Candidate>> {
        let mut candidates = Vec::new();

        for file in corpus.files(rule.language) {
            let text = corpus.read(file)?;
            let mut found = match rule.match_mode {
                MatchMode::RegexOnly => regex_only(file, text, rule)?,
                MatchMode::RegexParamControllable => regex_only(file, text, rule)?,
                MatchMode::FunctionParamControllable => function_param_controllable(file, text, rule)?,
                MatchMode::RegexReturnRegex => regex_return_regex(file, text, rule)?,
                MatchMode::ExtKeywordMatch => ext_keyword_match(file, text, rule)?,
            };
            candidates.append(&mut found);
        }

        candidates.sort_by(|a, b| a.file_path.cmp(&b.file_path).then(a.line_number.cmp(&b.line_number)));
        Ok(candidates)
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new()
    }
}

fn build_regex(pattern: &str, rule: &Rule) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .multi_line(rule.multiline)
        .case_insensitive(rule.case_insensitive)
        .build()
        .map_err(|e| AnalysisError::matcher_error(format!("{pattern}: {e}")))
}

fn line_candidate(file: &Path, line_number: usize, line: &str) -> Candidate {
    Candidate { file_path: file.to_path_buf(), line_number, code_snippet: line.to_string() }
}

/// REGEX_ONLY / REGEX_PARAM_CONTROLLABLE: every pattern in `rule.match`
/// must match the same line (conjunction); any `rule.unmatch` pattern
/// matching the line drops it (§4.2).
fn regex_only(file: &Path, text: &str, rule: &Rule) -> Result<Vec<Candidate>> {
    if rule.r#match.is_empty() {
        return Ok(Vec::new());
    }
    let patterns: Vec<Regex> = rule.r#match.iter().map(|p| build_regex(p, rule)).collect::<Result<_>>()?;
    let anti: Vec<Regex> = rule.unmatch.iter().map(|p| build_regex(p, rule)).collect::<Result<_>>()?;

    let mut out = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        if !patterns.iter().all(|re| re.is_match(line)) {
            continue;
        }
        if anti.iter().any(|re| re.is_match(line)) {
            continue;
        }
        out.push(line_candidate(file, idx + 1, line));
    }
    Ok(out)
}

/// FUNCTION_PARAM_CONTROLLABLE: `rule.match` holds one or more sink
/// function names; a line is a candidate if it calls any of them, unless a
/// `rule.unmatch` pattern also matches (§4.2).
fn function_param_controllable(file: &Path, text: &str, rule: &Rule) -> Result<Vec<Candidate>> {
    let names: Vec<&str> = if rule.r#match.is_empty() {
        rule.vul_function.as_deref().into_iter().collect()
    } else {
        rule.r#match.iter().map(|s| s.as_str()).collect()
    };
    if names.is_empty() {
        return Ok(Vec::new());
    }

    let alternation = names.iter().map(|n| regex::escape(n)).collect::<Vec<_>>().join("|");
    let call_pattern = format!(r"\b(?:{alternation})\s*\(");
    let call_re = build_regex(&call_pattern, rule)?;
    let anti: Vec<Regex> = rule.unmatch.iter().map(|p| build_regex(p, rule)).collect::<Result<_>>()?;

    let mut out = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        if !call_re.is_match(line) {
            continue;
        }
        if anti.iter().any(|re| re.is_match(line)) {
            continue;
        }
        out.push(line_candidate(file, idx + 1, line));
    }
    Ok(out)
}

/// REGEX_RETURN_REGEX: two-stage capture-then-template. `rule.match[0]` is
/// a primary regex with a named group `rule.match_name`; the captured
/// value (unless listed in `rule.black_list`) is substituted for the `{}`
/// placeholder in `rule.match[1]`, and that secondary regex is tested
/// against the same line to confirm the candidate (§4.2, §9: `match_name`
/// resolved for single named-group patterns only).
fn regex_return_regex(file: &Path, text: &str, rule: &Rule) -> Result<Vec<Candidate>> {
    let (Some(primary_pattern), Some(template)) = (rule.r#match.first(), rule.r#match.get(1)) else {
        return Ok(Vec::new());
    };
    let Some(group_name) = rule.match_name.as_deref() else {
        return Ok(Vec::new());
    };

    let primary = build_regex(primary_pattern, rule)?;

    let mut out = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let Some(caps) = primary.captures(line) else { continue };
        let Some(captured) = caps.name(group_name) else { continue };
        let value = captured.as_str();

        if rule.black_list.iter().any(|b| b == value) {
            continue;
        }

        let secondary_pattern = template.replace("{}", &regex::escape(value));
        let secondary = build_regex(&secondary_pattern, rule)?;
        if secondary.is_match(line) {
            out.push(line_candidate(file, idx + 1, line));
        }
    }
    Ok(out)
}

/// EXT_KEYWORD_MATCH: locate `rule.keyword` as a literal anchor; among the
/// lines containing it, apply the same match/unmatch conjunction as
/// REGEX_ONLY if any patterns are present, otherwise the keyword alone is
/// sufficient (§4.2).
fn ext_keyword_match(file: &Path, text: &str, rule: &Rule) -> Result<Vec<Candidate>> {
    let Some(keyword) = rule.keyword.as_deref() else {
        return Ok(Vec::new());
    };
    let patterns: Vec<Regex> = rule.r#match.iter().map(|p| build_regex(p, rule)).collect::<Result<_>>()?;
    let anti: Vec<Regex> = rule.unmatch.iter().map(|p| build_regex(p, rule)).collect::<Result<_>>()?;

    let mut out = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let haystack = if rule.case_insensitive { line.to_lowercase() } else { line.to_string() };
        let needle = if rule.case_insensitive { keyword.to_lowercase() } else { keyword.to_string() };
        if !haystack.contains(&needle) {
            continue;
        }
        if !patterns.is_empty() && !patterns.iter().all(|re| re.is_match(line)) {
            continue;
        }
        if anti.iter().any(|re| re.is_match(line)) {
            continue;
        }
        out.push(line_candidate(file, idx + 1, line));
    }
    Ok(out)
}
