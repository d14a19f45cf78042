//! Result Model (C7, §4.7): emit-time dedup, path relativization, and
//! snippet truncation. None of these transforms run during analysis itself,
//! only when a verdict becomes a `Finding` (§9's resolved open question).

use std::collections::HashSet;
use std::path::PathBuf;

use tg_core::constants::MAX_SNIPPET_LEN;
use tg_core::{Candidate, ChainStep, Finding};
use tg_corpus::Corpus;
use tg_rules::{MatchMode, Rule};

#[derive(Default)]
pub struct ResultCollector {
    seen: HashSet<(String, PathBuf, usize)>,
    findings: Vec<Finding>,
}

impl ResultCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finding if its `(rule_id, file_path, line)` key hasn't been
    /// seen yet. Returns `true` if this call added a new finding.
    pub fn offer(&mut self, corpus: &Corpus, rule: &Rule, candidate: &Candidate, chain: Vec<ChainStep>) -> bool {
        let file_path = corpus.relative_path(&candidate.file_path);
        let key = (rule.id.clone(), file_path.clone(), candidate.line_number);
        if !self.seen.insert(key) {
            return false;
        }

        let finding = Finding {
            rule_id: rule.id.clone(),
            rule_name: rule.name.clone(),
            language: rule.language,
            file_path,
            line_number: candidate.line_number,
            code_snippet: truncate(&candidate.code_snippet),
            analysis: analysis_label(rule.match_mode).to_string(),
            chain,
            commit_author: rule.author.clone(),
            severity: rule.severity,
        };
        self.findings.push(finding);
        true
    }

    pub fn into_findings(self) -> Vec<Finding> {
        self.findings
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }
}

fn truncate(snippet: &str) -> String {
    if snippet.len() <= MAX_SNIPPET_LEN {
        snippet.to_string()
    } else {
        let mut truncated: String = snippet.chars().take(MAX_SNIPPET_LEN).collect();
        truncated.push_str("...");
        truncated
    }
}

fn analysis_label(mode: MatchMode) -> &'static str {
    match mode {
        MatchMode::RegexOnly => "Regex-only",
        MatchMode::RegexParamControllable => "Regex-param-controllable",
        MatchMode::FunctionParamControllable => "Function-param-controllable",
        MatchMode::RegexReturnRegex => "Regex-return-regex",
        MatchMode::ExtKeywordMatch => "Ext-keyword-match",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tg_core::{Language, Severity};
    use tg_rules::RuleStatus;

    fn rule() -> Rule {
        Rule {
            id: "2001".into(),
            name: "echo-xss".into(),
            language: Language::Php,
            author: "feei".into(),
            severity: Severity::new(8),
            status: RuleStatus::Enabled,
            match_mode: MatchMode::FunctionParamControllable,
            r#match: vec!["echo".into()],
            unmatch: Vec::new(),
            match_name: None,
            black_list: Vec::new(),
            keyword: None,
            vul_function: Some("echo".into()),
            case_insensitive: false,
            multiline: false,
        }
    }

    fn corpus() -> Corpus {
        Corpus::from_files("/proj", vec![(PathBuf::from("/proj/src/v.php"), "echo($_GET['c']);\n".to_string())])
    }

    #[test]
    fn offer_relativizes_the_path_and_truncates_the_snippet() {
        let mut collector = ResultCollector::new();
        let candidate = Candidate {
            file_path: PathBuf::from("/proj/src/v.php"),
            line_number: 1,
            code_snippet: "x".repeat(600),
        };
        assert!(collector.offer(&corpus(), &rule(), &candidate, vec![]));
        let findings = collector.into_findings();
        assert_eq!(findings[0].file_path, PathBuf::from("src/v.php"));
        assert_eq!(findings[0].code_snippet.len(), MAX_SNIPPET_LEN + 3);
    }

    #[test]
    fn duplicate_rule_file_line_is_dropped() {
        let mut collector = ResultCollector::new();
        let candidate = Candidate { file_path: PathBuf::from("/proj/src/v.php"), line_number: 1, code_snippet: "echo($x);".into() };
        assert!(collector.offer(&corpus(), &rule(), &candidate, vec![]));
        assert!(!collector.offer(&corpus(), &rule(), &candidate, vec![]));
        assert_eq!(collector.len(), 1);
    }
}
