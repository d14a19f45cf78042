//! `TaintCore` (C4, §4.4): runs the pre-filter chain, dispatches by
//! language, and folds an `AstProvider`'s per-argument `ParseReport`s into a
//! single `TaintVerdict`.

use tg_core::{AnalysisError, AstProvider, Candidate, ChainStep, ChainStepKind, Language, ParseReport, ParseReportCode};
use tg_corpus::Corpus;
use tg_rules::{MatchMode, RepairCatalog, Rule};

use crate::filters::{pre_filter, SkipReason};
use crate::verdict::TaintVerdict;

pub struct TaintCore<'a> {
    ast_provider: &'a dyn AstProvider,
}

impl<'a> TaintCore<'a> {
    pub fn new(ast_provider: &'a dyn AstProvider) -> Self {
        Self { ast_provider }
    }

    pub fn evaluate(
        &self,
        corpus: &Corpus,
        catalog: &RepairCatalog,
        whitelist: &[String],
        rule: &Rule,
        candidate: &Candidate,
    ) -> TaintVerdict {
        match pre_filter(corpus, whitelist, rule.language, &candidate.file_path, &candidate.code_snippet) {
            Some(SkipReason::UnsupportedExtension) => return TaintVerdict::Error(AnalysisError::UnsupportedFile),
            Some(_) => return TaintVerdict::Filtered,
            None => {}
        }

        match rule.match_mode {
            MatchMode::RegexOnly | MatchMode::RegexReturnRegex => TaintVerdict::Vulnerable(vec![sink_step(candidate)]),
            MatchMode::ExtKeywordMatch if rule.language == Language::BrowserExtension => {
                TaintVerdict::Vulnerable(vec![sink_step(candidate)])
            }
            MatchMode::ExtKeywordMatch => TaintVerdict::Error(AnalysisError::UnsupportedMatchMode),
            MatchMode::RegexParamControllable | MatchMode::FunctionParamControllable => {
                self.evaluate_taint(corpus, catalog, rule, candidate)
            }
        }
    }

    fn evaluate_taint(
        &self,
        corpus: &Corpus,
        catalog: &RepairCatalog,
        rule: &Rule,
        candidate: &Candidate,
    ) -> TaintVerdict {
        if !rule.language.has_full_taint_analysis() {
            return TaintVerdict::Unsupported;
        }

        let sinks = sink_names(rule);
        let sanitizers = catalog.sanitizers_for_rule(&rule.id);
        let sources = catalog.sources().to_vec();
        let absolute_file = corpus.root().join(&candidate.file_path);
        let file = if absolute_file.exists() { absolute_file } else { candidate.file_path.clone() };

        match self.ast_provider.scan_parser(&sinks, candidate.line_number, &file, &sanitizers, &sources) {
            Ok(reports) => merge_reports(reports),
            Err(err) => TaintVerdict::Error(err),
        }
    }
}

fn sink_step(candidate: &Candidate) -> ChainStep {
    ChainStep::new(ChainStepKind::SinkCall, candidate.code_snippet.clone(), candidate.file_path.clone(), candidate.line_number)
}

/// `rule.match` is a literal function-name alternation only under
/// FUNCTION_PARAM_CONTROLLABLE (§4.2); under REGEX_PARAM_CONTROLLABLE it's a
/// regex the Matcher already used to locate the candidate, so the sink
/// identity for the taint walk comes from `vul_function` instead.
fn sink_names(rule: &Rule) -> Vec<String> {
    if rule.match_mode == MatchMode::FunctionParamControllable && !rule.r#match.is_empty() {
        rule.r#match.clone()
    } else {
        rule.vul_function.iter().cloned().collect()
    }
}

/// Priority across multiple argument reports at the same call site:
/// a confirmed vulnerability always wins, then a pending escalation, then a
/// heuristic positive, then sanitized, then provably safe.
fn rank(code: ParseReportCode) -> u8 {
    match code {
        ParseReportCode::Vulnerable => 0,
        ParseReportCode::NewRule => 1,
        ParseReportCode::Unconfirmed => 2,
        ParseReportCode::Fixed => 3,
        ParseReportCode::Uncontrollable => 4,
    }
}

fn merge_reports(reports: Vec<ParseReport>) -> TaintVerdict {
    let Some(best) = reports.into_iter().min_by_key(|r| rank(r.code)) else {
        return TaintVerdict::Uncontrolled(Vec::new());
    };

    match best.code {
        ParseReportCode::Vulnerable => TaintVerdict::Vulnerable(best.chain),
        ParseReportCode::NewRule => TaintVerdict::NewRule(best.source.unwrap_or_default(), best.chain),
        ParseReportCode::Unconfirmed => TaintVerdict::Unconfirmed(best.chain),
        ParseReportCode::Fixed => TaintVerdict::Fixed(best.chain),
        ParseReportCode::Uncontrollable => TaintVerdict::Uncontrolled(best.chain),
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tg_core::{AstNode, Language, NewRuleSpec, Result, Severity};
    use tg_rules::RuleStatus;

    struct StubProvider;
    impl AstProvider for StubProvider {
        fn parse(&self, _file: &std::path::Path, _source: &str) -> Result<Box<dyn AstNode>> {
            unimplemented!()
        }
        fn scan_parser(
            &self,
            _sinks: &[String],
            _line: usize,
            _file: &std::path::Path,
            _sanitizers: &std::collections::HashMap<String, Vec<String>>,
            _sources: &[String],
        ) -> Result<Vec<ParseReport>> {
            Ok(vec![ParseReport::vulnerable(vec![]), ParseReport::fixed(vec![])])
        }
        fn init_match_rule(&self, hint: &str, _language: Language) -> Result<NewRuleSpec> {
            Ok(NewRuleSpec { match_regex: hint.to_string(), anti_regex: None, sink_name: hint.to_string(), param_index: 0 })
        }
    }

    fn rule(mode: MatchMode, language: Language) -> Rule {
        Rule {
            id: "1".into(),
            name: "r".into(),
            language,
            author: "a".into(),
            severity: Severity::new(5),
            status: RuleStatus::Enabled,
            match_mode: mode,
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

    fn corpus_with(path: &str, text: &str) -> Corpus {
        Corpus::from_files("/proj", vec![(PathBuf::from(path), text.to_string())])
    }

    #[test]
    fn regex_only_is_vulnerable_without_a_taint_walk() {
        let provider = StubProvider;
        let core = TaintCore::new(&provider);
        let corpus = corpus_with("/proj/v.php", "echo($_GET['c']);\n");
        let candidate = Candidate { file_path: PathBuf::from("v.php"), line_number: 1, code_snippet: "echo($_GET['c']);".into() };
        let verdict = core.evaluate(&corpus, &RepairCatalog::default(), &[], &rule(MatchMode::RegexOnly, Language::Php), &candidate);
        assert!(matches!(verdict, TaintVerdict::Vulnerable(_)));
    }

    #[test]
    fn unsupported_language_short_circuits_function_param_controllable() {
        let provider = StubProvider;
        let core = TaintCore::new(&provider);
        let corpus = corpus_with("/proj/v.js", "echo($x);\n");
        let candidate = Candidate { file_path: PathBuf::from("v.js"), line_number: 1, code_snippet: "echo($x);".into() };
        let verdict = core.evaluate(
            &corpus,
            &RepairCatalog::default(),
            &[],
            &rule(MatchMode::FunctionParamControllable, Language::JavaScript),
            &candidate,
        );
        assert!(matches!(verdict, TaintVerdict::Unsupported));
    }

    #[test]
    fn php_function_param_controllable_merges_reports_toward_vulnerable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("v.php");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(b"echo($x);\n").unwrap();

        let provider = StubProvider;
        let core = TaintCore::new(&provider);
        let corpus = Corpus::from_files(dir.path(), vec![(path.clone(), "echo($x);\n".to_string())]);
        let candidate = Candidate { file_path: PathBuf::from("v.php"), line_number: 1, code_snippet: "echo($x);".into() };
        let verdict = core.evaluate(
            &corpus,
            &RepairCatalog::default(),
            &[],
            &rule(MatchMode::FunctionParamControllable, Language::Php),
            &candidate,
        );
        assert!(matches!(verdict, TaintVerdict::Vulnerable(_)));
    }

    #[test]
    fn whitelisted_candidate_is_filtered_before_dispatch() {
        let provider = StubProvider;
        let core = TaintCore::new(&provider);
        let corpus = corpus_with("/proj/vendor/v.php", "echo($x);\n");
        let candidate = Candidate { file_path: PathBuf::from("vendor/v.php"), line_number: 1, code_snippet: "echo($x);".into() };
        let verdict = core.evaluate(
            &corpus,
            &RepairCatalog::default(),
            &["vendor/".to_string()],
            &rule(MatchMode::RegexOnly, Language::Php),
            &candidate,
        );
        assert!(matches!(verdict, TaintVerdict::Filtered));
    }

    #[test]
    fn ext_keyword_match_is_vulnerable_only_for_browser_extension() {
        let provider = StubProvider;
        let core = TaintCore::new(&provider);
        let corpus = corpus_with("/proj/v.js", "chrome.tabs.executeScript();\n");
        let candidate =
            Candidate { file_path: PathBuf::from("v.js"), line_number: 1, code_snippet: "chrome.tabs.executeScript();".into() };

        let browser_ext_verdict = core.evaluate(
            &corpus,
            &RepairCatalog::default(),
            &[],
            &rule(MatchMode::ExtKeywordMatch, Language::BrowserExtension),
            &candidate,
        );
        assert!(matches!(browser_ext_verdict, TaintVerdict::Vulnerable(_)));

        let js_verdict =
            core.evaluate(&corpus, &RepairCatalog::default(), &[], &rule(MatchMode::ExtKeywordMatch, Language::JavaScript), &candidate);
        assert!(matches!(js_verdict, TaintVerdict::Error(AnalysisError::UnsupportedMatchMode)));
    }

    #[test]
    fn extension_mismatch_surfaces_unsupported_file() {
        let provider = StubProvider;
        let core = TaintCore::new(&provider);
        let corpus = corpus_with("/proj/v.php", "echo($x);\n");
        let candidate = Candidate { file_path: PathBuf::from("v.php"), line_number: 1, code_snippet: "echo($x);".into() };
        let verdict = core.evaluate(
            &corpus,
            &RepairCatalog::default(),
            &[],
            &rule(MatchMode::RegexOnly, Language::Solidity),
            &candidate,
        );
        assert!(matches!(verdict, TaintVerdict::Error(AnalysisError::UnsupportedFile)));
    }

}
