//! End-to-end scenarios (spec.md §8, E1-E7). Each test writes real files to
//! a tempdir, since the PHP line-oriented AST provider reads source off
//! disk rather than from the in-memory corpus.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;

use tg_ast::PhpLineAst;
use tg_core::{ChainStepKind, Language, Severity};
use tg_corpus::Corpus;
use tg_engine::Orchestrator;
use tg_rules::{MatchMode, RepairCatalog, Rule, RuleRegistry, RuleStatus};

fn echo_rule() -> Rule {
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

fn regex_param_controllable_echo_rule() -> Rule {
    Rule {
        id: "2002".into(),
        name: "echo-xss-regex".into(),
        language: Language::Php,
        author: "feei".into(),
        severity: Severity::new(8),
        status: RuleStatus::Enabled,
        match_mode: MatchMode::RegexParamControllable,
        r#match: vec![r"echo\(".into()],
        unmatch: Vec::new(),
        match_name: None,
        black_list: Vec::new(),
        keyword: None,
        vul_function: Some("echo".into()),
        case_insensitive: false,
        multiline: false,
    }
}

fn write_corpus(root: &std::path::Path, files: &[(&str, &str)]) -> Corpus {
    let mut entries = Vec::new();
    for (rel, text) in files {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, text).unwrap();
        entries.push((path, text.to_string()));
    }
    Corpus::from_files(root, entries)
}

#[test]
fn e1_direct_sink_taint() {
    let dir = tempfile::tempdir().unwrap();
    let padding = "// pad\n".repeat(8);
    let text = format!("{padding}$c = $_GET;\necho($c);\n");
    let corpus = write_corpus(dir.path(), &[("v.php", &text)]);

    let catalog = RepairCatalog::new(HashMap::new(), vec!["_GET".to_string()]);
    let orchestrator =
        Orchestrator::new(corpus, RuleRegistry::new(vec![echo_rule()]), catalog, vec![], Box::new(PhpLineAst::new())).unwrap();

    let findings = orchestrator.run().unwrap();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].rule_id, "2001");
    assert_eq!(findings[0].file_path, PathBuf::from("v.php"));
    assert_eq!(findings[0].line_number, 10);
    assert_eq!(findings[0].analysis, "Function-param-controllable");
    assert_eq!(findings[0].chain.first().unwrap().kind, ChainStepKind::SinkCall);
}

#[test]
fn e2_sanitized_sink_produces_no_finding() {
    let dir = tempfile::tempdir().unwrap();
    let text = "$raw = $_GET;\n$c = htmlspecialchars($raw);\necho($c);\n";
    let corpus = write_corpus(dir.path(), &[("v.php", text)]);

    let mut sanitizers = HashMap::new();
    sanitizers.insert("htmlspecialchars".to_string(), HashSet::from(["2001".to_string()]));
    let catalog = RepairCatalog::new(sanitizers, vec!["_GET".to_string()]);

    let orchestrator =
        Orchestrator::new(corpus, RuleRegistry::new(vec![echo_rule()]), catalog, vec![], Box::new(PhpLineAst::new())).unwrap();
    let findings = orchestrator.run().unwrap();
    assert!(findings.is_empty());
}

#[test]
fn e3_uncontrollable_constant_produces_no_finding() {
    let dir = tempfile::tempdir().unwrap();
    let text = "echo(\"hello\");\n";
    let corpus = write_corpus(dir.path(), &[("v.php", text)]);

    let catalog = RepairCatalog::new(HashMap::new(), vec!["_GET".to_string()]);
    let orchestrator =
        Orchestrator::new(corpus, RuleRegistry::new(vec![echo_rule()]), catalog, vec![], Box::new(PhpLineAst::new())).unwrap();
    let findings = orchestrator.run().unwrap();
    assert!(findings.is_empty());
}

#[test]
fn e4_new_rule_recursion_across_files() {
    let dir = tempfile::tempdir().unwrap();
    let a = "function wrap($x) {\necho($x);\n}\n";
    let b = "wrap($_POST['p']);\n";
    let corpus = write_corpus(dir.path(), &[("a.php", a), ("b.php", b)]);

    let catalog = RepairCatalog::new(HashMap::new(), vec!["_POST".to_string()]);
    let orchestrator =
        Orchestrator::new(corpus, RuleRegistry::new(vec![echo_rule()]), catalog, vec![], Box::new(PhpLineAst::new())).unwrap();
    let findings = orchestrator.run().unwrap();

    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].rule_id, "2001");
    assert_eq!(findings[0].file_path, PathBuf::from("b.php"));
    assert_eq!(findings[0].line_number, 1);
}

#[test]
fn e5_depth_cap_halts_without_crashing() {
    let dir = tempfile::tempdir().unwrap();

    // f0 is the real sink; f1..f24 each wrap the one below it, so escalating
    // a NEW_RULE verdict from f0 all the way out to f24 walks 25 levels,
    // past the depth-20 cap, and nothing ever calls f24 with a concrete
    // source, so that chain never resolves.
    let mut wrappers = String::from("function f0($x) {\necho($x);\n}\n");
    for i in 1..25 {
        wrappers.push_str(&format!("function f{i}($x) {{\nf{}($x);\n}}\n", i - 1));
    }
    // An unrelated, directly tainted sink call that must still be found.
    wrappers.push_str("echo($_GET);\n");
    let corpus = write_corpus(dir.path(), &[("deep.php", &wrappers)]);

    let catalog = RepairCatalog::new(HashMap::new(), vec!["_GET".to_string()]);
    let orchestrator =
        Orchestrator::new(corpus, RuleRegistry::new(vec![echo_rule()]), catalog, vec![], Box::new(PhpLineAst::new())).unwrap();

    let findings = orchestrator.run().unwrap();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].line_number, 76);
}

#[test]
fn e6_whitelist_and_special_file_filters_suppress_findings() {
    let dir = tempfile::tempdir().unwrap();
    let corpus = write_corpus(
        dir.path(),
        &[
            ("src/whitelist1.php", "echo($_GET);\n"),
            ("node_modules/pkg/a.php", "echo($_GET);\n"),
            ("src/clean.php", "echo($_GET);\n"),
        ],
    );

    let catalog = RepairCatalog::new(HashMap::new(), vec!["_GET".to_string()]);
    let orchestrator = Orchestrator::new(
        corpus,
        RuleRegistry::new(vec![echo_rule()]),
        catalog,
        vec!["whitelist1".to_string()],
        Box::new(PhpLineAst::new()),
    )
    .unwrap();

    let findings = orchestrator.run().unwrap();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].file_path, PathBuf::from("src/clean.php"));
}

#[test]
fn e7_regex_param_controllable_traces_taint() {
    let dir = tempfile::tempdir().unwrap();
    let text = "$c = $_GET;\necho($c);\n";
    let corpus = write_corpus(dir.path(), &[("v.php", text)]);

    let catalog = RepairCatalog::new(HashMap::new(), vec!["_GET".to_string()]);
    let orchestrator = Orchestrator::new(
        corpus,
        RuleRegistry::new(vec![regex_param_controllable_echo_rule()]),
        catalog,
        vec![],
        Box::new(PhpLineAst::new()),
    )
    .unwrap();

    let findings = orchestrator.run().unwrap();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].rule_id, "2002");
    assert_eq!(findings[0].file_path, PathBuf::from("v.php"));
    assert_eq!(findings[0].line_number, 2);
    assert_eq!(findings[0].chain.first().unwrap().kind, ChainStepKind::SinkCall);
}

#[test]
fn run_parallel_agrees_with_run_on_a_multi_rule_scan() {
    let dir = tempfile::tempdir().unwrap();
    let text = "$c = $_GET;\necho($c);\n";
    let corpus_a = write_corpus(dir.path(), &[("v.php", text)]);

    let catalog = RepairCatalog::new(HashMap::new(), vec!["_GET".to_string()]);
    let sequential = Orchestrator::new(
        corpus_a,
        RuleRegistry::new(vec![echo_rule()]),
        catalog.clone(),
        vec![],
        Box::new(PhpLineAst::new()),
    )
    .unwrap();
    let sequential_findings = sequential.run().unwrap();

    let dir2 = tempfile::tempdir().unwrap();
    let corpus_b = write_corpus(dir2.path(), &[("v.php", text)]);
    let parallel = Orchestrator::new(corpus_b, RuleRegistry::new(vec![echo_rule()]), catalog, vec![], Box::new(PhpLineAst::new()))
        .unwrap();
    let cancel = AtomicBool::new(false);
    let parallel_findings = parallel.run_parallel(&cancel).unwrap();

    assert_eq!(sequential_findings.len(), parallel_findings.len());
}
