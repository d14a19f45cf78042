//! Scan Orchestrator (C6, §4.6): drives the rule worklist, escalates
//! `NEW_RULE` verdicts into synthesized follow-up rules, and enforces the
//! recursion depth cap.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};

use tg_core::constants::MAX_RECURSION_DEPTH;
use tg_core::{AnalysisError, AstProvider, ChainStep, ChainStepKind, Finding, Result};
use tg_corpus::Corpus;
use tg_dataflow::{TaintCore, TaintVerdict};
use tg_matcher::Matcher;
use tg_rules::{RepairCatalog, Rule, RuleRegistry};

use crate::result::ResultCollector;

/// A worklist entry's `carried` chain is what a descendant rule's eventual
/// `Vulnerable`/`Unconfirmed` finding should be appended with: the escalation
/// chain that led to this rule's synthesis, prefixed with a `NewScan` marker
/// (§4.4 — the taint core never constructs `NewScan` itself, only the
/// orchestrator does, since it's the one deciding a new rule was spawned).
fn carry_forward(escalation_chain: Vec<ChainStep>, prior_carried: &[ChainStep]) -> Vec<ChainStep> {
    let mut carried = escalation_chain;
    if let Some(last) = carried.last() {
        carried.push(ChainStep::new(ChainStepKind::NewScan, "new scan spawned", last.file.clone(), last.line));
    }
    carried.extend_from_slice(prior_carried);
    carried
}

/// Logs the depth-cap drop once per chain root via the same
/// contained-error shape as a per-candidate `TaintVerdict::Error` (§7:
/// "DepthExceeded — new-rule recursion past 20; warn once per chain, drop
/// the synthesized rule").
fn warn_depth_exceeded(rule_id: &str, warned_roots: &mut HashSet<String>) {
    if warned_roots.insert(rule_id.to_string()) {
        let err = AnalysisError::DepthExceeded;
        tracing::warn!("rule {} exceeded recursion depth, dropping descendant chain: {}", rule_id, err);
    }
}

pub struct Orchestrator {
    corpus: Corpus,
    registry: RuleRegistry,
    catalog: RepairCatalog,
    whitelist: Vec<String>,
    ast_provider: Box<dyn AstProvider>,
}

impl Orchestrator {
    pub fn new(
        corpus: Corpus,
        registry: RuleRegistry,
        catalog: RepairCatalog,
        whitelist: Vec<String>,
        ast_provider: Box<dyn AstProvider>,
    ) -> Result<Self> {
        if registry.is_empty() {
            return Err(AnalysisError::RuleSetEmpty);
        }
        Ok(Self { corpus, registry, catalog, whitelist, ast_provider })
    }

    /// Sequential run: the default path, and the one exercised by unit
    /// tests since its ordering is directly observable (§5).
    pub fn run(&self) -> Result<Vec<Finding>> {
        let taint_core = TaintCore::new(self.ast_provider.as_ref());
        let matcher = Matcher::new();
        let mut collector = ResultCollector::new();
        let mut warned_roots: HashSet<String> = HashSet::new();

        let mut worklist: VecDeque<(Rule, u32, Vec<ChainStep>)> =
            self.registry.enabled_rules().into_iter().cloned().map(|r| (r, 0, Vec::new())).collect();

        while let Some((rule, depth, carried)) = worklist.pop_front() {
            if depth > MAX_RECURSION_DEPTH {
                warn_depth_exceeded(&rule.id, &mut warned_roots);
                continue;
            }

            let candidates = matcher.candidates(&self.corpus, &rule)?;
            for candidate in candidates {
                let verdict = taint_core.evaluate(&self.corpus, &self.catalog, &self.whitelist, &rule, &candidate);
                match verdict {
                    TaintVerdict::Vulnerable(mut chain) | TaintVerdict::Unconfirmed(mut chain) => {
                        chain.extend(carried.iter().cloned());
                        collector.offer(&self.corpus, &rule, &candidate, chain);
                    }
                    TaintVerdict::NewRule(function, chain) => {
                        match self.ast_provider.init_match_rule(&function, rule.language) {
                            Ok(spec) => {
                                let synthesized = Rule::synthesize_from_new_rule(&rule, &spec.sink_name);
                                let new_carried = carry_forward(chain, &carried);
                                worklist.push_back((synthesized, depth + 1, new_carried));
                            }
                            Err(err) => tracing::warn!("failed to synthesize rule for {}: {}", function, err),
                        }
                    }
                    TaintVerdict::Error(err) => {
                        tracing::warn!(
                            "taint core error at {}:{}: {}",
                            candidate.file_path.display(),
                            candidate.line_number,
                            err
                        );
                    }
                    TaintVerdict::Fixed(_) | TaintVerdict::Uncontrolled(_) | TaintVerdict::Unsupported | TaintVerdict::Filtered => {}
                }
            }
        }

        Ok(collector.into_findings())
    }

    /// Rule-granularity parallelism (added, ambient, §5): one `TaintCore`
    /// per rule over the shared read-only corpus and catalog, each with
    /// its own local worklist for `NEW_RULE` escalation. `cancel` is
    /// checked between candidates and between rules for cooperative
    /// cancellation.
    pub fn run_parallel(&self, cancel: &AtomicBool) -> Result<Vec<Finding>> {
        use rayon::prelude::*;

        let roots: Vec<Rule> = self.registry.enabled_rules().into_iter().cloned().collect();
        let corpus = &self.corpus;
        let catalog = &self.catalog;
        let whitelist = &self.whitelist;
        let ast_provider = self.ast_provider.as_ref();

        let per_rule: Vec<Result<Vec<(Rule, tg_core::Candidate, Vec<ChainStep>)>>> = roots
            .into_par_iter()
            .map(|root| run_rule_worklist(root, corpus, catalog, whitelist, ast_provider, cancel))
            .collect();

        let mut collector = ResultCollector::new();
        for batch in per_rule {
            for (rule, candidate, chain) in batch? {
                collector.offer(&self.corpus, &rule, &candidate, chain);
            }
        }
        Ok(collector.into_findings())
    }
}

fn run_rule_worklist(
    root: Rule,
    corpus: &Corpus,
    catalog: &RepairCatalog,
    whitelist: &[String],
    ast_provider: &dyn AstProvider,
    cancel: &AtomicBool,
) -> Result<Vec<(Rule, tg_core::Candidate, Vec<ChainStep>)>> {
    let taint_core = TaintCore::new(ast_provider);
    let matcher = Matcher::new();
    let mut warned_roots: HashSet<String> = HashSet::new();
    let mut worklist: VecDeque<(Rule, u32, Vec<ChainStep>)> = VecDeque::from([(root, 0, Vec::new())]);
    let mut reportable = Vec::new();

    while let Some((rule, depth, carried)) = worklist.pop_front() {
        if cancel.load(Ordering::Relaxed) {
            break;
        }
        if depth > MAX_RECURSION_DEPTH {
            warn_depth_exceeded(&rule.id, &mut warned_roots);
            continue;
        }

        for candidate in matcher.candidates(corpus, &rule)? {
            if cancel.load(Ordering::Relaxed) {
                break;
            }
            match taint_core.evaluate(corpus, catalog, whitelist, &rule, &candidate) {
                TaintVerdict::Vulnerable(mut chain) | TaintVerdict::Unconfirmed(mut chain) => {
                    chain.extend(carried.iter().cloned());
                    reportable.push((rule.clone(), candidate, chain));
                }
                TaintVerdict::NewRule(function, chain) => {
                    if let Ok(spec) = ast_provider.init_match_rule(&function, rule.language) {
                        let synthesized = Rule::synthesize_from_new_rule(&rule, &spec.sink_name);
                        let new_carried = carry_forward(chain, &carried);
                        worklist.push_back((synthesized, depth + 1, new_carried));
                    }
                }
                _ => {}
            }
        }
    }

    Ok(reportable)
}
