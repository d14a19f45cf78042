//! Repair catalog (§3, §4.5): the sanitizer and controlled-input-source
//! tables consulted by the taint core while walking a dominating chain.

use std::collections::{HashMap, HashSet};

/// Maps sanitizer function name -> rule ids it neutralizes, plus the list
/// of source functions treated as attacker-controlled input.
///
/// A secret overlay (§4.5, §9 open question) updates the sanitizer map with
/// secret-provided entries winning on key collision, and concatenates the
/// secret's source list onto the base one. A rule id present in both a
/// base and secret sanitizer entry for the same function name is resolved
/// in favor of the secret, since a deployment's local secret profile is
/// assumed to be the more specific source of truth.
#[derive(Debug, Clone, Default)]
pub struct RepairCatalog {
    sanitizers: HashMap<String, HashSet<String>>,
    sources: Vec<String>,
}

impl RepairCatalog {
    pub fn new(sanitizers: HashMap<String, HashSet<String>>, sources: Vec<String>) -> Self {
        Self { sanitizers, sources }
    }

    /// Overlay a secret profile onto this catalog (§4.5). Sanitizer entries
    /// in `secret` replace the corresponding base entry; sources are
    /// concatenated and deduplicated.
    pub fn overlay(&mut self, secret: RepairCatalog) {
        for (func, rule_ids) in secret.sanitizers {
            self.sanitizers.insert(func, rule_ids);
        }
        for source in secret.sources {
            if !self.sources.contains(&source) {
                self.sources.push(source);
            }
        }
    }

    /// True if `function` sanitizes findings against `rule_id`.
    pub fn is_sanitizer_for(&self, function: &str, rule_id: &str) -> bool {
        self.sanitizers.get(function).map(|ids| ids.contains(rule_id)).unwrap_or(false)
    }

    pub fn is_source(&self, function: &str) -> bool {
        self.sources.iter().any(|s| s == function)
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// Sanitizer functions effective for `rule_id`, pre-filtered so a
    /// consumer that only checks key presence (the AST provider's taint
    /// walk) doesn't need the rule id at all (§4.3, §4.4).
    pub fn sanitizers_for_rule(&self, rule_id: &str) -> HashMap<String, Vec<String>> {
        self.sanitizers
            .iter()
            .filter(|(_, ids)| ids.contains(rule_id))
            .map(|(func, _)| (func.clone(), vec![rule_id.to_string()]))
            .collect()
    }
}
