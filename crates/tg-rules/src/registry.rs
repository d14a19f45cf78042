//! Rule registry (§4.5): the queryable set of active rules for a scan.

use tg_core::Language;

use crate::types::Rule;

#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    rules: Vec<Rule>,
}

impl RuleRegistry {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// All enabled rules targeting `language`, in definition order.
    pub fn rules_for(&self, language: Language) -> Vec<&Rule> {
        self.rules.iter().filter(|r| r.applies_to(language)).collect()
    }

    pub fn find(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == id)
    }

    /// Every enabled rule, sorted by id ascending — the orchestrator's
    /// worklist seed order (§4.6).
    pub fn enabled_rules(&self) -> Vec<&Rule> {
        let mut rules: Vec<&Rule> = self.rules.iter().filter(|r| r.is_enabled()).collect();
        rules.sort_by(|a, b| a.id.cmp(&b.id));
        rules
    }
}
