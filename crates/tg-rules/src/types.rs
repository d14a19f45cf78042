//! Rule definitions (§3, §4.2).

use serde::{Deserialize, Serialize};
use tg_core::{Language, Severity};

/// The five match modes a rule can declare (§3, §4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchMode {
    RegexOnly,
    RegexParamControllable,
    FunctionParamControllable,
    RegexReturnRegex,
    ExtKeywordMatch,
}

/// A rule definition, immutable for the duration of a scan (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub id: String,
    pub name: String,
    pub language: Language,
    pub author: String,
    pub severity: Severity,
    pub status: RuleStatus,
    pub match_mode: MatchMode,

    /// REGEX_ONLY: all of these must match (conjunction). Other modes: the
    /// matcher-relevant pattern, usually a single element.
    #[serde(default)]
    pub r#match: Vec<String>,

    /// Exclusion patterns; any one matching drops the candidate.
    #[serde(default)]
    pub unmatch: Vec<String>,

    /// REGEX_RETURN_REGEX: names the capture group substituted into the
    /// secondary template.
    #[serde(default)]
    pub match_name: Option<String>,

    /// REGEX_RETURN_REGEX: captured values matching these are dropped.
    #[serde(default)]
    pub black_list: Vec<String>,

    /// EXT_KEYWORD_MATCH: the anchor keyword located before match/unmatch
    /// are applied to its surrounding context.
    #[serde(default)]
    pub keyword: Option<String>,

    /// Sink identifier used in taint dispatch, e.g. the sensitive function
    /// name(s) for FUNCTION_PARAM_CONTROLLABLE.
    #[serde(default)]
    pub vul_function: Option<String>,

    #[serde(default)]
    pub case_insensitive: bool,

    #[serde(default)]
    pub multiline: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleStatus {
    Enabled,
    Disabled,
}

impl Rule {
    pub fn is_enabled(&self) -> bool {
        self.status == RuleStatus::Enabled
    }

    pub fn applies_to(&self, language: Language) -> bool {
        self.is_enabled() && self.language.as_str() == language.as_str()
    }

    /// Build the synthesized `FUNCTION_PARAM_CONTROLLABLE` rule for a
    /// `NEW_RULE` verdict (§4.6): inherits language/id/severity/author from
    /// the parent, match becomes the new sink name.
    pub fn synthesize_from_new_rule(parent: &Rule, new_sink: &str) -> Rule {
        Rule {
            id: parent.id.clone(),
            name: format!("{} (auto: {})", parent.name, new_sink),
            language: parent.language,
            author: parent.author.clone(),
            severity: parent.severity,
            status: RuleStatus::Enabled,
            match_mode: MatchMode::FunctionParamControllable,
            r#match: vec![new_sink.to_string()],
            unmatch: Vec::new(),
            match_name: None,
            black_list: Vec::new(),
            keyword: None,
            vul_function: Some(new_sink.to_string()),
            case_insensitive: parent.case_insensitive,
            multiline: parent.multiline,
        }
    }
}
