//! Core data types shared across taintgrep crates

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Source languages the engine understands. Only `Php` gets full taint
/// analysis (§1 Non-goals); the others are regex/keyword verification only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Php,
    Solidity,
    JavaScript,
    BrowserExtension,
}

impl Language {
    /// File extensions this language's corpus filter accepts (§4.1).
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Language::Php => &[".php", ".inc"],
            Language::Solidity => &[".sol"],
            Language::JavaScript => &[".js"],
            Language::BrowserExtension => &[".js", ".html", ".json"],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Php => "php",
            Language::Solidity => "solidity",
            Language::JavaScript => "javascript",
            Language::BrowserExtension => "chromeext",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "php" => Some(Language::Php),
            "solidity" | "sol" => Some(Language::Solidity),
            "javascript" | "js" => Some(Language::JavaScript),
            "chromeext" | "browserext" | "browser-extension" => Some(Language::BrowserExtension),
            _ => None,
        }
    }

    /// Does this extension (leading dot optional) belong to this language?
    pub fn accepts_extension(&self, ext: &str) -> bool {
        let ext = if ext.starts_with('.') { ext.to_string() } else { format!(".{ext}") };
        self.extensions().contains(&ext.as_str())
    }

    /// Is this one of the languages with a full taint-analysis dispatch path?
    pub fn has_full_taint_analysis(&self) -> bool {
        matches!(self, Language::Php)
    }
}

/// Severity score in [1, 10], per §3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Severity(pub u8);

/// Score→level mapping is a total function (§3 invariants, testable property 7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Level {
    Low,
    Medium,
    High,
    Critical,
    Unknown,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Low => "LOW",
            Level::Medium => "MEDIUM",
            Level::High => "HIGH",
            Level::Critical => "CRITICAL",
            Level::Unknown => "Unknown",
        }
    }
}

impl Severity {
    pub fn new(score: u8) -> Self {
        Self(score)
    }

    pub fn level(&self) -> Level {
        match self.0 {
            1 | 2 => Level::Low,
            3..=5 => Level::Medium,
            6..=8 => Level::High,
            9 | 10 => Level::Critical,
            _ => Level::Unknown,
        }
    }
}

/// A matched location awaiting verification by the taint core (§3).
#[derive(Debug, Clone)]
pub struct Candidate {
    pub file_path: PathBuf,
    pub line_number: usize,
    pub code_snippet: String,
}

/// One step in a Finding's provenance chain (§3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChainStepKind {
    NewScan,
    SinkCall,
    Assignment,
    ParamIn,
    Return,
    Sanitizer,
    Source,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainStep {
    pub kind: ChainStepKind,
    pub code: String,
    pub file: PathBuf,
    pub line: usize,
}

impl ChainStep {
    pub fn new(kind: ChainStepKind, code: impl Into<String>, file: PathBuf, line: usize) -> Self {
        Self { kind, code: code.into(), file, line }
    }
}

/// A reported vulnerability (§3). `file_path` is relative to the scan root
/// and `code_snippet` is truncated to `MAX_SNIPPET_LEN` at construction time
/// by the result model, never before.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub rule_id: String,
    pub rule_name: String,
    pub language: Language,
    pub file_path: PathBuf,
    pub line_number: usize,
    pub code_snippet: String,
    pub analysis: String,
    pub chain: Vec<ChainStep>,
    pub commit_author: String,
    pub severity: Severity,
}

impl Finding {
    /// Key used for emit-time deduplication (§4.7): (rule_id, file_path, line).
    pub fn dedup_key(&self) -> (String, PathBuf, usize) {
        (self.rule_id.clone(), self.file_path.clone(), self.line_number)
    }
}
