//! YAML rule and repair-catalog loading (§6 external interfaces).

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tg_core::{AnalysisError, Result};

use crate::catalog::RepairCatalog;
use crate::registry::RuleRegistry;
use crate::types::Rule;

/// On-disk shape of a rule file: a bare list, one document per rule set
/// (mirrors how the teacher ships a directory of one-rule-per-file YAML).
#[derive(Debug, Deserialize)]
struct RuleFile {
    rules: Vec<Rule>,
}

/// On-disk shape of a repair catalog document.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    sanitizers: HashMap<String, Vec<String>>,
    #[serde(default)]
    sources: Vec<String>,
}

/// Load every `*.yml`/`*.yaml` file directly under `dir` as a `RuleFile` and
/// flatten them into a single registry. Malformed documents are logged and
/// skipped rather than aborting the whole load, matching the pre-filter
/// chain's "skip, don't abort" posture (§4.4); an empty resulting registry
/// is reported via `AnalysisError::RuleSetEmpty` by the caller, not here.
pub fn load_rules_dir(dir: &Path) -> Result<RuleRegistry> {
    let mut rules = Vec::new();
    let entries = std::fs::read_dir(dir).map_err(AnalysisError::from)?;
    let mut paths: Vec<_> = entries.filter_map(|e| e.ok()).map(|e| e.path()).collect();
    paths.sort();

    for path in paths {
        let is_yaml = matches!(path.extension().and_then(|e| e.to_str()), Some("yml") | Some("yaml"));
        if !is_yaml {
            continue;
        }
        match load_rule_file(&path) {
            Ok(mut parsed) => rules.append(&mut parsed),
            Err(err) => tracing::warn!("skipping unreadable rule file {}: {}", path.display(), err),
        }
    }

    Ok(RuleRegistry::new(rules))
}

fn load_rule_file(path: &Path) -> Result<Vec<Rule>> {
    let text = std::fs::read_to_string(path).map_err(AnalysisError::from)?;
    let file: RuleFile = serde_yaml::from_str(&text)
        .map_err(|e| AnalysisError::config_error(format!("{}: {}", path.display(), e)))?;
    Ok(file.rules)
}

/// Load a repair catalog document, with an optional secret overlay file
/// applied on top (§4.5). A missing `secret_path` is not an error; a
/// present-but-unreadable one is logged and ignored, continuing with the
/// base catalog, per the resolved open question in §9.
pub fn load_catalog(base_path: &Path, secret_path: Option<&Path>) -> Result<RepairCatalog> {
    let mut catalog = load_catalog_file(base_path)?;

    if let Some(secret_path) = secret_path {
        match load_catalog_file(secret_path) {
            Ok(secret) => catalog.overlay(secret),
            Err(err) => tracing::warn!("ignoring unreadable secret catalog {}: {}", secret_path.display(), err),
        }
    }

    Ok(catalog)
}

fn load_catalog_file(path: &Path) -> Result<RepairCatalog> {
    let text = std::fs::read_to_string(path).map_err(AnalysisError::from)?;
    let file: CatalogFile = serde_yaml::from_str(&text)
        .map_err(|e| AnalysisError::config_error(format!("{}: {}", path.display(), e)))?;

    let sanitizers = file
        .sanitizers
        .into_iter()
        .map(|(func, ids)| (func, ids.into_iter().collect()))
        .collect();

    Ok(RepairCatalog::new(sanitizers, file.sources))
}
