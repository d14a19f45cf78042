//! Minimal scan runner: wires a corpus, rule registry and orchestrator
//! together for a target directory. Not a designed CLI surface (out of
//! scope) — just enough to drive the workspace end-to-end.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use taintgrep::prelude::*;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let target = args.next().context("usage: taintgrep <target-dir> [rules-dir]")?;
    let rules_dir = args.next().unwrap_or_else(|| "./rules".to_string());

    info!("scanning {} with rules from {}", target, rules_dir);

    let corpus = Corpus::from_directory(&target).with_context(|| format!("reading corpus at {target}"))?;
    let registry = load_rules_dir(&PathBuf::from(&rules_dir)).with_context(|| format!("loading rules from {rules_dir}"))?;

    let catalog_path = PathBuf::from(&rules_dir).join("catalog.yml");
    let catalog = if catalog_path.exists() {
        load_catalog(&catalog_path, None).with_context(|| format!("loading repair catalog from {}", catalog_path.display()))?
    } else {
        warn!("no repair catalog at {}, running without sanitizers/sources", catalog_path.display());
        RepairCatalog::default()
    };

    let orchestrator = match Orchestrator::new(corpus, registry, catalog, Vec::new(), Box::new(PhpLineAst::new())) {
        Ok(orchestrator) => orchestrator,
        Err(err) => {
            error!("cannot start scan: {err}");
            std::process::exit(1);
        }
    };

    let findings = orchestrator.run()?;
    if findings.is_empty() {
        warn!("scan completed with no findings");
    }

    for finding in &findings {
        println!("{}", serde_json::to_string(finding)?);
    }

    info!("scan complete: {} finding(s)", findings.len());
    Ok(())
}
