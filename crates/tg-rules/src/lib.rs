//! Rule Registry (C5, §4.5): rule definitions, the repair catalog of
//! sanitizers/sources, and YAML loading for both.

pub mod catalog;
pub mod loader;
pub mod registry;
pub mod types;

pub use catalog::RepairCatalog;
pub use loader::{load_catalog, load_rules_dir};
pub use registry::RuleRegistry;
pub use types::{MatchMode, Rule, RuleStatus};
