//! Configuration constants for taintgrep
//!
//! Centralizes the magic numbers and path fragments named by the
//! specification so they aren't scattered as literals across crates.

/// New-rule recursion never goes past this depth (§3 invariants, §4.6).
pub const MAX_RECURSION_DEPTH: u32 = 20;

/// Code snippets are truncated to this many chars, at emission only (§3, §9).
pub const MAX_SNIPPET_LEN: usize = 500;

/// Path fragments that mark a "special file" which must never produce a
/// Finding (§4.1, §4.4).
pub const SPECIAL_PATH_FRAGMENTS: &[&str] = &["/node_modules/", "/bower_components/"];

/// Suffix that marks a "special file" (minified JS) regardless of directory.
pub const SPECIAL_FILE_SUFFIX: &str = ".min.js";

/// Path fragments that mark a test file — logged but not filtered (§4.4).
pub const TEST_PATH_FRAGMENTS: &[&str] = &["/test/", "/tests/", "/unitTests/"];

/// Regexes (as literal alternation fragments) that mark a line as a comment
/// for non-REGEX_ONLY rules (§4.4 step 4).
pub const ANNOTATION_MARKERS: &[&str] = &["#", "//", "\\*"];

pub mod running {
    /// Default directory for `{sid}_list` / `{sid}_status` / `{sid}_data`.
    pub const DEFAULT_RUNNING_DIR: &str = "./running";
}
