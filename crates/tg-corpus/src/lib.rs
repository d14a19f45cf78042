//! File Corpus (C1) — enumerates the target tree, filters by language
//! extension, and exposes line-addressed content.
//!
//! Special files (under `/node_modules/`, `/bower_components/`, or named
//! `*.min.js`) are excluded from enumeration entirely, and `is_special_file`
//! is exposed separately so the taint core can re-check the invariant on a
//! candidate that arrived by some other path (§4.1, §4.4).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tg_core::constants::{SPECIAL_FILE_SUFFIX, SPECIAL_PATH_FRAGMENTS};
use tg_core::{AnalysisError, Language, Result};

/// A read-only, in-memory-or-disk file corpus.
///
/// Constructed once per scan; the Matcher and Taint Core only ever read
/// from it (§5 concurrency model: the corpus is immutable for the scan's
/// lifetime, which is what makes rule-granularity parallelism sound).
pub struct Corpus {
    root: PathBuf,
    /// Sorted for deterministic enumeration order (§4.2 guarantees).
    files: Vec<PathBuf>,
    contents: HashMap<PathBuf, String>,
}

impl Corpus {
    /// Walk `root` on disk, loading every regular file's contents.
    pub fn from_directory(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let mut files = Vec::new();
        let mut contents = HashMap::new();

        for entry in walkdir::WalkDir::new(&root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
        {
            let path = entry.path().to_path_buf();
            match std::fs::read_to_string(&path) {
                Ok(text) => {
                    files.push(path.clone());
                    contents.insert(path, text);
                }
                Err(err) => {
                    tracing::debug!("skipping unreadable file {}: {}", path.display(), err);
                }
            }
        }

        files.sort();
        Ok(Self { root, files, contents })
    }

    /// Build a corpus from literal contents, for tests and for embedding
    /// hosts that already hold the file set in memory.
    pub fn from_files(root: impl Into<PathBuf>, files: Vec<(PathBuf, String)>) -> Self {
        let root = root.into();
        let mut paths: Vec<PathBuf> = files.iter().map(|(p, _)| p.clone()).collect();
        paths.sort();
        let contents = files.into_iter().collect();
        Self { root, files: paths, contents }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All file paths accepted by `language`'s extension set, excluding
    /// special files, in sorted path order.
    pub fn files(&self, language: Language) -> impl Iterator<Item = &Path> {
        self.files.iter().filter(move |p| self.is_target(p, language)).map(|p| p.as_path())
    }

    fn is_target(&self, path: &Path, language: Language) -> bool {
        if self.is_special_file(path) {
            return false;
        }
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => language.accepts_extension(ext),
            None => false,
        }
    }

    /// Special file per §4.1: under `/node_modules/`, `/bower_components/`,
    /// or named `*.min.js`.
    pub fn is_special_file(&self, path: &Path) -> bool {
        let normalized = path.to_string_lossy().replace('\\', "/");
        if SPECIAL_PATH_FRAGMENTS.iter().any(|frag| normalized.contains(frag)) {
            return true;
        }
        normalized.ends_with(SPECIAL_FILE_SUFFIX)
    }

    pub fn read(&self, file: &Path) -> Result<&str> {
        self.contents
            .get(file)
            .map(|s| s.as_str())
            .ok_or_else(|| AnalysisError::internal_error(format!("file not in corpus: {}", file.display())))
    }

    /// 1-based line lookup, matching the Rule/Candidate line numbering (§3).
    pub fn line(&self, file: &Path, n: usize) -> Result<&str> {
        let text = self.read(file)?;
        text.lines()
            .nth(n.saturating_sub(1))
            .ok_or_else(|| AnalysisError::internal_error(format!("{}:{} out of range", file.display(), n)))
    }

    /// `file_path` relative to the scan root, with no leading separator,
    /// as required of a Finding's `file_path` (§3 invariants, §4.7).
    pub fn relative_path(&self, file: &Path) -> PathBuf {
        file.strip_prefix(&self.root).map(|p| p.to_path_buf()).unwrap_or_else(|_| file.to_path_buf())
    }
}
