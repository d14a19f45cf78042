//! The pre-filter chain (§4.4): whitelist → special file → test file
//! (logged only) → annotation → extension/language support.

use std::path::Path;

use tg_core::constants::{ANNOTATION_MARKERS, TEST_PATH_FRAGMENTS};
use tg_core::Language;
use tg_corpus::Corpus;

/// Why a candidate was dropped before reaching the taint walk, kept around
/// only for `tracing` context, never surfaced to the result model as-is —
/// `UnsupportedExtension` is the one exception, mapped by the taint core to
/// `AnalysisError::UnsupportedFile` since a candidate reaching this step
/// with the wrong extension means some caller bypassed `Matcher::candidates`'
/// own filtering and is worth surfacing rather than silently dropping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Whitelisted,
    SpecialFile,
    Annotated,
    UnsupportedExtension,
}

/// `None` means the candidate survives the chain (a test-file hit is
/// logged, not dropped, per §4.4).
pub fn pre_filter(
    corpus: &Corpus,
    whitelist: &[String],
    language: Language,
    file: &Path,
    line_text: &str,
) -> Option<SkipReason> {
    let normalized = file.to_string_lossy().replace('\\', "/");

    if whitelist.iter().any(|frag| normalized.contains(frag.as_str())) {
        tracing::debug!("skipping whitelisted path {}", normalized);
        return Some(SkipReason::Whitelisted);
    }

    if corpus.is_special_file(file) {
        tracing::debug!("skipping special file {}", normalized);
        return Some(SkipReason::SpecialFile);
    }

    if TEST_PATH_FRAGMENTS.iter().any(|frag| normalized.contains(frag)) {
        tracing::warn!("candidate in a test path, continuing anyway: {}", normalized);
    }

    if is_annotated(line_text) {
        tracing::debug!("skipping annotated line in {}", normalized);
        return Some(SkipReason::Annotated);
    }

    let extension_ok = file.extension().and_then(|e| e.to_str()).is_some_and(|ext| language.accepts_extension(ext));
    if !extension_ok {
        tracing::warn!("candidate extension unsupported for {}: {}", language.as_str(), normalized);
        return Some(SkipReason::UnsupportedExtension);
    }

    None
}

/// A line carrying one of the annotation markers right after the code is
/// treated as a developer-reviewed false positive (§4.4).
fn is_annotated(line_text: &str) -> bool {
    ANNOTATION_MARKERS.iter().any(|marker| line_text.contains(marker))
}
