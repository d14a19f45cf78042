//! Taint Core (C4, §4.4): pre-filter chain, language dispatch, and the
//! taint verdict produced for each candidate.

pub mod filters;
pub mod taint_core;
pub mod verdict;

pub use filters::SkipReason;
pub use taint_core::TaintCore;
pub use verdict::TaintVerdict;
