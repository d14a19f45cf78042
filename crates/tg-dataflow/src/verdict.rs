//! The taint verdict returned by `TaintCore::evaluate` (§4.4).

use tg_core::{AnalysisError, ChainStep};

#[derive(Debug)]
pub enum TaintVerdict {
    Vulnerable(Vec<ChainStep>),
    Fixed(Vec<ChainStep>),
    Unconfirmed(Vec<ChainStep>),
    Uncontrolled(Vec<ChainStep>),
    /// Taint exits this function through a parameter; carries the
    /// enclosing function name so the orchestrator can synthesize a
    /// follow-up rule (§4.6).
    NewRule(String, Vec<ChainStep>),
    /// The rule's match mode needs full taint analysis but the
    /// candidate's language doesn't support it (§4.4 dispatch table).
    Unsupported,
    /// Dropped by the pre-filter chain before any resolution was
    /// attempted.
    Filtered,
    Error(AnalysisError),
}

impl TaintVerdict {
    pub fn is_reportable(&self) -> bool {
        matches!(self, TaintVerdict::Vulnerable(_) | TaintVerdict::Unconfirmed(_))
    }

    pub fn chain(&self) -> Option<&[ChainStep]> {
        match self {
            TaintVerdict::Vulnerable(c)
            | TaintVerdict::Fixed(c)
            | TaintVerdict::Unconfirmed(c)
            | TaintVerdict::Uncontrolled(c)
            | TaintVerdict::NewRule(_, c) => Some(c),
            TaintVerdict::Unsupported | TaintVerdict::Filtered | TaintVerdict::Error(_) => None,
        }
    }
}
