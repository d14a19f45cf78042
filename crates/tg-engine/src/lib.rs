//! Scan engine (C6/C7, §4.6, §4.7): wires the rule worklist, taint core and
//! result model into a runnable scan, plus the progress-session persistence
//! an external poller reads from.

pub mod orchestrator;
pub mod result;
pub mod session;

pub use orchestrator::Orchestrator;
pub use result::ResultCollector;
pub use session::{ScanState, ScanStatus, Session};
