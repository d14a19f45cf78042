//! Converts a `NEW_RULE` function-name hint into a matcher-ready rule body
//! (§6). The synthesized rule re-enters the matcher as
//! `FUNCTION_PARAM_CONTROLLABLE` against the hinted function's first
//! parameter, mirroring how the taint core escalates taint crossing a
//! function boundary.

use regex::escape;
use tg_core::{Language, NewRuleSpec, Result};

pub fn build_new_rule_spec(hint: &str, _language: Language) -> Result<NewRuleSpec> {
    Ok(NewRuleSpec {
        match_regex: format!(r"\b{}\s*\(", escape(hint)),
        anti_regex: None,
        sink_name: hint.to_string(),
        param_index: 0,
    })
}
