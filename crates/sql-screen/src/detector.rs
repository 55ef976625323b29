//! The unsafe-input heuristic.
//!
//! This is deliberately *not* a SQL parser.  A value is flagged when a SQL
//! keyword occurs as a whitespace-delimited token **and** the value as a
//! whole looks like an injected clause (leading quote, leading percent sign,
//! or trailing line-comment marker).  Keyword occurrence alone is not enough:
//! plain prose such as "I will select wisely" must pass.
//!
//! The gate has well-known false-negative paths (an injected keyword with no
//! quote/percent prefix and no comment suffix slips through) and the usual
//! false positives of any textual heuristic.  That exact behavior is the
//! compatibility contract; do not "fix" it here.

use tracing::debug;

use crate::keywords::DETECT_KEYWORDS;
use crate::ParamMap;

/// Returns `true` when `value` trips the keyword-plus-context heuristic.
///
/// Matching is case-insensitive.  A keyword counts only when it is preceded
/// or followed by a space; substrings embedded in longer words do not count
/// ("selections" never matches `select`).
pub fn is_unsafe(value: &str) -> bool {
    let lower = value.to_lowercase();

    // Context gate: the value must look like an injected clause.
    let injected_shape =
        lower.starts_with('\'') || lower.starts_with('%') || lower.ends_with("--");
    if !injected_shape {
        return false;
    }

    DETECT_KEYWORDS.iter().any(|kw| {
        let hit = lower.contains(&format!(" {kw}")) || lower.contains(&format!("{kw} "));
        if hit {
            debug!(keyword = kw, "unsafe keyword token in suspicious context");
        }
        hit
    })
}

/// Returns `true` when any value of any parameter is unsafe.
///
/// Short-circuits on the first hit.
pub fn params_unsafe(params: &ParamMap) -> bool {
    params.values().flatten().any(|v| is_unsafe(v))
}
