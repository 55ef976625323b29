//! Character-level sanitizer for values flagged by the detector.
//!
//! The transform is a best-effort defanging, not escaping: single-character
//! tokens (quotes) become a space, multi-character tokens lose their second
//! character (`select` becomes `slect`), which breaks recognizability while
//! keeping most of the original text intact and human-readable.
//!
//! Each mutation shifts offsets, so the case-folded shadow string is
//! re-derived after every edit and the current token re-scanned from the top
//! until it no longer occurs.  Only then does the scan advance to the next
//! token.  The result is stable: a second full pass over already-sanitized
//! text changes nothing.

use crate::keywords::SANITIZE_TOKENS;
use crate::ParamMap;

/// Rewrite `value` so that no sanitize-list token remains recognizable.
pub fn sanitize_value(value: &str) -> String {
    let mut text = value.to_string();

    for token in SANITIZE_TOKENS {
        // ASCII folding keeps the shadow byte-aligned with `text`, so match
        // offsets can be applied to the original-case buffer directly.
        let mut shadow = text.to_ascii_lowercase();

        while let Some(pos) = shadow.find(token) {
            if token.len() == 1 {
                text.replace_range(pos..pos + 1, " ");
            } else {
                // Tokens are pure ASCII, so pos + 1 is a char boundary.
                text.remove(pos + 1);
            }
            shadow = text.to_ascii_lowercase();
        }
    }

    text
}

/// Produce a sanitized copy of `params`.
///
/// The key set, the per-key value count, and the value order are preserved
/// exactly; only value content changes.
pub fn sanitize_parameter_map(params: &ParamMap) -> ParamMap {
    params
        .iter()
        .map(|(key, values)| {
            let safe = values.iter().map(|v| sanitize_value(v)).collect();
            (key.clone(), safe)
        })
        .collect()
}
