//! Keyword tables.
//!
//! Two fixed token lists drive the whole crate: the detection list used by
//! [`crate::detector`] and the broader sanitization list used by
//! [`crate::sanitizer`].  Both lists are part of the compatibility contract —
//! adding or removing entries changes which requests are flagged and how
//! flagged values are rewritten, so treat them as frozen.

/// Keywords the detector looks for as whitespace-delimited tokens.
///
/// A match on one of these is only meaningful together with the context gate
/// in [`crate::detector::is_unsafe`]; the keyword alone never flags a value.
pub static DETECT_KEYWORDS: &[&str] = &[
    "exec", "select", "update", "delete", "insert", "alter", "drop", "create",
    "shutdown", "or", "and", "like",
];

/// Tokens the sanitizer neutralizes.
///
/// A superset of [`DETECT_KEYWORDS`]: every detection keyword plus the raw
/// quote characters and the SQL comment delimiters.  Order matters — the
/// delimiter entries come first so quotes are blanked before the keyword
/// pass runs over the (possibly shifted) text.
pub static SANITIZE_TOKENS: &[&str] = &[
    "\"", "'", "/*", "*/", "--", "exec", "select", "update", "delete",
    "insert", "alter", "drop", "create", "shutdown", "or", "and", "like",
];
