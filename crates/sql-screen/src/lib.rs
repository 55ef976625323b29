//! # sql-screen
//!
//! Heuristic SQL-injection detection and value sanitization for the sqlgate
//! request gate.
//!
//! The crate is organised around three layers:
//!
//! 1. **[`keywords`]** -- frozen token tables shared by the detector and the
//!    sanitizer.
//! 2. **[`detector`]** -- the keyword-plus-context heuristic that decides
//!    whether a value (or any value in a parameter map) is unsafe.
//! 3. **[`sanitizer`]** -- the character-level rewrite that defangs flagged
//!    values while keeping them readable.
//!
//! This is a cheap textual heuristic that runs on every request, not a SQL
//! parser: both false negatives and false positives exist by design, and the
//! observable behavior is a compatibility contract.
//!
//! ## Quick start
//!
//! ```rust
//! use sql_screen::{detector, sanitizer};
//!
//! assert!(detector::is_unsafe("' select password from users--"));
//!
//! let safe = sanitizer::sanitize_value("1' OR '1'='1");
//! assert!(!detector::is_unsafe(&safe));
//! ```

pub mod detector;
pub mod keywords;
pub mod sanitizer;

/// Multi-valued request parameters: name to ordered value list.
///
/// Key order is irrelevant; the order of values under one key is significant
/// and must survive sanitization.
pub type ParamMap = std::collections::HashMap<String, Vec<String>>;

// Re-export the common entry points at the crate root for ergonomic imports.
pub use detector::{is_unsafe, params_unsafe};
pub use sanitizer::{sanitize_parameter_map, sanitize_value};
