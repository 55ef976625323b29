//! Diagnostic infrastructure for the sqlgate project.
//!
//! When the gate detects an injection attempt (and logging is enabled) it
//! builds an [`IncidentRecord`], stamps it with the next value from the
//! shared [`AttemptCounter`], and hands it to a [`DiagnosticSink`].  Two
//! sinks ship with the crate:
//!
//! * [`TracingSink`] -- renders the record as a multi-line diagnostic string
//!   and emits it through `tracing` (the default).
//! * [`JsonLinesSink`] -- queues each record for a background task that
//!   appends it to a log file as one newline-terminated JSON object, a
//!   [JSON Lines](https://jsonlines.org/) stream that is easy to ship and
//!   replay.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use incident_log::{DiagnosticSink, IncidentRecord, JsonLinesSink};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let (sink, _handle) = JsonLinesSink::start("/var/log/sqlgate/incidents.jsonl").await?;
//!
//! sink.emit(&IncidentRecord::new(
//!     1,
//!     Some("10.0.0.9".into()),
//!     None,
//!     None,
//!     "/app/login",
//!     "POST",
//!     Default::default(),
//!     Some("q=' select 1--".into()),
//! ));
//! # Ok(())
//! # }
//! ```

pub mod counter;
pub mod record;
pub mod sink;

// Re-export primary public types at the crate root for convenience.
pub use counter::AttemptCounter;
pub use record::IncidentRecord;
pub use sink::{DiagnosticSink, JsonLinesSink, SinkError, TracingSink};
