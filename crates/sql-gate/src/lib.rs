//! Inline SQL injection gate for HTTP request processing.
//!
//! This crate implements the request-facing half of the gate: it buffers the
//! request body so it can be read twice, runs the [`sql_screen`] detector
//! over the body text and the parameter map, and applies the configured
//! behavior to anything that gets flagged. The host framework adapts its
//! request type into a [`GateRequest`] and supplies the continuation of its
//! handler chain as a [`ChainHandler`].
//!
//! # Architecture
//!
//! ```text
//! Client  -->  Gatekeeper  -->  ChainHandler (next handler)
//!                 |       \
//!            [Detector]    -->  ForwardDispatcher (forward behavior)
//!                 |
//!          [DiagnosticSink]
//! ```
//!
//! Flagged requests resolve to exactly one mitigation: continue with a
//! sanitized parameter view (protect), dispatch to a fixed alternate target
//! (forward), or abort with [`GateError::Detected`] (throw). Paths listed in
//! [`GateConfig::excluded_urls`] bypass inspection entirely, and internal
//! failures fail open rather than dropping the request.

pub mod body;
pub mod config;
pub mod decision;
pub mod gatekeeper;
pub mod request;

// Re-export the primary public types at the crate root for convenience.
pub use body::{BodyReader, RewindableBody};
pub use config::GateConfig;
pub use decision::{BehaviorKind, Mitigation, Verdict};
pub use gatekeeper::{
    BoxError, ChainHandler, ForwardDispatcher, GateError, GateOutcome, Gatekeeper,
};
pub use request::{DownstreamRequest, GateRequest, ParamsHandle, RequestMeta, SafeParameterView};
