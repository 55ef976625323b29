//! The per-request inspect-and-mitigate state machine.
//!
//! For every request the gate walks a small, fixed set of states:
//!
//! ```text
//! Start ── path excluded? ──▶ Excluded (forward untouched)
//!   │
//!   ▼ capture body, run detector on body text and parameters
//! Inspecting ── clean ──▶ Passed (rewound body, original params)
//!   │
//!   ▼ flagged (emit incident record if logging is enabled)
//! resolve(behavior) ──▶ Protected | Forwarded | Err(Detected)
//! ```
//!
//! Any other failure along the way — an unreadable body, a handler that
//! blows up mid-inspection — degrades to `FailedOpen`: the original request
//! continues to the next handler unmodified.  The gate fails open by
//! design, favoring availability over strict enforcement; only the throw
//! branch ever surfaces an error to the caller.

use std::sync::Arc;

use tracing::{debug, error};

use incident_log::{AttemptCounter, DiagnosticSink, IncidentRecord, TracingSink};
use sql_screen::{detector, ParamMap};

use crate::body::RewindableBody;
use crate::config::GateConfig;
use crate::decision::{self, Mitigation, Verdict};
use crate::request::{DownstreamRequest, GateRequest, ParamsHandle, RequestMeta, SafeParameterView};

/// Boxed error type used at the host-facing trait seams.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Continuation of the request chain: whatever handler would have received
/// the request had the gate not been installed.
pub trait ChainHandler {
    fn handle(&self, request: DownstreamRequest<'_>) -> Result<(), BoxError>;
}

/// Dispatch primitive for the forward behavior.
///
/// Receives the target resource identifier plus the request and takes over
/// the response entirely; the gate never writes to the response after a
/// successful dispatch.
pub trait ForwardDispatcher {
    fn dispatch(&self, target: &str, request: DownstreamRequest<'_>) -> Result<(), BoxError>;
}

/// Gate processing errors.
#[derive(Debug, thiserror::Error)]
pub enum GateError {
    /// The throw branch: a detection was mitigated by aborting the request.
    /// This is the only error intentionally surfaced through
    /// [`Gatekeeper::process`].
    #[error("SQL injection detected")]
    Detected,

    #[error("request body could not be captured: {0}")]
    Capture(#[from] std::io::Error),

    #[error("forward dispatch to '{target}' failed: {source}")]
    Forward { target: String, source: BoxError },

    #[error("downstream handler failed: {0}")]
    Handler(#[source] BoxError),
}

/// How one request left the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    /// The path was in the exclusion set; nothing was inspected.
    Excluded,
    /// Inspection found nothing; the request continued unmodified.
    Passed,
    /// Parameters were sanitized and the request continued.
    Protected,
    /// The request was dispatched to the forward target.
    Forwarded(String),
    /// Inspection failed internally; the request continued unmodified.
    FailedOpen,
}

/// The orchestrator: buffers the body, runs the detector, and applies the
/// configured behavior.
///
/// One `Gatekeeper` serves any number of concurrent requests; the only
/// shared mutable state is the injected [`AttemptCounter`].
pub struct Gatekeeper {
    config: GateConfig,
    counter: AttemptCounter,
    sink: Arc<dyn DiagnosticSink>,
}

impl Gatekeeper {
    /// Build a gate with a fresh counter and the default `tracing` sink.
    pub fn new(config: GateConfig) -> Self {
        Self {
            config,
            counter: AttemptCounter::new(),
            sink: Arc::new(TracingSink),
        }
    }

    /// Replace the diagnostic sink.
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Inject a shared attempt counter (e.g. one counter across several gate
    /// instances, or a fresh one per test).
    pub fn with_counter(mut self, counter: AttemptCounter) -> Self {
        self.counter = counter;
        self
    }

    pub fn counter(&self) -> &AttemptCounter {
        &self.counter
    }

    /// Run one request through the gate.
    ///
    /// Returns `Err` only for the throw branch ([`GateError::Detected`]) or
    /// when even the fail-open delivery to the chain fails
    /// ([`GateError::Handler`]); every other internal failure resolves to
    /// `Ok(GateOutcome::FailedOpen)` with the request passed through.
    ///
    /// The excluded branch is the one place without a fail-open retry: the
    /// raw body stream is handed to the handler unbuffered, so once the
    /// handler fails there is no copy left to re-deliver and the error
    /// surfaces as [`GateError::Handler`] directly.
    pub fn process(
        &self,
        request: GateRequest,
        chain: &dyn ChainHandler,
        dispatcher: &dyn ForwardDispatcher,
    ) -> Result<GateOutcome, GateError> {
        let GateRequest {
            meta,
            params,
            mut body,
        } = request;

        if self
            .config
            .excluded_urls
            .iter()
            .any(|p| p == meta.relative_path())
        {
            debug!(path = meta.relative_path(), "path excluded from inspection");
            chain
                .handle(DownstreamRequest {
                    meta: &meta,
                    params: ParamsHandle::Original(&params),
                    body: body.into_source(),
                })
                .map_err(GateError::Handler)?;
            return Ok(GateOutcome::Excluded);
        }

        match self.inspect(&meta, &params, &mut body, chain, dispatcher) {
            Ok(outcome) => Ok(outcome),
            Err(GateError::Detected) => Err(GateError::Detected),
            Err(err) => {
                error!(
                    %err,
                    uri = %meta.uri,
                    "inspection failed; request passes through unmodified"
                );
                chain
                    .handle(DownstreamRequest {
                        meta: &meta,
                        params: ParamsHandle::Original(&params),
                        body: body.into_source(),
                    })
                    .map_err(GateError::Handler)?;
                Ok(GateOutcome::FailedOpen)
            }
        }
    }

    fn inspect(
        &self,
        meta: &RequestMeta,
        params: &ParamMap,
        body: &mut RewindableBody,
        chain: &dyn ChainHandler,
        dispatcher: &dyn ForwardDispatcher,
    ) -> Result<GateOutcome, GateError> {
        body.capture()?;
        let body_text = body.text().into_owned();

        let verdict = Verdict {
            body_unsafe: detector::is_unsafe(&body_text),
            params_unsafe: detector::params_unsafe(params),
        };

        if !verdict.is_unsafe() {
            chain
                .handle(DownstreamRequest {
                    meta,
                    params: ParamsHandle::Original(params),
                    body: Box::new(body.reader()),
                })
                .map_err(GateError::Handler)?;
            return Ok(GateOutcome::Passed);
        }

        debug!(
            body_unsafe = verdict.body_unsafe,
            params_unsafe = verdict.params_unsafe,
            uri = %meta.uri,
            "injection heuristic tripped"
        );

        if self.config.logging {
            let record = IncidentRecord::new(
                self.counter.next(),
                meta.remote_addr.clone(),
                meta.remote_user.clone(),
                meta.session_id.clone(),
                meta.uri.clone(),
                meta.method.clone(),
                params.clone(),
                Some(body_text),
            );
            self.sink.emit(&record);
        }

        match decision::resolve(
            self.config.behavior,
            self.config.forward_to.as_deref(),
            &verdict,
        ) {
            Mitigation::SanitizeParams => {
                let view = SafeParameterView::new(params);
                chain
                    .handle(DownstreamRequest {
                        meta,
                        params: ParamsHandle::Sanitized(&view),
                        body: Box::new(body.reader()),
                    })
                    .map_err(GateError::Handler)?;
                Ok(GateOutcome::Protected)
            }
            Mitigation::Dispatch(target) => {
                dispatcher
                    .dispatch(
                        &target,
                        DownstreamRequest {
                            meta,
                            params: ParamsHandle::Original(params),
                            body: Box::new(body.reader()),
                        },
                    )
                    .map_err(|source| GateError::Forward {
                        target: target.clone(),
                        source,
                    })?;
                Ok(GateOutcome::Forwarded(target))
            }
            Mitigation::Reject => Err(GateError::Detected),
        }
    }
}
