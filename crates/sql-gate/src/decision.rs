//! Behavior resolution for flagged requests.
//!
//! A detection verdict plus the configured behavior resolve to exactly one
//! [`Mitigation`].  The precedence is deliberate and matters:
//!
//! * Protect only ever fires when the *body* was clean — sanitized
//!   parameters can be presented transparently, but a contaminated body
//!   cannot be rewritten and re-delivered as a byte stream without breaking
//!   the downstream reader.
//! * Forward requires a configured target but is independent of which
//!   source tripped the detector, so it catches body-triggered detections
//!   that Protect must refuse.
//! * Everything else rejects the request.

use serde::{Deserialize, Serialize};

/// The configured response strategy for flagged requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BehaviorKind {
    /// Sanitize parameters and continue down the chain.
    #[default]
    Protect,
    /// Abort processing with a detection error.
    Throw,
    /// Dispatch the request to a fixed alternate target.
    Forward,
}

/// The outcome of running the detector against one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub body_unsafe: bool,
    pub params_unsafe: bool,
}

impl Verdict {
    pub fn is_unsafe(&self) -> bool {
        self.body_unsafe || self.params_unsafe
    }
}

/// The concrete action resolved for a flagged request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mitigation {
    /// Wrap the request in the sanitized parameter view and continue.
    SanitizeParams,
    /// Hand the request to the forward target.
    Dispatch(String),
    /// Abort with a detection error.
    Reject,
}

/// Resolve the mitigation for an unsafe verdict.
pub fn resolve(
    behavior: BehaviorKind,
    forward_to: Option<&str>,
    verdict: &Verdict,
) -> Mitigation {
    if behavior == BehaviorKind::Protect && !verdict.body_unsafe {
        return Mitigation::SanitizeParams;
    }

    if behavior == BehaviorKind::Forward {
        if let Some(target) = forward_to {
            return Mitigation::Dispatch(target.to_string());
        }
    }

    Mitigation::Reject
}
