//! The request model seen by the gate and by downstream handlers.
//!
//! The host adapts its framework's request into a [`GateRequest`]; after
//! inspection the gate hands a [`DownstreamRequest`] to the next handler.
//! Downstream code reads parameters through [`ParamsHandle`], which hides
//! whether the sanitized view is in play — a protected request must look
//! exactly like one produced by unmodified infrastructure.

use std::io::Read;
use std::sync::OnceLock;

use sql_screen::{sanitize_parameter_map, ParamMap};

use crate::body::RewindableBody;

/// Request metadata captured from the transport layer.
#[derive(Debug, Clone)]
pub struct RequestMeta {
    pub remote_addr: Option<String>,
    pub remote_user: Option<String>,
    pub session_id: Option<String>,
    pub method: String,
    /// Full request URI, including the deployment's base path prefix.
    pub uri: String,
    /// The deployment's base path prefix ("" when deployed at the root).
    pub context_path: String,
}

impl RequestMeta {
    /// The URI with the deployment context prefix stripped; exclusion
    /// matching runs against this.
    pub fn relative_path(&self) -> &str {
        self.uri
            .strip_prefix(&self.context_path)
            .unwrap_or(&self.uri)
    }
}

/// One inbound request as presented to the gate.
pub struct GateRequest {
    pub meta: RequestMeta,
    pub params: ParamMap,
    pub body: RewindableBody,
}

impl GateRequest {
    pub fn new(meta: RequestMeta, params: ParamMap, body: RewindableBody) -> Self {
        Self { meta, params, body }
    }
}

/// Lazily sanitized view over an original parameter map.
///
/// The derived map is computed on first access and cached for the rest of
/// the request — repeated parameter queries never re-run the sanitizer.
pub struct SafeParameterView<'a> {
    original: &'a ParamMap,
    safe: OnceLock<ParamMap>,
}

impl<'a> SafeParameterView<'a> {
    pub fn new(original: &'a ParamMap) -> Self {
        Self {
            original,
            safe: OnceLock::new(),
        }
    }

    /// The sanitized parameter map (computed at most once).
    pub fn parameter_map(&self) -> &ParamMap {
        self.safe
            .get_or_init(|| sanitize_parameter_map(self.original))
    }

    /// All sanitized values for `name`, in original order.
    pub fn parameter_values(&self, name: &str) -> Option<&[String]> {
        self.parameter_map().get(name).map(Vec::as_slice)
    }

    /// The first sanitized value for `name`; `None` when the parameter is
    /// absent or has no values.
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameter_values(name)?.first().map(String::as_str)
    }
}

/// Uniform parameter accessor handed to downstream code.
pub enum ParamsHandle<'a> {
    /// The request's parameters, untouched.
    Original(&'a ParamMap),
    /// The sanitized view installed by the protect behavior.
    Sanitized(&'a SafeParameterView<'a>),
}

impl ParamsHandle<'_> {
    /// The full parameter map.
    pub fn map(&self) -> &ParamMap {
        match self {
            Self::Original(map) => map,
            Self::Sanitized(view) => view.parameter_map(),
        }
    }

    /// All values for `name`, in original order.
    pub fn values(&self, name: &str) -> Option<&[String]> {
        self.map().get(name).map(Vec::as_slice)
    }

    /// The first value for `name`.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.values(name)?.first().map(String::as_str)
    }
}

/// The request delivered to the next handler or the forward target.
pub struct DownstreamRequest<'a> {
    pub meta: &'a RequestMeta,
    pub params: ParamsHandle<'a>,
    pub body: Box<dyn Read + Send>,
}
