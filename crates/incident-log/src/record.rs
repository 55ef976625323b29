use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A diagnostic record describing one detected injection attempt.
///
/// Built only when logging is enabled and a request was flagged; carries the
/// full *unsanitized* request state so an operator can reconstruct the
/// attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncidentRecord {
    /// Process-wide attempt number, from
    /// [`AttemptCounter`](crate::counter::AttemptCounter).
    pub attempt: u64,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_addr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub uri: String,
    pub method: String,
    /// Original parameter values as received, before any sanitization.
    pub parameters: HashMap<String, Vec<String>>,
    /// Raw body text, omitted when the body was empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl IncidentRecord {
    /// Create a record stamped with the current UTC time.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        attempt: u64,
        remote_addr: Option<String>,
        remote_user: Option<String>,
        session_id: Option<String>,
        uri: impl Into<String>,
        method: impl Into<String>,
        parameters: HashMap<String, Vec<String>>,
        body: Option<String>,
    ) -> Self {
        Self {
            attempt,
            timestamp: Utc::now(),
            remote_addr,
            remote_user,
            session_id,
            uri: uri.into(),
            method: method.into(),
            parameters,
            body: body.filter(|b| !b.is_empty()),
        }
    }

    /// Render the record as the free-form multi-line diagnostic string
    /// accepted by plain-text logging sinks.
    ///
    /// The URI line prints [`uri`](Self::uri) as stored; callers that want
    /// the deployment context prefix shown must include it in the field
    /// (the gate's request metadata already does).
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "\nPossible SQL injection attempt #{} at {}",
            self.attempt, self.timestamp
        ));
        out.push_str(&format!(
            "\nRemote Address: {}",
            self.remote_addr.as_deref().unwrap_or("-")
        ));
        out.push_str(&format!(
            "\nRemote User: {}",
            self.remote_user.as_deref().unwrap_or("-")
        ));
        out.push_str(&format!(
            "\nSession Id: {}",
            self.session_id.as_deref().unwrap_or("-")
        ));
        out.push_str(&format!("\nURI: {}", self.uri));
        out.push_str(&format!("\nParameters via {}", self.method));
        for (name, values) in &self.parameters {
            out.push_str(&format!("\n\t{name} = {}", values.join(" , ")));
        }
        if let Some(body) = &self.body {
            out.push_str(&format!("\nBody: {body}"));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> IncidentRecord {
        let mut params = HashMap::new();
        params.insert(
            "user".to_string(),
            vec!["admin".to_string(), "' or 1=1 --".to_string()],
        );
        IncidentRecord::new(
            7,
            Some("10.0.0.9".into()),
            None,
            Some("sess-42".into()),
            "/app/login",
            "POST",
            params,
            Some("q=' select 1--".into()),
        )
    }

    #[test]
    fn render_contains_every_field() {
        let rendered = sample().render();
        assert!(rendered.contains("attempt #7"));
        assert!(rendered.contains("Remote Address: 10.0.0.9"));
        assert!(rendered.contains("Remote User: -"));
        assert!(rendered.contains("Session Id: sess-42"));
        assert!(rendered.contains("URI: /app/login"));
        assert!(rendered.contains("Parameters via POST"));
        assert!(rendered.contains("\tuser = admin , ' or 1=1 --"));
        assert!(rendered.contains("Body: q=' select 1--"));
    }

    #[test]
    fn empty_body_is_dropped() {
        let record = IncidentRecord::new(
            1,
            None,
            None,
            None,
            "/x",
            "GET",
            HashMap::new(),
            Some(String::new()),
        );
        assert!(record.body.is_none());
        assert!(!record.render().contains("Body:"));
    }

    #[test]
    fn serializes_as_json() {
        let record = sample();
        let json = serde_json::to_string(&record).expect("should serialize");
        let back: IncidentRecord = serde_json::from_str(&json).expect("should deserialize");
        assert_eq!(back.attempt, record.attempt);
        assert_eq!(back.uri, record.uri);
        assert_eq!(back.parameters, record.parameters);
    }

    #[test]
    fn none_fields_are_omitted_from_json() {
        let record = IncidentRecord::new(
            1,
            None,
            None,
            None,
            "/x",
            "GET",
            HashMap::new(),
            None,
        );
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("remote_addr"));
        assert!(!json.contains("body"));
    }
}
