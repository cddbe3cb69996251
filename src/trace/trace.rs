use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::net::request::SubmitRequest;

/// One resolved submission, as written to the JSONL trace.
#[derive(Debug, Clone, Serialize)]
pub struct TraceEvent {
    pub timestamp_ms: u128,
    pub form_id: String,

    pub method: Option<String>,
    pub url: Option<String>,
    pub fields: usize,

    pub outcome: String,
    pub status: Option<u16>,
    pub error: Option<String>,

    pub body_before: String,
    pub body_after: Option<String>,
}

impl TraceEvent {
    pub fn now(form_id: &str, body_before: &str) -> Self {
        Self {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or_default(),
            form_id: form_id.to_string(),
            method: None,
            url: None,
            fields: 0,
            outcome: "pending".to_string(),
            status: None,
            error: None,
            body_before: body_fingerprint(body_before),
            body_after: None,
        }
    }

    pub fn with_request(mut self, request: &SubmitRequest) -> Self {
        self.method = Some(request.method.clone());
        self.url = Some(request.url.to_string());
        self.fields = request.body.len();
        self
    }

    pub fn rendered(mut self, status: u16, body_after: &str) -> Self {
        self.outcome = "rendered".to_string();
        self.status = Some(status);
        self.body_after = Some(body_fingerprint(body_after));
        self
    }

    pub fn failed(mut self, error: impl ToString) -> Self {
        self.outcome = "failed".to_string();
        self.error = Some(error.to_string());
        self
    }
}

/// SHA-1 of the body markup; lets a trace show whether a body changed
/// without storing it.
pub fn body_fingerprint(text: &str) -> String {
    use sha1::{Digest, Sha1};

    let mut hasher = Sha1::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}
