use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use form_interceptor::net::{
    error::SubmitError,
    request::SubmitRequest,
    transport::{Transport, TransportResponse},
};
use tokio::sync::oneshot;

enum Reply {
    Respond(TransportResponse),
    Refuse(String),
}

/// Records every request and answers each with the same reply.
pub struct MockTransport {
    reply: Reply,
    requests: Mutex<Vec<SubmitRequest>>,
}

impl MockTransport {
    pub fn responding(status: u16, body: &str) -> Self {
        Self {
            reply: Reply::Respond(TransportResponse {
                status,
                body: body.to_string(),
            }),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn ok(body: &str) -> Self {
        Self::responding(200, body)
    }

    pub fn refusing(message: &str) -> Self {
        Self {
            reply: Reply::Refuse(message.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<SubmitRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: &SubmitRequest) -> Result<TransportResponse, SubmitError> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.reply {
            Reply::Respond(response) => Ok(response.clone()),
            Reply::Refuse(message) => Err(SubmitError::Rejected(message.clone())),
        }
    }
}

/// Holds each request until the test releases its gate. Gates are keyed by
/// the value of one field so the test controls resolution order.
pub struct GatedTransport {
    key_field: String,
    gates: Mutex<HashMap<String, oneshot::Receiver<TransportResponse>>>,
}

impl GatedTransport {
    pub fn new(key_field: &str) -> Self {
        Self {
            key_field: key_field.to_string(),
            gates: Mutex::new(HashMap::new()),
        }
    }

    /// Register a gate for requests whose key field equals `key`.
    pub fn gate(&self, key: &str) -> oneshot::Sender<TransportResponse> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(key.to_string(), rx);
        tx
    }
}

#[async_trait]
impl Transport for GatedTransport {
    async fn send(&self, request: &SubmitRequest) -> Result<TransportResponse, SubmitError> {
        let key = request.body.get(&self.key_field).unwrap_or_default().to_string();
        let gate = self.gates.lock().unwrap().remove(&key);
        match gate {
            Some(rx) => rx
                .await
                .map_err(|_| SubmitError::Rejected(format!("gate '{}' dropped", key))),
            None => Err(SubmitError::Rejected(format!("no gate for '{}'", key))),
        }
    }
}

pub fn html(body: &str) -> TransportResponse {
    TransportResponse {
        status: 200,
        body: body.to_string(),
    }
}
