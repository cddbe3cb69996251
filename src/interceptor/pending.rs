use std::sync::Arc;

use tracing::{debug, info};

use crate::net::error::SubmitError;
use crate::net::request::SubmitRequest;
use crate::net::transport::{Transport, TransportResponse};
use crate::page::document::{SharedDocument, lock_document};
use crate::page::form::{FormHandle, lock_form};
use crate::page::parse::response_body;
use crate::trace::console::Console;
use crate::trace::logger::TraceLogger;
use crate::trace::trace::TraceEvent;

/// How a submission ended.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// The response's body content replaced the page body.
    Rendered { status: u16, body: String },
    /// The request chain rejected; the failure was logged to the console.
    Failed(SubmitError),
}

impl SubmitOutcome {
    pub fn is_rendered(&self) -> bool {
        matches!(self, SubmitOutcome::Rendered { .. })
    }
}

/// The asynchronous half of a submit handler: everything after the default
/// action was prevented and the snapshot was taken.
pub struct PendingSubmission {
    pub(crate) form_id: String,
    pub(crate) request: Result<SubmitRequest, SubmitError>,
    pub(crate) form: FormHandle,
    pub(crate) document: SharedDocument,
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) console: Arc<Console>,
    pub(crate) trace: Option<Arc<TraceLogger>>,
}

impl std::fmt::Debug for PendingSubmission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingSubmission")
            .field("form_id", &self.form_id)
            .field("request", &self.request)
            .finish_non_exhaustive()
    }
}

impl PendingSubmission {
    /// The request this submission will send, if it could be built.
    pub fn request(&self) -> Option<&SubmitRequest> {
        self.request.as_ref().ok()
    }

    /// Send the request and apply the result to the page.
    pub async fn resolve(self) -> SubmitOutcome {
        let PendingSubmission {
            form_id,
            request,
            form,
            document,
            transport,
            console,
            trace,
        } = self;

        let body_before = lock_document(&document).body_html().to_string();
        let mut event = TraceEvent::now(&form_id, &body_before);

        let result = match request {
            Ok(request) => {
                event = event.with_request(&request);
                debug!(method = %request.method, url = %request.url, fields = request.body.len(), "sending form");
                transport.send(&request).await
            }
            Err(e) => Err(e),
        };

        let outcome = match result {
            Ok(response) => on_success(response, &form, &document),
            Err(error) => on_failure(error, &console),
        };

        if let Some(trace) = trace {
            let event = match &outcome {
                SubmitOutcome::Rendered { status, body } => event.rendered(*status, body),
                SubmitOutcome::Failed(error) => event.failed(error),
            };
            trace.log(&event);
        }

        outcome
    }
}

fn on_success(response: TransportResponse, form: &FormHandle, document: &SharedDocument) -> SubmitOutcome {
    let body = response_body(&response.body);
    lock_document(document).replace_body(body.clone());
    info!(status = response.status, "page body replaced");

    // Runs after the body swap, so this resets the original element, which is
    // no longer part of the page. Forms in the new body keep their defaults.
    lock_form(form).reset();

    SubmitOutcome::Rendered {
        status: response.status,
        body,
    }
}

fn on_failure(error: SubmitError, console: &Console) -> SubmitOutcome {
    console.error(&error);
    SubmitOutcome::Failed(error)
}
