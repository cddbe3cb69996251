use std::sync::Arc;

use tracing::debug;

use crate::interceptor::pending::PendingSubmission;
use crate::net::request::SubmitRequest;
use crate::net::transport::Transport;
use crate::page::document::{SharedDocument, lock_document};
use crate::page::form::{FormHandle, lock_form};
use crate::page::lifecycle::{Page, SubmitEvent, SubmitHandler};
use crate::trace::console::Console;
use crate::trace::logger::TraceLogger;

/// Id of the form the interceptor binds to unless configured otherwise.
pub const DEFAULT_FORM_ID: &str = "dreamForm";

#[derive(Clone)]
pub struct InterceptorOptions {
    pub form_id: String,
    pub trace: Option<Arc<TraceLogger>>,
}

impl Default for InterceptorOptions {
    fn default() -> Self {
        Self {
            form_id: DEFAULT_FORM_ID.to_string(),
            trace: None,
        }
    }
}

impl InterceptorOptions {
    pub fn for_form(form_id: impl Into<String>) -> Self {
        Self {
            form_id: form_id.into(),
            ..Self::default()
        }
    }
}

/// Replaces a form's native submission with an asynchronous request whose
/// response body is spliced into the page.
pub struct FormInterceptor {
    form_id: String,
    form: FormHandle,
    transport: Arc<dyn Transport>,
    console: Arc<Console>,
    trace: Option<Arc<TraceLogger>>,
}

impl FormInterceptor {
    /// Bind to the form with the configured id. Returns `None` when the page
    /// has no such form; the page then submits natively.
    pub fn initialize(
        document: &SharedDocument,
        options: &InterceptorOptions,
        transport: Arc<dyn Transport>,
        console: Arc<Console>,
    ) -> Option<Self> {
        let Some(form) = lock_document(document).form(&options.form_id) else {
            debug!(form_id = %options.form_id, "form not found; nothing to intercept");
            return None;
        };

        Some(Self {
            form_id: options.form_id.clone(),
            form,
            transport,
            console,
            trace: options.trace.clone(),
        })
    }

    /// Register initialization for `DOMContentLoaded`. When the event fires
    /// and the form exists, exactly one submit handler is attached.
    pub fn install(
        page: &mut Page,
        options: InterceptorOptions,
        transport: Arc<dyn Transport>,
        console: Arc<Console>,
    ) {
        page.on_ready(Box::new(move |page: &mut Page| {
            if let Some(interceptor) =
                FormInterceptor::initialize(page.document(), &options, transport, console)
            {
                page.add_submit_handler(Arc::new(interceptor));
            }
        }));
    }

    pub fn form_id(&self) -> &str {
        &self.form_id
    }

    /// The bound element. After a successful submission this is detached.
    pub fn form(&self) -> &FormHandle {
        &self.form
    }
}

impl SubmitHandler for FormInterceptor {
    fn handle_submit(
        &self,
        event: &mut SubmitEvent,
        document: &SharedDocument,
    ) -> Option<PendingSubmission> {
        if !Arc::ptr_eq(event.target(), &self.form) {
            return None;
        }

        event.prevent_default();

        let page_url = lock_document(document).url().clone();
        let request = SubmitRequest::from_form(&lock_form(&self.form), &page_url);

        Some(PendingSubmission {
            form_id: self.form_id.clone(),
            request,
            form: Arc::clone(&self.form),
            document: Arc::clone(document),
            transport: Arc::clone(&self.transport),
            console: Arc::clone(&self.console),
            trace: self.trace.clone(),
        })
    }
}
