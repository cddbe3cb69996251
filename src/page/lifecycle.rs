use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::interceptor::pending::{PendingSubmission, SubmitOutcome};
use crate::page::document::{PageDocument, SharedDocument, lock_document};
use crate::page::error::PageError;
use crate::page::form::FormHandle;

/// Runs once when the page structure is ready.
pub type ReadyHook = Box<dyn FnOnce(&mut Page) + Send>;

/// A submit event dispatched at one form element.
#[derive(Debug)]
pub struct SubmitEvent {
    target: FormHandle,
    default_prevented: bool,
}

impl SubmitEvent {
    pub fn new(target: FormHandle) -> Self {
        Self {
            target,
            default_prevented: false,
        }
    }

    pub fn target(&self) -> &FormHandle {
        &self.target
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// Listener for submit events. Returning a pending submission hands the
/// asynchronous part of the handler back to the page to schedule.
pub trait SubmitHandler: Send + Sync {
    fn handle_submit(
        &self,
        event: &mut SubmitEvent,
        document: &SharedDocument,
    ) -> Option<PendingSubmission>;
}

/// What a submit dispatch did.
#[derive(Debug)]
pub struct SubmitDispatch {
    pub default_prevented: bool,
    pub tasks: Vec<JoinHandle<SubmitOutcome>>,
}

impl SubmitDispatch {
    /// True when no handler suppressed the native form navigation.
    pub fn navigated(&self) -> bool {
        !self.default_prevented
    }

    /// Wait for every scheduled submission to finish.
    pub async fn settle(self) -> Vec<SubmitOutcome> {
        let mut outcomes = Vec::with_capacity(self.tasks.len());
        for task in self.tasks {
            match task.await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => warn!("submission task did not complete: {}", e),
            }
        }
        outcomes
    }
}

/// A loaded page: the document plus its lifecycle and submit listeners.
pub struct Page {
    document: SharedDocument,
    loaded: bool,
    ready_hooks: Vec<ReadyHook>,
    submit_handlers: Vec<Arc<dyn SubmitHandler>>,
}

impl Page {
    pub fn new(document: PageDocument) -> Self {
        Self::from_shared(document.into_shared())
    }

    pub fn from_shared(document: SharedDocument) -> Self {
        Self {
            document,
            loaded: false,
            ready_hooks: Vec::new(),
            submit_handlers: Vec::new(),
        }
    }

    pub fn document(&self) -> &SharedDocument {
        &self.document
    }

    pub fn body_html(&self) -> String {
        lock_document(&self.document).body_html().to_string()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Register a hook for the structural-ready event. Hooks registered after
    /// the event has fired never run.
    pub fn on_ready(&mut self, hook: ReadyHook) {
        if self.loaded {
            debug!("ready hook registered after DOMContentLoaded; ignored");
            return;
        }
        self.ready_hooks.push(hook);
    }

    /// Fire `DOMContentLoaded`. Only the first call runs the hooks.
    pub fn dispatch_dom_content_loaded(&mut self) {
        if self.loaded {
            return;
        }
        self.loaded = true;

        for hook in std::mem::take(&mut self.ready_hooks) {
            hook(self);
        }
    }

    pub fn add_submit_handler(&mut self, handler: Arc<dyn SubmitHandler>) {
        self.submit_handlers.push(handler);
    }

    pub fn submit_handler_count(&self) -> usize {
        self.submit_handlers.len()
    }

    /// Submit the form with `form_id` in the current body. Every handler sees
    /// the event; the submissions they return are spawned on the runtime.
    pub fn submit(&mut self, form_id: &str) -> Result<SubmitDispatch, PageError> {
        let form = lock_document(&self.document)
            .form(form_id)
            .ok_or_else(|| PageError::FormNotFound(form_id.to_string()))?;

        let mut event = SubmitEvent::new(form);
        let mut tasks = Vec::new();

        for handler in &self.submit_handlers {
            if let Some(pending) = handler.handle_submit(&mut event, &self.document) {
                tasks.push(tokio::spawn(pending.resolve()));
            }
        }

        if !event.default_prevented() {
            debug!(form_id, "submit not intercepted; native navigation would run");
        }

        Ok(SubmitDispatch {
            default_prevented: event.default_prevented(),
            tasks,
        })
    }
}
