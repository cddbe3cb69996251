use url::Url;

use crate::net::error::SubmitError;
use crate::page::form::FormElement;
use crate::page::snapshot::FormSnapshot;

/// The request a form submission turns into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitRequest {
    pub method: String,
    pub url: Url,
    pub body: FormSnapshot,
}

impl SubmitRequest {
    /// Read the form's reflected method and action and snapshot its fields.
    /// Fails the way `fetch` rejects: an unresolvable action, or a body on
    /// a method that cannot carry one.
    pub fn from_form(form: &FormElement, page_url: &Url) -> Result<Self, SubmitError> {
        let method = form.method();
        let url = form.resolve_action(page_url)?;

        if !method.allows_body() {
            return Err(SubmitError::BodyNotAllowed {
                method: method.request_method().to_string(),
            });
        }

        Ok(Self {
            method: method.request_method().to_string(),
            url,
            body: form.snapshot(),
        })
    }

    /// Path plus query, as a server would log it.
    pub fn target(&self) -> String {
        match self.url.query() {
            Some(q) => format!("{}?{}", self.url.path(), q),
            None => self.url.path().to_string(),
        }
    }
}
