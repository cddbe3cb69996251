use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use scraper::Html;
use url::Url;

use crate::page::error::PageError;
use crate::page::form::{FormHandle, lock_form};
use crate::page::parse::{body_inner_html, parse_forms};

/// The page document, shared between the page and in-flight submissions.
pub type SharedDocument = Arc<Mutex<PageDocument>>;

/// Lock the shared document, recovering it if a holder panicked.
pub fn lock_document(document: &SharedDocument) -> MutexGuard<'_, PageDocument> {
    document.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The active page: its URL, body markup, and the forms parsed from that body.
#[derive(Debug)]
pub struct PageDocument {
    url: Url,
    body_html: String,
    forms: Vec<FormHandle>,
}

impl PageDocument {
    pub fn parse(url: Url, html: &str) -> Self {
        let document = Html::parse_document(html);
        Self {
            url,
            body_html: body_inner_html(&document),
            forms: wrap_forms(&document),
        }
    }

    pub fn parse_str(url: &str, html: &str) -> Result<Self, PageError> {
        let parsed = Url::parse(url).map_err(|source| PageError::InvalidPageUrl {
            url: url.to_string(),
            source,
        })?;
        Ok(Self::parse(parsed, html))
    }

    pub fn into_shared(self) -> SharedDocument {
        Arc::new(Mutex::new(self))
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn body_html(&self) -> &str {
        &self.body_html
    }

    pub fn forms(&self) -> &[FormHandle] {
        &self.forms
    }

    /// First form in tree order whose id is `id`.
    pub fn form(&self, id: &str) -> Option<FormHandle> {
        self.forms
            .iter()
            .find(|f| lock_form(f).id() == Some(id))
            .cloned()
    }

    /// Replace the body content. Forms in the old body are detached; forms in
    /// the new markup become fresh elements.
    pub fn replace_body(&mut self, inner_html: String) {
        for form in &self.forms {
            lock_form(form).detach();
        }

        let document = Html::parse_document(&format!("<body>{}</body>", inner_html));
        self.forms = wrap_forms(&document);
        self.body_html = inner_html;
    }
}

fn wrap_forms(document: &Html) -> Vec<FormHandle> {
    parse_forms(document)
        .into_iter()
        .map(|f| Arc::new(Mutex::new(f)))
        .collect()
}
