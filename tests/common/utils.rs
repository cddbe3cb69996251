use std::sync::Arc;

use form_interceptor::{
    interceptor::interceptor::InterceptorOptions,
    load_intercepted_page,
    net::transport::Transport,
    page::{
        document::{PageDocument, lock_document},
        form::{FormHandle, lock_form},
        lifecycle::Page,
    },
    trace::console::Console,
};

pub const PAGE_URL: &str = "http://localhost:5000/submit_dream";

/// The smallest page the interceptor applies to: one text field.
pub const SCENARIO_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head><title>Submit a dream</title><script src="/static/js/index.js"></script></head>
<body>
<h1>Submit a dream</h1>
<form id="dreamForm" action="/dreams" method="POST">
  <input type="text" name="title">
  <button type="submit">Save</button>
</form>
</body>
</html>"#;

/// A page whose form id does not match the interceptor's.
pub const NO_DREAM_FORM_PAGE: &str = r#"<html><body>
<form id="loginForm" action="/login" method="POST">
  <input name="username">
</form>
</body></html>"#;

/// Two forms: only `dreamForm` is bound.
pub const TWO_FORM_PAGE: &str = r#"<html><body>
<form id="searchForm" action="/search" method="POST"><input name="q" value="moon"></form>
<form id="dreamForm" action="/dreams" method="POST"><input name="title"></form>
</body></html>"#;

pub fn document(html: &str) -> PageDocument {
    PageDocument::parse_str(PAGE_URL, html).expect("page URL is valid")
}

pub fn load(html: &str, transport: Arc<dyn Transport>, console: Arc<Console>) -> Page {
    load_intercepted_page(document(html), InterceptorOptions::default(), transport, console)
}

pub fn form(page: &Page, id: &str) -> FormHandle {
    lock_document(page.document())
        .form(id)
        .unwrap_or_else(|| panic!("form '{}' is on the page", id))
}

pub fn type_into(page: &Page, form_id: &str, name: &str, value: &str) {
    lock_form(&form(page, form_id))
        .set_value(name, value)
        .expect("field exists");
}

pub fn field_value(form: &FormHandle, name: &str) -> String {
    lock_form(form)
        .field(name)
        .map(|f| f.value.clone())
        .unwrap_or_else(|| panic!("field '{}' exists", name))
}
