use std::sync::Arc;

use crate::{
    interceptor::interceptor::{FormInterceptor, InterceptorOptions},
    net::transport::Transport,
    page::{document::PageDocument, lifecycle::Page},
    trace::console::Console,
};

pub mod cli;
pub mod interceptor;
pub mod net;
pub mod page;
pub mod trace;

/// Load a page with the interceptor wired to `DOMContentLoaded`, then fire
/// the event. The returned page is ready for submissions.
pub fn load_intercepted_page(
    document: PageDocument,
    options: InterceptorOptions,
    transport: Arc<dyn Transport>,
    console: Arc<Console>,
) -> Page {
    let mut page = Page::new(document);
    FormInterceptor::install(&mut page, options, transport, console);
    page.dispatch_dom_content_loaded();
    page
}
