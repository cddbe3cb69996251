use std::sync::Arc;

use url::Url;

use crate::cli::config::{AppConfig, parse_field_arg};
use crate::interceptor::interceptor::InterceptorOptions;
use crate::interceptor::pending::SubmitOutcome;
use crate::load_intercepted_page;
use crate::net::request::SubmitRequest;
use crate::net::transport::HttpTransport;
use crate::page::document::{PageDocument, lock_document};
use crate::page::error::PageError;
use crate::page::form::{FormElement, lock_form};
use crate::trace::console::Console;
use crate::trace::logger::TraceLogger;

const FILE_PAGE_URL: &str = "http://localhost/";

// ============================================================================
// Page loading
// ============================================================================

fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// URL a page is considered to be served from: the explicit override, the
/// location itself when it is a URL, or localhost for files.
pub fn page_url_for<'a>(location: &'a str, override_url: Option<&'a str>) -> &'a str {
    match override_url {
        Some(url) => url,
        None if is_remote(location) => location,
        None => FILE_PAGE_URL,
    }
}

/// Read a page from disk or fetch it over HTTP.
pub async fn load_page(location: &str, override_url: Option<&str>) -> Result<PageDocument, PageError> {
    let html = if is_remote(location) {
        let load_err = |source: reqwest::Error| PageError::LoadHttp {
            url: location.to_string(),
            source,
        };
        let response = reqwest::get(location).await.map_err(load_err)?;
        response.text().await.map_err(load_err)?
    } else {
        std::fs::read_to_string(location).map_err(|source| PageError::LoadFile {
            path: location.to_string(),
            source,
        })?
    };

    PageDocument::parse_str(page_url_for(location, override_url), &html)
}

// ============================================================================
// submit subcommand
// ============================================================================

/// Submit the bound form and return whether the page body was replaced.
pub async fn cmd_submit(
    page_location: &str,
    page_url: Option<&str>,
    fields: &[String],
    form_id: Option<&str>,
    trace_path: Option<&str>,
    config: &AppConfig,
) -> Result<bool, Box<dyn std::error::Error>> {
    let form_id = form_id.unwrap_or(&config.interceptor.form_id).to_string();
    let trace = trace_path
        .or(config.trace.path.as_deref())
        .map(|path| Arc::new(TraceLogger::open(path)));

    let document = load_page(page_location, page_url).await?;
    let console = Arc::new(Console::with_prefix(config.interceptor.error_prefix.clone()));
    let options = InterceptorOptions {
        form_id: form_id.clone(),
        trace,
    };

    let mut page = load_intercepted_page(
        document,
        options,
        Arc::new(HttpTransport::new()),
        Arc::clone(&console),
    );

    {
        let form = lock_document(page.document())
            .form(&form_id)
            .ok_or_else(|| PageError::FormNotFound(form_id.clone()))?;
        let mut form = lock_form(&form);
        for arg in fields {
            let (name, value) = parse_field_arg(arg)?;
            form.set_value(&name, &value)?;
        }
    }

    let dispatch = page.submit(&form_id)?;
    if dispatch.navigated() {
        println!("Form '{}' was not intercepted; the browser would navigate.", form_id);
        return Ok(false);
    }

    let mut rendered = false;
    for outcome in dispatch.settle().await {
        match outcome {
            SubmitOutcome::Rendered { status, body } => {
                eprintln!("Response status {}", status);
                println!("{}", body);
                rendered = true;
            }
            SubmitOutcome::Failed(_) => {
                eprintln!("Page body unchanged ({} console errors)", console.entries().len());
            }
        }
    }

    Ok(rendered)
}

// ============================================================================
// inspect subcommand
// ============================================================================

pub async fn cmd_inspect(
    page_location: &str,
    page_url: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let document = load_page(page_location, page_url).await?;

    if document.forms().is_empty() {
        println!("No forms on {}", document.url());
        return Ok(());
    }

    for form in document.forms() {
        print!("{}", format_form_summary(&lock_form(form), document.url()));
    }

    Ok(())
}

/// Describe a form: id, reflected method and action, and the entries a
/// submission would send right now.
pub fn format_form_summary(form: &FormElement, page_url: &Url) -> String {
    let mut out = format!("form #{}\n", form.id().unwrap_or("(no id)"));

    match SubmitRequest::from_form(form, page_url) {
        Ok(request) => {
            out.push_str(&format!("  {} {}\n", request.method, request.url));
            for (name, value) in request.body.to_pairs() {
                out.push_str(&format!("    {} = {:?}\n", name, value));
            }
        }
        Err(e) => {
            out.push_str(&format!("  {} (would fail: {})\n", form.method(), e));
        }
    }

    out
}
