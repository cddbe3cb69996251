use std::sync::Arc;

use form_interceptor::{
    interceptor::interceptor::InterceptorOptions,
    load_intercepted_page,
    net::{
        error::SubmitError,
        request::SubmitRequest,
        transport::{HttpTransport, Transport, decode_utf8, normalize_newlines},
    },
    page::{document::PageDocument, snapshot::FormSnapshot},
    trace::console::Console,
};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
    task::JoinHandle,
};
use url::Url;

// =========================================================================
// A one-shot HTTP server that captures the raw request
// =========================================================================

fn transport() -> HttpTransport {
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    HttpTransport::with_client(client)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

async fn serve_once(status_line: &'static str, body: &'static str) -> (Url, JoinHandle<String>) {
    serve_once_as(status_line, "text/html", body).await
}

async fn serve_once_as(
    status_line: &'static str,
    content_type: &'static str,
    body: &'static str,
) -> (Url, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut raw = Vec::new();
        let mut buf = [0u8; 4096];

        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            raw.extend_from_slice(&buf[..n]);

            let Some(header_end) = find(&raw, b"\r\n\r\n") else {
                continue;
            };
            let head = String::from_utf8_lossy(&raw[..header_end]).to_lowercase();
            let length = head
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok());
            match length {
                Some(len) if raw.len() >= header_end + 4 + len => break,
                None if find(&raw[header_end..], b"--\r\n").is_some() => break,
                _ => {}
            }
        }

        let response = format!(
            "{}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            content_type,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();

        String::from_utf8_lossy(&raw).into_owned()
    });

    (Url::parse(&format!("http://{}/", addr)).unwrap(), handle)
}

// =========================================================================
// Wire format
// =========================================================================

#[tokio::test]
async fn sends_multipart_body_to_form_action() {
    let (base, server) = serve_once("HTTP/1.1 200 OK", "<html><body><p>Saved</p></body></html>").await;

    let mut body = FormSnapshot::new();
    body.push_text("title", "Flying");
    body.push_text("dream_description", "Over the sea");
    let request = SubmitRequest {
        method: "POST".into(),
        url: base.join("/dreams").unwrap(),
        body,
    };

    let response = transport().send(&request).await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.body, "<html><body><p>Saved</p></body></html>");

    let raw = server.await.unwrap();
    assert!(raw.starts_with("POST /dreams HTTP/1.1\r\n"), "got: {}", raw);
    assert!(raw.to_lowercase().contains("content-type: multipart/form-data; boundary="));
    assert!(raw.contains("form-data; name=\"title\"\r\n\r\nFlying\r\n"));
    assert!(raw.contains("form-data; name=\"dream_description\"\r\n\r\nOver the sea\r\n"));
    assert!(!raw.to_lowercase().contains("x-requested-with"));
}

#[tokio::test]
async fn part_names_are_quoted_parameters_not_extended_ones() {
    let (base, server) = serve_once("HTTP/1.1 200 OK", "<html><body></body></html>").await;

    let mut body = FormSnapshot::new();
    body.push_text("dream title", "Flying");
    body.push_text("título", "Volar");
    body.push_text("50% off/now?#", "x");
    body.push_text("say \"hi\"", "y");
    let request = SubmitRequest {
        method: "POST".into(),
        url: base.join("/dreams").unwrap(),
        body,
    };

    transport().send(&request).await.unwrap();

    let raw = server.await.unwrap();
    assert!(!raw.contains("name*="), "got: {}", raw);
    assert!(raw.contains("form-data; name=\"dream title\"\r\n\r\nFlying\r\n"));
    assert!(raw.contains("form-data; name=\"título\"\r\n\r\nVolar\r\n"));
    assert!(raw.contains("form-data; name=\"50% off/now?#\"\r\n\r\nx\r\n"));
    assert!(raw.contains("form-data; name=\"say %22hi%22\"\r\n\r\ny\r\n"));
}

#[tokio::test]
async fn file_inputs_send_an_empty_octet_stream_part() {
    let (base, server) = serve_once("HTTP/1.1 200 OK", "<html><body></body></html>").await;

    let mut body = FormSnapshot::new();
    body.push_text("title", "Flying");
    body.push_empty_file("sketch");
    let request = SubmitRequest {
        method: "POST".into(),
        url: base.join("/dreams").unwrap(),
        body,
    };

    transport().send(&request).await.unwrap();

    let raw = server.await.unwrap();
    let part = raw
        .split("form-data; name=\"sketch\"")
        .nth(1)
        .expect("sketch part present");
    let part = part.to_lowercase();
    assert!(
        part.starts_with("; filename=\"\"\r\ncontent-type: application/octet-stream\r\n\r\n\r\n--"),
        "got: {:?}",
        part
    );
}

#[tokio::test]
async fn line_breaks_go_out_as_crlf() {
    let (base, server) = serve_once("HTTP/1.1 200 OK", "<html><body></body></html>").await;

    let html = r#"<html><body><form id="dreamForm" action="/dreams" method="POST">
        <textarea name="dream_description"></textarea></form></body></html>"#;
    let document = PageDocument::parse(base.join("/submit_dream").unwrap(), html);
    let mut page = load_intercepted_page(
        document,
        InterceptorOptions::default(),
        Arc::new(transport()),
        Arc::new(Console::new()),
    );
    {
        let doc = page.document().lock().unwrap();
        let form = doc.form("dreamForm").unwrap();
        form.lock()
            .unwrap()
            .set_value("dream_description", "Over the sea\nunder the moon\rthen\r\nhome")
            .unwrap();
    }

    page.submit("dreamForm").unwrap().settle().await;

    let raw = server.await.unwrap();
    assert!(raw.contains(
        "form-data; name=\"dream_description\"\r\n\r\nOver the sea\r\nunder the moon\r\nthen\r\nhome\r\n--"
    ));
}

#[tokio::test]
async fn response_body_is_decoded_as_utf8_whatever_the_charset() {
    let (base, server) = serve_once_as(
        "HTTP/1.1 200 OK",
        "text/html; charset=iso-8859-1",
        "<html><body><p>título</p></body></html>",
    )
    .await;

    let request = SubmitRequest {
        method: "POST".into(),
        url: base.join("/dreams").unwrap(),
        body: FormSnapshot::new(),
    };

    let response = transport().send(&request).await.unwrap();
    assert_eq!(response.body, "<html><body><p>título</p></body></html>");
    server.await.unwrap();
}

#[test]
fn utf8_decoding_drops_the_bom_and_replaces_bad_bytes() {
    assert_eq!(decode_utf8(b"\xEF\xBB\xBF<p>hi</p>"), "<p>hi</p>");
    assert_eq!(decode_utf8(b"a\xFFb"), "a\u{FFFD}b");
}

#[test]
fn newline_normalization_covers_every_break_style() {
    assert_eq!(normalize_newlines("a\nb\rc\r\nd"), "a\r\nb\r\nc\r\nd");
    assert_eq!(normalize_newlines("\r\r\n"), "\r\n\r\n");
    assert_eq!(normalize_newlines("plain"), "plain");
}

#[tokio::test]
async fn error_statuses_are_responses() {
    let (base, server) = serve_once("HTTP/1.1 404 Not Found", "<html><body>missing</body></html>").await;

    let request = SubmitRequest {
        method: "POST".into(),
        url: base.join("/gone").unwrap(),
        body: FormSnapshot::new(),
    };

    let response = transport().send(&request).await.unwrap();
    assert_eq!(response.status, 404);
    assert_eq!(response.body, "<html><body>missing</body></html>");
    server.await.unwrap();
}

#[tokio::test]
async fn refused_connection_is_a_connection_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let request = SubmitRequest {
        method: "POST".into(),
        url: Url::parse(&format!("http://{}/dreams", addr)).unwrap(),
        body: FormSnapshot::new(),
    };

    let err = transport().send(&request).await.unwrap_err();
    assert!(matches!(err, SubmitError::Connection { .. }));
    assert!(err.to_string().starts_with("Failed to fetch http://127.0.0.1:"));
}

#[tokio::test]
async fn invalid_method_tokens_are_rejected() {
    let request = SubmitRequest {
        method: "NOT A METHOD".into(),
        url: Url::parse("http://127.0.0.1:9/").unwrap(),
        body: FormSnapshot::new(),
    };

    let err = transport().send(&request).await.unwrap_err();
    assert!(matches!(err, SubmitError::InvalidMethod(_)));
}

// =========================================================================
// End to end through the page
// =========================================================================

#[tokio::test]
async fn intercepted_submit_over_http_replaces_the_body() {
    let (base, server) = serve_once("HTTP/1.1 200 OK", "<html><body><p>Saved</p></body></html>").await;

    let html = r#"<html><body><form id="dreamForm" action="/dreams" method="POST">
        <input name="title"></form></body></html>"#;
    let document = PageDocument::parse(base.join("/submit_dream").unwrap(), html);
    let console = Arc::new(Console::new());
    let mut page = load_intercepted_page(
        document,
        InterceptorOptions::default(),
        Arc::new(transport()),
        console.clone(),
    );

    {
        let doc = page.document().lock().unwrap();
        let form = doc.form("dreamForm").unwrap();
        form.lock().unwrap().set_value("title", "Flying").unwrap();
    }

    let outcomes = page.submit("dreamForm").unwrap().settle().await;
    assert!(outcomes[0].is_rendered());
    assert_eq!(page.body_html(), "<p>Saved</p>");
    assert!(console.is_empty());

    let raw = server.await.unwrap();
    assert!(raw.starts_with("POST /dreams HTTP/1.1\r\n"));
    assert!(raw.contains("name=\"title\"\r\n\r\nFlying\r\n"));
}

#[tokio::test]
async fn intercepted_submit_to_a_dead_server_logs_and_keeps_the_page() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let html = r#"<html><body><form id="dreamForm" action="/dreams" method="POST">
        <input name="title" value="Flying"></form></body></html>"#;
    let document =
        PageDocument::parse_str(&format!("http://{}/submit_dream", addr), html).unwrap();
    let console = Arc::new(Console::new());
    let mut page = load_intercepted_page(
        document,
        InterceptorOptions::default(),
        Arc::new(transport()),
        console.clone(),
    );
    let before = page.body_html();

    let outcomes = page.submit("dreamForm").unwrap().settle().await;
    assert!(!outcomes[0].is_rendered());
    assert_eq!(page.body_html(), before);
    assert_eq!(console.entries().len(), 1);
    assert!(console.entries()[0].text().starts_with("Error: Failed to fetch"));
}
