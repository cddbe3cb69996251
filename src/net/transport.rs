use async_trait::async_trait;
use reqwest::multipart::{Form, Part};

use crate::net::error::SubmitError;
use crate::net::request::SubmitRequest;
use crate::page::snapshot::{EntryValue, FormSnapshot};

/// A response as the interceptor consumes it: status plus body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// Sends a submission and reads the whole response body as text.
///
/// Any HTTP status is a response. Only failures to send, or to read the
/// body, are errors.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &SubmitRequest) -> Result<TransportResponse, SubmitError>;
}

/// HTTP transport over reqwest. No timeout, no retry, no custom headers.
#[derive(Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: &SubmitRequest) -> Result<TransportResponse, SubmitError> {
        let method = reqwest::Method::from_bytes(request.method.as_bytes())
            .map_err(|_| SubmitError::InvalidMethod(request.method.clone()))?;

        let response = self
            .client
            .request(method, request.url.clone())
            .multipart(multipart_body(&request.body)?)
            .send()
            .await
            .map_err(|source| SubmitError::Connection {
                url: request.url.to_string(),
                source,
            })?;

        let status = response.status().as_u16();
        let bytes = response.bytes().await.map_err(|source| SubmitError::BodyRead {
            url: request.url.to_string(),
            source,
        })?;

        Ok(TransportResponse {
            status,
            body: decode_utf8(&bytes),
        })
    }
}

/// Decode a response body as UTF-8 whatever charset the headers declare.
/// A leading byte order mark is dropped and invalid sequences become U+FFFD.
pub fn decode_utf8(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

/// Encode a snapshot as multipart form data, one part per entry, in order.
///
/// Names go out as plain quoted `name="..."` parameters, never the RFC 5987
/// `name*=` form. Line breaks in names and text values become CRLF, then
/// `"`, CR and LF in names are percent-escaped. File entries are empty parts
/// with `filename=""` and an `application/octet-stream` type.
pub fn multipart_body(snapshot: &FormSnapshot) -> Result<Form, SubmitError> {
    let mut form = Form::new().percent_encode_noop();

    for entry in snapshot.entries() {
        let name = escape_part_name(&normalize_newlines(&entry.name));
        form = match &entry.value {
            EntryValue::Text(value) => form.text(name, normalize_newlines(value)),
            EntryValue::EmptyFile => {
                let part = Part::bytes(Vec::<u8>::new())
                    .file_name("")
                    .mime_str("application/octet-stream")
                    .map_err(SubmitError::Encode)?;
                form.part(name, part)
            }
        };
    }

    Ok(form)
}

/// Turn every lone CR, lone LF and CRLF into CRLF.
pub fn normalize_newlines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                chars.next_if_eq(&'\n');
                out.push_str("\r\n");
            }
            '\n' => out.push_str("\r\n"),
            c => out.push(c),
        }
    }
    out
}

fn escape_part_name(name: &str) -> String {
    name.replace('"', "%22")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
