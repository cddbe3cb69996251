use std::fmt;

/// The single failure kind of a submission: anything that rejects the
/// request chain between reading the form and having the response text.
#[derive(Debug)]
pub enum SubmitError {
    /// The form's action could not be resolved against the page URL
    InvalidAction { action: String, source: url::ParseError },

    /// The reflected method is not a valid HTTP method token
    InvalidMethod(String),

    /// GET and HEAD requests cannot carry the form body
    BodyNotAllowed { method: String },

    /// The request could not be sent or no response arrived
    Connection { url: String, source: reqwest::Error },

    /// The response arrived but its body could not be read
    BodyRead { url: String, source: reqwest::Error },

    /// The form data could not be encoded as a request body
    Encode(reqwest::Error),

    /// A transport rejected the request without an underlying error value
    Rejected(String),
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitError::InvalidAction { action, source } => {
                write!(f, "Invalid form action '{}': {}", action, source)
            }
            SubmitError::InvalidMethod(method) => {
                write!(f, "'{}' is not a valid HTTP method", method)
            }
            SubmitError::BodyNotAllowed { method } => {
                write!(f, "Request with {} method cannot have body", method)
            }
            SubmitError::Connection { url, source } => {
                write!(f, "Failed to fetch {}: {}", url, source)
            }
            SubmitError::BodyRead { url, source } => {
                write!(f, "Failed to read response body from {}: {}", url, source)
            }
            SubmitError::Encode(source) => write!(f, "Failed to encode form data: {}", source),
            SubmitError::Rejected(msg) => write!(f, "Failed to fetch: {}", msg),
        }
    }
}

impl std::error::Error for SubmitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SubmitError::InvalidAction { source, .. } => Some(source),
            SubmitError::Connection { source, .. } => Some(source),
            SubmitError::BodyRead { source, .. } => Some(source),
            SubmitError::Encode(source) => Some(source),
            _ => None,
        }
    }
}
