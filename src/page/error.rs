use std::fmt;

/// Misuse of the page model: unknown forms or fields, bad page URLs, or a
/// page that could not be loaded.
#[derive(Debug)]
pub enum PageError {
    /// No form with this id exists in the current body
    FormNotFound(String),

    /// The form has no field with this name
    FieldNotFound { form: String, field: String },

    /// A select field has no option with this value
    OptionNotFound { field: String, value: String },

    /// The page URL could not be parsed
    InvalidPageUrl { url: String, source: url::ParseError },

    /// Reading a page from disk failed
    LoadFile { path: String, source: std::io::Error },

    /// Fetching a page over HTTP failed
    LoadHttp { url: String, source: reqwest::Error },
}

impl fmt::Display for PageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageError::FormNotFound(id) => write!(f, "No form with id '{}' on the page", id),
            PageError::FieldNotFound { form, field } => {
                write!(f, "Form '{}' has no field named '{}'", form, field)
            }
            PageError::OptionNotFound { field, value } => {
                write!(f, "Select '{}' has no option with value '{}'", field, value)
            }
            PageError::InvalidPageUrl { url, source } => {
                write!(f, "Invalid page URL '{}': {}", url, source)
            }
            PageError::LoadFile { path, source } => {
                write!(f, "Failed to read page '{}': {}", path, source)
            }
            PageError::LoadHttp { url, source } => {
                write!(f, "Failed to fetch page '{}': {}", url, source)
            }
        }
    }
}

impl std::error::Error for PageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PageError::InvalidPageUrl { source, .. } => Some(source),
            PageError::LoadFile { source, .. } => Some(source),
            PageError::LoadHttp { source, .. } => Some(source),
            _ => None,
        }
    }
}
