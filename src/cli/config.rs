use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::interceptor::interceptor::DEFAULT_FORM_ID;
use crate::trace::console::DEFAULT_ERROR_PREFIX;

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "form-interceptor",
    version,
    about = "Submit a page's form asynchronously and splice the response into the page"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file (default: form-interceptor.yaml in current dir)
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Load a page, fill the bound form and submit it through the interceptor
    Submit {
        /// Page to load: a file path or an http(s) URL
        #[arg(long)]
        page: String,

        /// URL the page is served from (defaults to the page URL, or http://localhost/ for files)
        #[arg(long)]
        url: Option<String>,

        /// Field value to enter before submitting, as name=value (repeatable)
        #[arg(short, long = "field")]
        fields: Vec<String>,

        /// Id of the form to bind (overrides config)
        #[arg(long)]
        form_id: Option<String>,

        /// Append a JSONL submission trace to this file (overrides config)
        #[arg(long)]
        trace: Option<String>,
    },

    /// List the forms on a page and what each would send
    Inspect {
        /// Page to load: a file path or an http(s) URL
        #[arg(long)]
        page: String,

        /// URL the page is served from
        #[arg(long)]
        url: Option<String>,
    },
}

// ============================================================================
// Config File Model (optional YAML)
// ============================================================================

/// Optional YAML config file: `form-interceptor.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub interceptor: InterceptorConfig,
    #[serde(default)]
    pub trace: TraceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterceptorConfig {
    #[serde(default = "default_form_id")]
    pub form_id: String,

    #[serde(default = "default_error_prefix")]
    pub error_prefix: String,
}

impl Default for InterceptorConfig {
    fn default() -> Self {
        Self {
            form_id: default_form_id(),
            error_prefix: default_error_prefix(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TraceConfig {
    pub path: Option<String>,
}

fn default_form_id() -> String { DEFAULT_FORM_ID.to_string() }
fn default_error_prefix() -> String { DEFAULT_ERROR_PREFIX.to_string() }

// ============================================================================
// Config File Loading
// ============================================================================

/// Load config from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_config(path: Option<&str>) -> AppConfig {
    let config_path = path.unwrap_or("form-interceptor.yaml");
    match std::fs::read_to_string(config_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_default(),
        Err(_) => AppConfig::default(),
    }
}

// ============================================================================
// Argument helpers
// ============================================================================

/// Split a `name=value` argument. The value may itself contain `=`.
pub fn parse_field_arg(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("Invalid field '{}': expected name=value", arg)),
    }
}

/// Tracing filter for a `-v` count. `RUST_LOG` takes precedence when set.
pub fn verbosity_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}
