use std::path::PathBuf;

use thiserror::Error;

/// Failures that stop a run before the first query goes out.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("credentials not found: provide --api-key/--cse-id, GOOGLE_API_KEY/GOOGLE_CSE_ID, or the google_api section of the config file")]
    MissingCredentials,

    #[error("dork file {path}: {source}")]
    DorkFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse config {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("invalid value for {field}: {value}")]
    Invalid { field: &'static str, value: String },

    #[error("could not build http client: {0}")]
    HttpClient(String),

    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors a search backend reports for a single page request.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("quota exceeded: {0}")]
    Quota(String),

    #[error("api error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("parse error: {0}")]
    Parse(String),
}

impl BackendError {
    pub fn is_quota(&self) -> bool {
        matches!(self, BackendError::Quota(_))
    }
}

/// Errors that end a run after it has started writing output.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("output error: {0}")]
    Output(#[from] std::io::Error),
}
