use std::path::PathBuf;

/// Errors returned by [`crate::Client`] and [`crate::Session`] operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Login did not produce a usable session token.
    #[error("DSpace login failed (HTTP {status}): {reason}")]
    Authentication { status: u16, reason: String },

    /// The server answered with something other than 200 OK.
    #[error("{method} {endpoint} failed: HTTP {code}{}", payload_suffix(.payload))]
    HttpStatus {
        code: u16,
        method: &'static str,
        endpoint: String,
        body: String,
        /// What was sent: the JSON text, or the path of an uploaded file.
        payload: Option<String>,
    },

    /// The body of a 200 response was not the JSON we expected.
    #[error("failed to parse API JSON from {endpoint}")]
    MalformedResponse {
        endpoint: String,
        body: String,
        #[source]
        source: serde_json::Error,
    },

    /// The request never produced a response (connection refused, timeout, ...).
    #[error("could not reach {method} {endpoint}")]
    Transport {
        method: &'static str,
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to read bitstream file {}", .path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0:#}")]
    Config(#[source] anyhow::Error),
}

impl Error {
    /// HTTP status code carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::HttpStatus { code, .. } => Some(*code),
            Error::Authentication { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Endpoint path the failing request was sent to, if any.
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Error::HttpStatus { endpoint, .. }
            | Error::MalformedResponse { endpoint, .. }
            | Error::Transport { endpoint, .. } => Some(endpoint),
            _ => None,
        }
    }
}

fn payload_suffix(payload: &Option<String>) -> String {
    match payload {
        Some(p) => format!(" (sent {})", p),
        None => String::new(),
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
