use std::fmt;

use serde_json::Value;
use shared::protocol::{DeclarativeUi, Method};
use url::Url;

/// An endpoint bound to runtime context, ready for the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRequest {
    pub method: Method,
    pub url: Url,
    pub body: Option<Value>,
}

impl fmt::Display for ResolvedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// What a finished button action asks the screen to do.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    /// The response carried a new screen that replaces the current one.
    Replace(DeclarativeUi),
    Notice(String),
    Completed,
}
