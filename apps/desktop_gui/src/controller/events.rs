//! UI/backend events and error modeling for desktop GUI controller.

use client_core::{ActionOutcome, ActionTicket, ClientError, LoadTicket, ResolveError};
use shared::protocol::DeclarativeUi;

pub enum UiEvent {
    Error(UiError),
    ScreenLoaded {
        ticket: LoadTicket,
        document: DeclarativeUi,
    },
    ScreenFailed {
        ticket: LoadTicket,
        error: ClientError,
    },
    ActionFinished {
        ticket: ActionTicket,
        outcome: ActionOutcome,
    },
    ActionFailed {
        ticket: ActionTicket,
        error: ClientError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Auth,
    Transport,
    Validation,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    LoadScreen,
    RunAction,
    OpenLink,
}

pub fn err_label(category: UiErrorCategory) -> &'static str {
    match category {
        UiErrorCategory::Auth => "Authentication",
        UiErrorCategory::Transport => "Network",
        UiErrorCategory::Validation => "Validation",
        UiErrorCategory::Unknown => "Unexpected",
    }
}

pub fn classify_load_failure(message: &str) -> String {
    let lower = message.to_ascii_lowercase();
    if lower.contains("backend worker startup failure")
        || lower.contains("invalid client settings")
    {
        "Backend worker startup failure; check the configured server url and relaunch.".to_string()
    } else if lower.contains("failed to connect")
        || lower.contains("connection refused")
        || lower.contains("dns")
        || lower.contains("timed out")
    {
        "Server unreachable; check URL/network and retry.".to_string()
    } else {
        format!("Could not load screen: {message}")
    }
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("401")
            || message_lower.contains("403")
            || message_lower.contains("unauthorized")
            || message_lower.contains("forbidden")
            || message_lower.contains("invalid credential")
        {
            UiErrorCategory::Auth
        } else if message_lower.contains("invalid")
            || message_lower.contains("missing")
            || message_lower.contains("malformed")
            || message_lower.contains("unsupported")
        {
            UiErrorCategory::Validation
        } else if message_lower.contains("timeout")
            || message_lower.contains("timed out")
            || message_lower.contains("connection")
            || message_lower.contains("network")
            || message_lower.contains("transport")
            || message_lower.contains("unavailable")
            || message_lower.contains("disconnect")
        {
            UiErrorCategory::Transport
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    /// Classifies from the error's structure rather than its text.
    pub fn from_client_error(context: UiErrorContext, err: &ClientError) -> Self {
        let category = if err.is_auth() {
            UiErrorCategory::Auth
        } else if err.is_retryable() {
            UiErrorCategory::Transport
        } else {
            match err {
                ClientError::Resolve(ResolveError::MissingContext(_))
                | ClientError::Resolve(ResolveError::InvalidUrl { .. })
                | ClientError::Document(_)
                | ClientError::InvalidSettings(_) => UiErrorCategory::Validation,
                _ => UiErrorCategory::Unknown,
            }
        };

        Self {
            category,
            context,
            message: err.to_string(),
        }
    }

    pub fn requires_reauth(&self) -> bool {
        self.category == UiErrorCategory::Auth
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
