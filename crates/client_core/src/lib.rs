use serde_json::Value;
use shared::{
    domain::FileContext,
    protocol::{is_document, ocs_data, DeclarativeUi, Endpoint},
};
use tracing::{debug, info, warn};
use url::Url;

pub mod action;
pub mod config;
pub mod error;
pub mod screen;
pub mod transport;
pub mod types;

pub use config::{load_settings, normalize_base_url, ClientSettings};
pub use error::{ClientError, ResolveError};
pub use screen::{
    ActionRejected, ActionReport, ActionTicket, LoadTicket, Notice, ScreenFailure, ScreenPhase,
    ScreenSession, ScreenState,
};
pub use transport::{HttpTransport, ReqwestTransport};
pub use types::{ActionOutcome, HttpResponse, ResolvedRequest};

const ERROR_EXCERPT_CHARS: usize = 200;

/// Fetches declarative screens and runs their actions against one server.
pub struct DeclarativeUiClient<T: HttpTransport = ReqwestTransport> {
    base_url: Url,
    transport: T,
}

impl DeclarativeUiClient<ReqwestTransport> {
    pub fn from_settings(settings: &ClientSettings) -> Result<Self, ClientError> {
        let base_url = normalize_base_url(&settings.base_url)?;
        let transport = ReqwestTransport::new(settings)?;
        Ok(Self::new(base_url, transport))
    }
}

impl<T: HttpTransport> DeclarativeUiClient<T> {
    pub fn new(base_url: Url, transport: T) -> Self {
        Self {
            base_url,
            transport,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn load_screen(
        &self,
        endpoint: &Endpoint,
        ctx: &FileContext,
    ) -> Result<DeclarativeUi, ClientError> {
        let request = action::resolve_endpoint(&self.base_url, endpoint, ctx)?;
        info!(%request, "loading declarative screen");

        let body = self.execute_checked(&request).await?;
        let document = DeclarativeUi::from_json(&body)?;
        debug!(
            rows = document.root.rows.len(),
            orientation = ?document.root.orientation,
            "declarative screen decoded"
        );
        Ok(document)
    }

    pub async fn perform_action(
        &self,
        endpoint: &Endpoint,
        ctx: &FileContext,
    ) -> Result<ActionOutcome, ClientError> {
        let request = action::resolve_endpoint(&self.base_url, endpoint, ctx)?;
        info!(%request, "performing declared action");

        let body = self.execute_checked(&request).await?;
        interpret_action_body(&body)
    }

    pub fn link_target(&self, link: &str, ctx: &FileContext) -> Result<Url, ClientError> {
        Ok(action::resolve_link(&self.base_url, link, ctx)?)
    }

    async fn execute_checked(&self, request: &ResolvedRequest) -> Result<String, ClientError> {
        let response = self.transport.execute(request).await.map_err(|err| {
            warn!(%request, "request failed: {err}");
            err
        })?;
        if !response.is_success() {
            let message = error_message(&response.body);
            warn!(%request, status = response.status, %message, "server rejected request");
            return Err(ClientError::status(response.status, message));
        }
        Ok(response.body)
    }
}

/// Maps an action response body onto what the screen should do next.
pub fn interpret_action_body(body: &str) -> Result<ActionOutcome, ClientError> {
    if body.trim().is_empty() {
        return Ok(ActionOutcome::Completed);
    }
    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(_) => {
            debug!(bytes = body.len(), "action response is not json; treating as completed");
            return Ok(ActionOutcome::Completed);
        }
    };

    let data = ocs_data(value)?;
    if is_document(&data) {
        return Ok(ActionOutcome::Replace(DeclarativeUi::from_value(data)?));
    }
    match data.get("tooltip").and_then(Value::as_str) {
        Some(tooltip) if !tooltip.trim().is_empty() => {
            Ok(ActionOutcome::Notice(tooltip.to_string()))
        }
        _ => Ok(ActionOutcome::Completed),
    }
}

fn error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        let message = value
            .pointer("/ocs/meta/message")
            .or_else(|| value.get("message"))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|m| !m.is_empty());
        if let Some(message) = message {
            return message.to_string();
        }
    }

    let excerpt: String = body.trim().chars().take(ERROR_EXCERPT_CHARS).collect();
    if excerpt.is_empty() {
        "no response body".to_string()
    } else {
        excerpt
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
