//! Fetch-then-render lifecycle of one declarative screen.
//!
//! [`ScreenState`] is synchronous and owns every transition, so hosts with their own
//! event loop (the GUI) can drive it from messages. [`ScreenSession`] wires it to a
//! [`DeclarativeUiClient`] for hosts that can simply await.
//!
//! Every load bumps a generation counter; load and action results carry the generation
//! they were started under and are dropped when it no longer matches.

use std::{collections::BTreeSet, sync::Arc};

use shared::{
    domain::FileContext,
    layout::{arrange, Arrangement},
    protocol::{DeclarativeUi, ElementId, Endpoint},
};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{
    error::ClientError, transport::HttpTransport, types::ActionOutcome, DeclarativeUiClient,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenFailure {
    pub message: String,
    pub retryable: bool,
    pub requires_reauth: bool,
}

impl From<&ClientError> for ScreenFailure {
    fn from(err: &ClientError) -> Self {
        Self {
            message: err.to_string(),
            retryable: err.is_retryable(),
            requires_reauth: err.is_auth(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum ScreenPhase {
    #[default]
    Idle,
    Loading,
    Ready(DeclarativeUi),
    Failed(ScreenFailure),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
}

impl Notice {
    pub fn text(&self) -> &str {
        match self {
            Notice::Info(text) | Notice::Error(text) => text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionTicket {
    generation: u64,
    element: ElementId,
    endpoint: Endpoint,
}

impl ActionTicket {
    pub fn element(&self) -> ElementId {
        self.element
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ActionRejected {
    #[error("screen is closed")]
    Closed,
    #[error("screen is not showing a document")]
    NotReady,
    #[error("no element at {0}")]
    UnknownElement(ElementId),
    #[error("element {0} has no action")]
    NoAction(ElementId),
    #[error("element {0} already has an action in flight")]
    AlreadyPending(ElementId),
}

#[derive(Debug, Clone, Default)]
pub struct ScreenState {
    phase: ScreenPhase,
    generation: u64,
    arrangement: Option<Arrangement>,
    pending: BTreeSet<ElementId>,
    notice: Option<Notice>,
    closed: bool,
}

impl ScreenState {
    pub fn new() -> Self {
        Self::default()
    }

    /// A state already showing `document`, for hosts that render a local screen.
    pub fn showing(document: DeclarativeUi) -> Self {
        let mut state = Self::new();
        state.show(document);
        state
    }

    pub fn phase(&self) -> &ScreenPhase {
        &self.phase
    }

    pub fn document(&self) -> Option<&DeclarativeUi> {
        match &self.phase {
            ScreenPhase::Ready(document) => Some(document),
            _ => None,
        }
    }

    pub fn arrangement(&self) -> Option<&Arrangement> {
        self.arrangement.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, ScreenPhase::Loading)
    }

    pub fn pending(&self) -> &BTreeSet<ElementId> {
        &self.pending
    }

    pub fn is_pending(&self, id: ElementId) -> bool {
        self.pending.contains(&id)
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.phase = ScreenPhase::Loading;
        self.arrangement = None;
        self.pending.clear();
        self.notice = None;
        debug!(generation = self.generation, "screen load started");
        LoadTicket {
            generation: self.generation,
        }
    }

    /// Applies a load result. Returns false when the result was dropped as stale.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<DeclarativeUi, ClientError>,
    ) -> bool {
        if self.closed || ticket.generation != self.generation || !self.is_loading() {
            debug!(
                ticket = ticket.generation,
                current = self.generation,
                "dropping stale screen load result"
            );
            return false;
        }

        match result {
            Ok(document) => {
                info!(generation = self.generation, "screen ready");
                self.show(document);
            }
            Err(err) => {
                warn!(generation = self.generation, "screen load failed: {err}");
                self.phase = ScreenPhase::Failed(ScreenFailure::from(&err));
            }
        }
        true
    }

    pub fn begin_action(&mut self, id: ElementId) -> Result<ActionTicket, ActionRejected> {
        if self.closed {
            return Err(ActionRejected::Closed);
        }
        let ScreenPhase::Ready(document) = &self.phase else {
            return Err(ActionRejected::NotReady);
        };
        let element = document
            .element(id)
            .ok_or(ActionRejected::UnknownElement(id))?;
        let endpoint = element
            .endpoint()
            .ok_or(ActionRejected::NoAction(id))?
            .clone();
        if !self.pending.insert(id) {
            return Err(ActionRejected::AlreadyPending(id));
        }

        debug!(element = %id, "action started");
        Ok(ActionTicket {
            generation: self.generation,
            element: id,
            endpoint,
        })
    }

    /// Applies an action result. Returns false when the result was dropped as stale.
    pub fn finish_action(
        &mut self,
        ticket: &ActionTicket,
        result: Result<ActionOutcome, ClientError>,
    ) -> bool {
        if self.closed || ticket.generation != self.generation {
            debug!(element = %ticket.element, "dropping stale action result");
            return false;
        }
        self.pending.remove(&ticket.element);

        match result {
            Ok(ActionOutcome::Replace(document)) => {
                info!(element = %ticket.element, "action replaced the screen");
                self.generation += 1;
                self.pending.clear();
                self.show(document);
            }
            Ok(ActionOutcome::Notice(text)) => {
                self.notice = Some(Notice::Info(text));
            }
            Ok(ActionOutcome::Completed) => {
                debug!(element = %ticket.element, "action completed");
            }
            Err(err) => {
                warn!(element = %ticket.element, "action failed: {err}");
                self.notice = Some(Notice::Error(format!("Action failed: {err}")));
            }
        }
        true
    }

    pub fn retry(&mut self) -> Option<LoadTicket> {
        if self.closed || !matches!(self.phase, ScreenPhase::Failed(_)) {
            return None;
        }
        Some(self.begin_load())
    }

    pub fn close(&mut self) {
        self.closed = true;
        self.pending.clear();
    }

    fn show(&mut self, document: DeclarativeUi) {
        self.arrangement = Some(arrange(&document.root));
        self.notice = document.tooltip.clone().map(Notice::Info);
        self.phase = ScreenPhase::Ready(document);
    }
}

/// Result of pressing an element through a [`ScreenSession`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionReport {
    Replaced,
    Notice(String),
    Completed,
    Failed(String),
    /// The screen moved on (reload, replace or close) before the action finished.
    Stale,
}

pub struct ScreenSession<T: HttpTransport> {
    client: Arc<DeclarativeUiClient<T>>,
    endpoint: Endpoint,
    context: FileContext,
    state: Mutex<ScreenState>,
}

impl<T: HttpTransport> ScreenSession<T> {
    pub fn new(
        client: Arc<DeclarativeUiClient<T>>,
        endpoint: Endpoint,
        context: FileContext,
    ) -> Self {
        Self {
            client,
            endpoint,
            context,
            state: Mutex::new(ScreenState::new()),
        }
    }

    pub fn context(&self) -> &FileContext {
        &self.context
    }

    /// Loads (or reloads) the screen and returns the phase it settled in.
    pub async fn load(&self) -> ScreenPhase {
        let ticket = self.state.lock().await.begin_load();
        self.run_load(ticket).await
    }

    pub async fn retry(&self) -> Option<ScreenPhase> {
        let ticket = self.state.lock().await.retry()?;
        Some(self.run_load(ticket).await)
    }

    pub async fn press(&self, id: ElementId) -> Result<ActionReport, ActionRejected> {
        let ticket = self.state.lock().await.begin_action(id)?;
        let result = self
            .client
            .perform_action(ticket.endpoint(), &self.context)
            .await;

        let report = match &result {
            Ok(ActionOutcome::Replace(_)) => ActionReport::Replaced,
            Ok(ActionOutcome::Notice(text)) => ActionReport::Notice(text.clone()),
            Ok(ActionOutcome::Completed) => ActionReport::Completed,
            Err(err) => ActionReport::Failed(err.to_string()),
        };
        let applied = self.state.lock().await.finish_action(&ticket, result);
        Ok(if applied { report } else { ActionReport::Stale })
    }

    pub async fn close(&self) {
        self.state.lock().await.close();
    }

    pub async fn snapshot(&self) -> ScreenState {
        self.state.lock().await.clone()
    }

    async fn run_load(&self, ticket: LoadTicket) -> ScreenPhase {
        let result = self.client.load_screen(&self.endpoint, &self.context).await;
        let mut state = self.state.lock().await;
        state.finish_load(ticket, result);
        state.phase().clone()
    }
}

#[cfg(test)]
#[path = "tests/screen_tests.rs"]
mod tests;
