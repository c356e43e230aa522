//! Backend commands queued from UI to backend worker.

use client_core::{ActionTicket, LoadTicket};
use shared::{domain::FileContext, protocol::Endpoint};

pub enum BackendCommand {
    LoadScreen {
        ticket: LoadTicket,
        endpoint: Endpoint,
        context: FileContext,
    },
    /// The ticket carries the element and the endpoint it declared.
    RunAction {
        ticket: ActionTicket,
        context: FileContext,
    },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::LoadScreen { .. } => "load_screen",
            BackendCommand::RunAction { .. } => "run_action",
        }
    }
}
