//! Runtime bridge between UI command queue and backend event intake.

use std::{sync::Arc, thread};

use client_core::{ClientSettings, DeclarativeUiClient};
use crossbeam_channel::{Receiver, Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

/// Starts the worker thread. Each command runs as its own task so a slow action
/// never holds up a reload.
pub fn launch(cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>, settings: ClientSettings) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        let client = match DeclarativeUiClient::from_settings(&settings) {
            Ok(client) => Arc::new(client),
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_client_error(
                    UiErrorContext::BackendStartup,
                    &err,
                )));
                tracing::error!("failed to build declarative ui client: {err}");
                return;
            }
        };
        tracing::info!(base_url = %client.base_url(), "backend worker ready");

        runtime.block_on(async move {
            while let Ok(cmd) = cmd_rx.recv() {
                let client = Arc::clone(&client);
                let ui_tx = ui_tx.clone();
                match cmd {
                    BackendCommand::LoadScreen {
                        ticket,
                        endpoint,
                        context,
                    } => {
                        tokio::spawn(async move {
                            let event = match client.load_screen(&endpoint, &context).await {
                                Ok(document) => UiEvent::ScreenLoaded { ticket, document },
                                Err(error) => UiEvent::ScreenFailed { ticket, error },
                            };
                            send_event(&ui_tx, event);
                        });
                    }
                    BackendCommand::RunAction { ticket, context } => {
                        tokio::spawn(async move {
                            let event = match client
                                .perform_action(ticket.endpoint(), &context)
                                .await
                            {
                                Ok(outcome) => UiEvent::ActionFinished { ticket, outcome },
                                Err(error) => UiEvent::ActionFailed { ticket, error },
                            };
                            send_event(&ui_tx, event);
                        });
                    }
                }
            }
            tracing::info!("ui command queue closed; backend worker stopping");
        });
    });
}

fn send_event(ui_tx: &Sender<UiEvent>, event: UiEvent) {
    match ui_tx.try_send(event) {
        Ok(()) => {}
        Err(TrySendError::Full(_)) => {
            tracing::warn!("ui event queue is full; dropping backend result")
        }
        Err(TrySendError::Disconnected(_)) => {
            tracing::debug!("ui event receiver dropped; discarding backend result")
        }
    }
}
