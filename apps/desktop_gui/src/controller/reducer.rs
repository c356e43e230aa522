//! Applies backend events to the screen state and decides what the status line says.

use client_core::{ActionOutcome, ScreenState};

use crate::controller::events::{classify_load_failure, err_label, UiError, UiErrorContext, UiEvent};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusUpdate {
    Unchanged,
    Status(String),
    /// Also raised as a banner until dismissed.
    Banner(String),
}

pub fn apply_event(state: &mut ScreenState, event: UiEvent) -> StatusUpdate {
    match event {
        UiEvent::Error(err) => error_status(&err),
        UiEvent::ScreenLoaded { ticket, document } => {
            if state.finish_load(ticket, Ok(document)) {
                StatusUpdate::Status("Screen ready".to_string())
            } else {
                StatusUpdate::Unchanged
            }
        }
        UiEvent::ScreenFailed { ticket, error } => {
            let err = UiError::from_client_error(UiErrorContext::LoadScreen, &error);
            if state.finish_load(ticket, Err(error)) {
                error_status(&err)
            } else {
                StatusUpdate::Unchanged
            }
        }
        UiEvent::ActionFinished { ticket, outcome } => {
            let status = match &outcome {
                ActionOutcome::Replace(_) => "Screen updated",
                ActionOutcome::Notice(_) | ActionOutcome::Completed => "Action completed",
            };
            if state.finish_action(&ticket, Ok(outcome)) {
                StatusUpdate::Status(status.to_string())
            } else {
                StatusUpdate::Unchanged
            }
        }
        UiEvent::ActionFailed { ticket, error } => {
            let err = UiError::from_client_error(UiErrorContext::RunAction, &error);
            if state.finish_action(&ticket, Err(error)) {
                error_status(&err)
            } else {
                StatusUpdate::Unchanged
            }
        }
    }
}

fn error_status(err: &UiError) -> StatusUpdate {
    if err.requires_reauth() {
        return StatusUpdate::Banner(format!(
            "Authentication error: {}. Check the username and app password in settings.",
            err.message()
        ));
    }
    match err.context() {
        UiErrorContext::BackendStartup | UiErrorContext::LoadScreen => {
            StatusUpdate::Banner(classify_load_failure(err.message()))
        }
        UiErrorContext::RunAction | UiErrorContext::OpenLink => {
            StatusUpdate::Status(format!("{} error: {}", err_label(err.category()), err.message()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use client_core::{ClientError, Notice, ScreenPhase};
    use shared::{
        protocol::{Button, ButtonType, DeclarativeUi, Element, ElementId, Endpoint, Layout, Row},
        samples,
    };

    fn screen_with_action() -> DeclarativeUi {
        DeclarativeUi::new(Layout {
            rows: vec![Row {
                children: vec![Element::Button(Button {
                    label: "Create report".into(),
                    button_type: ButtonType::Primary,
                    endpoint: Some(Endpoint::post("/report/{fileId}")),
                })],
            }],
            ..Layout::default()
        })
    }

    #[test]
    fn loaded_screen_becomes_ready() {
        let mut state = ScreenState::new();
        let ticket = state.begin_load();
        let update = apply_event(
            &mut state,
            UiEvent::ScreenLoaded {
                ticket,
                document: samples::preview_vertical(),
            },
        );
        assert_eq!(update, StatusUpdate::Status("Screen ready".into()));
        assert!(matches!(state.phase(), ScreenPhase::Ready(_)));
    }

    #[test]
    fn stale_load_leaves_status_alone() {
        let mut state = ScreenState::new();
        let stale = state.begin_load();
        let _current = state.begin_load();
        let update = apply_event(
            &mut state,
            UiEvent::ScreenFailed {
                ticket: stale,
                error: ClientError::Timeout,
            },
        );
        assert_eq!(update, StatusUpdate::Unchanged);
        assert!(state.is_loading());
    }

    #[test]
    fn unreachable_server_raises_banner() {
        let mut state = ScreenState::new();
        let ticket = state.begin_load();
        let update = apply_event(
            &mut state,
            UiEvent::ScreenFailed {
                ticket,
                error: ClientError::Timeout,
            },
        );
        assert_eq!(
            update,
            StatusUpdate::Banner("Server unreachable; check URL/network and retry.".into())
        );
        assert!(matches!(state.phase(), ScreenPhase::Failed(failure) if failure.retryable));
    }

    #[test]
    fn action_results_update_notice_and_status() {
        let mut state = ScreenState::showing(screen_with_action());
        let button = ElementId::new(0, 0);

        let ticket = state.begin_action(button).expect("press");
        let update = apply_event(
            &mut state,
            UiEvent::ActionFinished {
                ticket,
                outcome: ActionOutcome::Notice("Report queued".into()),
            },
        );
        assert_eq!(update, StatusUpdate::Status("Action completed".into()));
        assert_eq!(state.notice(), Some(&Notice::Info("Report queued".into())));

        let ticket = state.begin_action(button).expect("press again");
        let update = apply_event(
            &mut state,
            UiEvent::ActionFailed {
                ticket,
                error: ClientError::status(403, "Forbidden"),
            },
        );
        assert!(
            matches!(update, StatusUpdate::Banner(text) if text.starts_with("Authentication error"))
        );
        assert!(!state.is_pending(button));
    }

    #[test]
    fn bad_link_only_touches_the_status_line() {
        let mut state = ScreenState::showing(screen_with_action());
        let err = UiError::from_message(UiErrorContext::OpenLink, "invalid url `::`");
        let update = apply_event(&mut state, UiEvent::Error(err));
        assert!(matches!(update, StatusUpdate::Status(text) if text.ends_with("invalid url `::`")));
        assert!(state.document().is_some());
    }
}
