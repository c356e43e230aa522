use client_core::{
    action::resolve_link, ClientError, Notice, ResolveError, ScreenPhase, ScreenState,
};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::{
    domain::FileContext,
    protocol::{DeclarativeUi, ElementId, Endpoint},
};
use url::Url;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::{
    events::{UiError, UiErrorContext, UiEvent},
    orchestration::dispatch_backend_command,
    reducer::{apply_event, StatusUpdate},
};
use crate::ui::widgets::{close_button, render_arrangement, Interaction, RenderContext};

/// Where the screen comes from.
pub enum ScreenSource {
    Remote(Endpoint),
    Local(DeclarativeUi),
}

pub struct StartupConfig {
    pub source: ScreenSource,
    pub context: FileContext,
    /// Normalized server url, used to resolve relative links and images.
    pub base_url: Option<Url>,
    pub title: String,
}

pub struct DeclarativeUiApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    state: ScreenState,
    endpoint: Option<Endpoint>,
    context: FileContext,
    base_url: Option<Url>,
    title: String,
    status: String,
    banner: Option<String>,
}

impl DeclarativeUiApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        config: StartupConfig,
    ) -> Self {
        let (state, endpoint) = match config.source {
            ScreenSource::Remote(endpoint) => (ScreenState::new(), Some(endpoint)),
            ScreenSource::Local(document) => (ScreenState::showing(document), None),
        };
        let mut app = Self {
            cmd_tx,
            ui_rx,
            state,
            endpoint,
            context: config.context,
            base_url: config.base_url,
            title: config.title,
            status: String::new(),
            banner: None,
        };
        if app.endpoint.is_some() {
            app.reload();
        }
        app
    }

    fn reload(&mut self) {
        let Some(endpoint) = self.endpoint.clone() else {
            return;
        };
        let ticket = self.state.begin_load();
        self.status = "Loading screen...".to_string();
        let queued = dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::LoadScreen {
                ticket,
                endpoint,
                context: self.context.clone(),
            },
            &mut self.status,
        );
        if !queued {
            self.state
                .finish_load(ticket, Err(ClientError::Transport(self.status.clone())));
        }
    }

    fn retry(&mut self) {
        let Some(endpoint) = self.endpoint.clone() else {
            return;
        };
        let Some(ticket) = self.state.retry() else {
            return;
        };
        self.banner = None;
        self.status = "Retrying...".to_string();
        let queued = dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::LoadScreen {
                ticket,
                endpoint,
                context: self.context.clone(),
            },
            &mut self.status,
        );
        if !queued {
            self.state
                .finish_load(ticket, Err(ClientError::Transport(self.status.clone())));
        }
    }

    fn press(&mut self, id: ElementId) {
        let ticket = match self.state.begin_action(id) {
            Ok(ticket) => ticket,
            Err(rejected) => {
                tracing::debug!(element = %id, "press ignored: {rejected}");
                return;
            }
        };
        let queued = dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::RunAction {
                ticket: ticket.clone(),
                context: self.context.clone(),
            },
            &mut self.status,
        );
        if !queued {
            self.state
                .finish_action(&ticket, Err(ClientError::Transport(self.status.clone())));
        }
    }

    fn open_link(&mut self, ctx: &egui::Context, link: &str) {
        let target = match &self.base_url {
            Some(base) => resolve_link(base, link, &self.context).map(String::from),
            None => Url::parse(link)
                .map(String::from)
                .map_err(|err| ResolveError::invalid_url(link, err)),
        };
        match target {
            Ok(url) => {
                tracing::info!(%url, "opening link");
                ctx.open_url(egui::OpenUrl::new_tab(url));
            }
            Err(err) => {
                let err = UiError::from_message(UiErrorContext::OpenLink, err.to_string());
                self.apply(UiEvent::Error(err));
            }
        }
    }

    fn close(&mut self, ctx: &egui::Context) {
        tracing::info!("closing declarative screen");
        self.state.close();
        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            self.apply(event);
        }
    }

    fn apply(&mut self, event: UiEvent) {
        match apply_event(&mut self.state, event) {
            StatusUpdate::Unchanged => {}
            StatusUpdate::Status(status) => self.status = status,
            StatusUpdate::Banner(message) => {
                self.status = message.clone();
                self.banner = Some(message);
            }
        }
    }

    fn show_header(&mut self, ctx: &egui::Context) -> Vec<Interaction> {
        let mut interactions = Vec::new();
        egui::TopBottomPanel::top("screen_header").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new(&self.title).strong());
                if let Some(interaction) = close_button(ui) {
                    interactions.push(interaction);
                }
            });
        });
        interactions
    }

    fn show_status_banner(&mut self, ui: &mut egui::Ui) {
        if let Some(message) = self.banner.clone() {
            egui::Frame::NONE
                .fill(egui::Color32::from_rgb(111, 53, 53))
                .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgb(175, 96, 96)))
                .corner_radius(8.0)
                .inner_margin(egui::Margin::symmetric(10, 8))
                .show(ui, |ui| {
                    ui.horizontal_wrapped(|ui| {
                        ui.label(egui::RichText::new(&message).color(egui::Color32::WHITE));
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.button("Dismiss").clicked() {
                                self.banner = None;
                            }
                        });
                    });
                });
            ui.add_space(6.0);
        }
    }

    fn show_screen(&mut self, ctx: &egui::Context) -> Vec<Interaction> {
        let mut interactions = Vec::new();
        let mut retry_requested = false;
        let mut dismiss_notice = false;

        egui::CentralPanel::default().show(ctx, |ui| {
            self.show_status_banner(ui);
            match self.state.phase() {
                ScreenPhase::Idle => {
                    ui.weak("No screen requested");
                }
                ScreenPhase::Loading => {
                    ui.centered_and_justified(|ui| {
                        ui.spinner();
                    });
                }
                ScreenPhase::Failed(failure) => {
                    ui.vertical_centered(|ui| {
                        ui.add_space(24.0);
                        ui.colored_label(ui.visuals().error_fg_color, failure.message.as_str());
                        if failure.requires_reauth {
                            ui.weak(
                                "Update the username and app password in settings, then retry.",
                            );
                        }
                        if ui.button("Retry").clicked() {
                            retry_requested = true;
                        }
                    });
                }
                ScreenPhase::Ready(document) => {
                    if let Some(notice) = self.state.notice() {
                        dismiss_notice = show_notice(ui, notice);
                    }
                    let Some(arrangement) = self.state.arrangement() else {
                        return;
                    };
                    let render = RenderContext {
                        pending: self.state.pending(),
                        base_url: self.base_url.as_ref(),
                        file_context: &self.context,
                    };
                    egui::ScrollArea::both().show(ui, |ui| {
                        interactions = render_arrangement(ui, document, arrangement, &render);
                    });
                }
            }
        });

        if dismiss_notice {
            self.state.dismiss_notice();
        }
        if retry_requested {
            self.retry();
        }
        interactions
    }

    fn show_status_line(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_line").show(ctx, |ui| {
            ui.small(egui::RichText::new(&self.status).weak());
        });
    }
}

/// Returns true when the user dismissed the notice.
fn show_notice(ui: &mut egui::Ui, notice: &Notice) -> bool {
    let color = match notice {
        Notice::Info(_) => ui.visuals().hyperlink_color,
        Notice::Error(_) => ui.visuals().error_fg_color,
    };
    let mut dismissed = false;
    ui.horizontal_wrapped(|ui| {
        ui.label(egui::RichText::new(notice.text()).color(color));
        if ui.small_button("OK").clicked() {
            dismissed = true;
        }
    });
    ui.separator();
    dismissed
}

impl eframe::App for DeclarativeUiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        let mut interactions = self.show_header(ctx);
        self.show_status_line(ctx);
        interactions.extend(self.show_screen(ctx));

        for interaction in interactions {
            match interaction {
                Interaction::Pressed(id) => self.press(id),
                Interaction::OpenLink(link) => self.open_link(ctx, &link),
                Interaction::Close => self.close(ctx),
            }
        }

        if self.state.is_loading() || !self.state.pending().is_empty() {
            ctx.request_repaint_after(std::time::Duration::from_millis(16));
        } else {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }
}
