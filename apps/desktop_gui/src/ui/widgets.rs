//! Maps an arranged declarative screen onto egui widgets.

use std::collections::BTreeSet;

use client_core::{action::resolve_link, ResolveError};
use eframe::egui;
use shared::{
    domain::FileContext,
    layout::{Arrangement, Axis},
    protocol::{Button, ButtonType, DeclarativeUi, Element, ElementId, Image},
};
use url::Url;

const IMAGE_MAX_HEIGHT: f32 = 240.0;

/// Something the user did this frame that the app has to act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interaction {
    Pressed(ElementId),
    OpenLink(String),
    Close,
}

pub struct RenderContext<'a> {
    pub pending: &'a BTreeSet<ElementId>,
    /// Used to resolve relative image sources.
    pub base_url: Option<&'a Url>,
    pub file_context: &'a FileContext,
}

pub fn render_arrangement(
    ui: &mut egui::Ui,
    document: &DeclarativeUi,
    arrangement: &Arrangement,
    render: &RenderContext<'_>,
) -> Vec<Interaction> {
    let mut interactions = Vec::new();
    if arrangement.is_empty() {
        ui.weak("Nothing to show");
        return interactions;
    }

    along(ui, arrangement.outer, |ui| {
        for line in &arrangement.lines {
            along(ui, line.axis, |ui| {
                for cell in &line.cells {
                    if let Some(element) = document.element(cell.id) {
                        if let Some(interaction) = render_element(ui, cell.id, element, render) {
                            interactions.push(interaction);
                        }
                    }
                }
            });
        }
    });
    interactions
}

pub fn close_button(ui: &mut egui::Ui) -> Option<Interaction> {
    let mut interaction = None;
    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
        if ui
            .add(egui::Button::new("✕").frame(false))
            .on_hover_text("Close")
            .clicked()
        {
            interaction = Some(Interaction::Close);
        }
    });
    interaction
}

fn along<R>(ui: &mut egui::Ui, axis: Axis, add_contents: impl FnOnce(&mut egui::Ui) -> R) -> R {
    match axis {
        Axis::Horizontal => ui.horizontal_wrapped(add_contents).inner,
        Axis::Vertical => ui.vertical(add_contents).inner,
    }
}

fn render_element(
    ui: &mut egui::Ui,
    id: ElementId,
    element: &Element,
    render: &RenderContext<'_>,
) -> Option<Interaction> {
    match element {
        Element::Button(button) => render_button(ui, id, button, render.pending.contains(&id)),
        Element::Text(text) => {
            ui.label(text.text.as_str());
            None
        }
        Element::Url(link) => ui
            .link(link.text.as_str())
            .on_hover_text(link.url.as_str())
            .clicked()
            .then(|| Interaction::OpenLink(link.url.clone())),
        Element::Image(image) => {
            render_image(ui, image, render);
            None
        }
        Element::Unsupported { .. } => None,
    }
}

fn render_button(
    ui: &mut egui::Ui,
    id: ElementId,
    button: &Button,
    pending: bool,
) -> Option<Interaction> {
    let mut widget = egui::Button::new(button.label.as_str());
    match button.button_type {
        ButtonType::Primary => widget = widget.fill(ui.visuals().selection.bg_fill),
        ButtonType::Tertiary => widget = widget.frame(false),
        ButtonType::Secondary | ButtonType::Other(_) => {}
    }

    let response = ui.add_enabled(button_enabled(button, pending), widget);
    if pending {
        ui.spinner();
    }
    response.clicked().then_some(Interaction::Pressed(id))
}

fn button_enabled(button: &Button, pending: bool) -> bool {
    button.endpoint.is_some() && !pending
}

fn render_image(ui: &mut egui::Ui, image: &Image, render: &RenderContext<'_>) {
    let source = match render.base_url {
        Some(base) => resolve_link(base, &image.url, render.file_context).map(String::from),
        None => Url::parse(&image.url)
            .map(String::from)
            .map_err(|err| ResolveError::invalid_url(image.url.as_str(), err)),
    };
    let alt = image.alt.as_deref().unwrap_or(&image.url);

    match source {
        Ok(uri) => {
            ui.add(egui::Image::new(uri).max_height(IMAGE_MAX_HEIGHT))
                .on_hover_text(alt);
        }
        Err(err) => {
            tracing::debug!(url = %image.url, "image source not resolvable: {err}");
            ui.weak(format!("[{alt}]"));
        }
    }
}
