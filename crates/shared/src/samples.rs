//! Reference screens for previews and tests.

use crate::protocol::{
    Button, ButtonType, DeclarativeUi, Element, Layout, Link, Orientation, Row, Text,
};

fn button(label: &str) -> Element {
    Element::Button(Button {
        label: label.to_string(),
        button_type: ButtonType::Primary,
        endpoint: None,
    })
}

fn preview_rows() -> Vec<Row> {
    vec![
        Row {
            children: vec![
                button("Click"),
                Element::Text(Text {
                    text: "123".to_string(),
                }),
            ],
        },
        Row {
            children: vec![button("Click2")],
        },
        Row {
            children: vec![Element::Url(Link {
                text: "Analytics report created".to_string(),
                url: "https://nextcloud.com".to_string(),
            })],
        },
    ]
}

pub fn preview_vertical() -> DeclarativeUi {
    DeclarativeUi::new(Layout {
        orientation: Orientation::Vertical,
        rows: preview_rows(),
    })
}

pub fn preview_horizontal() -> DeclarativeUi {
    DeclarativeUi::new(Layout {
        orientation: Orientation::Horizontal,
        rows: preview_rows(),
    })
}

pub fn preview_empty() -> DeclarativeUi {
    DeclarativeUi::new(Layout {
        orientation: Orientation::Horizontal,
        rows: Vec::new(),
    })
}

pub fn by_name(name: &str) -> Option<DeclarativeUi> {
    match name.to_ascii_lowercase().as_str() {
        "vertical" => Some(preview_vertical()),
        "horizontal" => Some(preview_horizontal()),
        "empty" => Some(preview_empty()),
        _ => None,
    }
}
