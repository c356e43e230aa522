use super::*;
use serde_json::json;

const SCREEN: &str = r#"{
  "version": 0.1,
  "root": {
    "orientation": "vertical",
    "rows": [
      { "children": [
          { "Button": { "label": "Summarize", "type": "primary",
                        "endpoint": { "method": "post", "url": "/ocs/v2.php/apps/assistant/api/v1/file/{fileId}",
                                      "params": { "path": "{filePath}", "limit": 5, "verbose": true } } } },
          { "Text": { "text": "Pick an action" } }
      ] },
      { "children": [ { "URL": { "text": "Open report", "url": "/apps/analytics/report/{fileId}" } } ] }
    ]
  }
}"#;

#[test]
fn decodes_heterogeneous_elements_in_order() {
    let ui = DeclarativeUi::from_json(SCREEN).expect("decode");
    assert_eq!(ui.root.orientation, Orientation::Vertical);
    assert_eq!(ui.root.rows.len(), 2);

    let kinds: Vec<_> = ui.elements().map(|(_, e)| e.kind().to_string()).collect();
    assert_eq!(kinds, ["Button", "Text", "URL"]);

    let Some(Element::Button(button)) = ui.element(ElementId::new(0, 0)) else {
        panic!("expected button");
    };
    assert_eq!(button.label, "Summarize");
    assert_eq!(button.button_type, ButtonType::Primary);
    let endpoint = button.endpoint.as_ref().expect("endpoint");
    assert_eq!(endpoint.method, Method::Post);
    assert_eq!(endpoint.params.get("limit").map(String::as_str), Some("5"));
    assert_eq!(endpoint.params.get("verbose").map(String::as_str), Some("true"));
}

#[test]
fn unknown_element_kind_is_kept_but_unsupported() {
    let raw = json!({
        "root": { "rows": [ { "children": [ { "Slider": { "min": 0 } }, { "Text": { "text": "x" } } ] } ] }
    });
    let ui = DeclarativeUi::from_value(raw).expect("decode");
    let first = ui.element(ElementId::new(0, 0)).expect("first");
    assert_eq!(first.kind(), "Slider");
    assert!(!first.is_supported());
    assert!(ui.element(ElementId::new(0, 1)).expect("second").is_supported());
}

#[test]
fn element_with_two_kind_keys_is_rejected() {
    let raw = json!({
        "root": { "rows": [ { "children": [ { "Button": { "label": "a" }, "Image": { "url": "/x.png" } } ] } ] }
    });
    let err = DeclarativeUi::from_value(raw).expect_err("ambiguous element");
    assert!(err.to_string().contains("exactly one kind"), "{err}");
}

#[test]
fn missing_orientation_and_rows_fall_back_to_defaults() {
    let ui = DeclarativeUi::from_json(r#"{"root": {}}"#).expect("decode");
    assert_eq!(ui.root.orientation, Orientation::Vertical);
    assert!(ui.root.rows.is_empty());
    assert!(ui.is_empty());
    assert_eq!(ui.version, 0.1);
}

#[test]
fn orientation_accepts_uppercase_spelling() {
    let ui = DeclarativeUi::from_json(r#"{"root": {"orientation": "HORIZONTAL", "rows": null}}"#)
        .expect("decode");
    assert_eq!(ui.root.orientation, Orientation::Horizontal);
}

#[test]
fn unsupported_method_fails_decoding() {
    let raw = json!({
        "root": { "rows": [ { "children": [
            { "Button": { "label": "Drop", "endpoint": { "method": "DELETE", "url": "/x" } } }
        ] } ] }
    });
    let err = DeclarativeUi::from_value(raw).expect_err("delete is not supported");
    assert!(err.to_string().contains("DELETE"), "{err}");
}

#[test]
fn nested_param_values_are_rejected() {
    let raw = json!({
        "root": { "rows": [ { "children": [
            { "Button": { "label": "Go", "endpoint": { "url": "/x", "params": { "a": { "b": 1 } } } } }
        ] } ] }
    });
    assert!(DeclarativeUi::from_value(raw).is_err());
}

#[test]
fn button_action_alias_and_unknown_type_are_accepted() {
    let raw = json!({
        "root": { "rows": [ { "children": [
            { "button": { "label": 7, "type": "Danger", "action": { "url": "/x" } } }
        ] } ] }
    });
    let ui = DeclarativeUi::from_value(raw).expect("decode");
    let Some(Element::Button(button)) = ui.element(ElementId::new(0, 0)) else {
        panic!("expected button");
    };
    assert_eq!(button.label, "7");
    assert_eq!(button.button_type, ButtonType::Other("Danger".to_string()));
    assert_eq!(button.endpoint.as_ref().map(|e| e.method), Some(Method::Get));
}

#[test]
fn unwraps_ocs_envelope() {
    let raw = json!({
        "ocs": {
            "meta": { "status": "ok", "statuscode": 200, "message": "OK" },
            "data": { "version": 0.1, "root": { "orientation": "horizontal", "rows": [] } }
        }
    });
    let ui = DeclarativeUi::from_value(raw).expect("decode");
    assert_eq!(ui.root.orientation, Orientation::Horizontal);
}

#[test]
fn failed_ocs_meta_is_reported() {
    let raw = json!({
        "ocs": { "meta": { "status": "failure", "statuscode": 404, "message": "No such file" }, "data": [] }
    });
    match DeclarativeUi::from_value(raw) {
        Err(DocumentError::OcsFailure {
            statuscode,
            message,
        }) => {
            assert_eq!(statuscode, 404);
            assert_eq!(message, "No such file");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn newer_major_version_still_decodes() {
    let ui = DeclarativeUi::from_json(r#"{"version": 2.0, "root": {"rows": []}}"#).expect("decode");
    assert_eq!(ui.major_version(), 2);
}

#[test]
fn serializes_elements_with_kind_tag() {
    let ui = crate::samples::preview_vertical();
    let value = serde_json::to_value(&ui).expect("serialize");
    assert_eq!(value["root"]["rows"][0]["children"][0]["Button"]["label"], "Click");
    assert_eq!(value["root"]["rows"][2]["children"][0]["URL"]["text"], "Analytics report created");
    let reparsed = DeclarativeUi::from_value(value).expect("reparse");
    assert_eq!(reparsed, ui);
}

#[test]
fn interactive_elements_are_links_and_buttons_with_endpoints() {
    let ui = DeclarativeUi::from_json(SCREEN).expect("decode");
    let interactive: Vec<_> = ui
        .elements()
        .filter(|(_, e)| e.is_interactive())
        .map(|(id, _)| id)
        .collect();
    assert_eq!(interactive, [ElementId::new(0, 0), ElementId::new(1, 0)]);
    assert!(crate::samples::preview_vertical()
        .elements()
        .all(|(_, e)| e.endpoint().is_none()));
}

#[test]
fn decodes_image_with_and_without_alt() {
    let raw = json!({
        "root": { "rows": [ { "children": [
            { "Image": { "url": "/core/preview?fileId=1", "alt": "Preview" } },
            { "image": { "url": "https://example.com/a.png" } }
        ] } ] }
    });
    let ui = DeclarativeUi::from_value(raw).expect("decode");

    let first = ui.element(ElementId::new(0, 0)).expect("first");
    assert_eq!(
        first,
        &Element::Image(Image {
            url: "/core/preview?fileId=1".into(),
            alt: Some("Preview".into()),
        })
    );
    let second = ui.element(ElementId::new(0, 1)).expect("second");
    assert_eq!(
        second,
        &Element::Image(Image {
            url: "https://example.com/a.png".into(),
            alt: None,
        })
    );
    assert!(!first.is_interactive());
    assert!(!second.is_interactive());
    assert_eq!(first.kind(), "Image");
}
