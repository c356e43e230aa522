use super::*;
use serde_json::json;
use shared::domain::FileId;

fn base() -> Url {
    Url::parse("https://cloud.example.com/nextcloud").expect("base url")
}

fn ctx() -> FileContext {
    FileContext::for_file(FileId(42), "/Documents/Q3 report.md")
}

#[test]
fn get_params_become_sorted_query_pairs() {
    let endpoint = Endpoint::get("/ocs/v2.php/apps/assistant/api/v1/file/{fileId}")
        .with_param("path", "{filePath}")
        .with_param("format", "json");

    let request = resolve_endpoint(&base(), &endpoint, &ctx()).expect("resolve");

    assert_eq!(request.method, Method::Get);
    assert!(request.body.is_none());
    assert_eq!(
        request.url.as_str(),
        "https://cloud.example.com/nextcloud/ocs/v2.php/apps/assistant/api/v1/file/42?format=json&path=%2FDocuments%2FQ3+report.md"
    );
}

#[test]
fn post_params_become_json_body() {
    let endpoint = Endpoint::post("/ocs/v2.php/apps/assistant/api/v1/file/{fileId}/summarize")
        .with_param("fileId", "{fileId}")
        .with_param("filePath", "{filePath}");

    let request = resolve_endpoint(&base(), &endpoint, &ctx()).expect("resolve");

    assert_eq!(request.method, Method::Post);
    assert_eq!(request.url.query(), None);
    assert_eq!(
        request.body,
        Some(json!({ "fileId": "42", "filePath": "/Documents/Q3 report.md" }))
    );
    assert_eq!(
        request.to_string(),
        "POST https://cloud.example.com/nextcloud/ocs/v2.php/apps/assistant/api/v1/file/42/summarize"
    );
}

#[test]
fn file_path_in_url_is_encoded_as_one_segment() {
    let endpoint = Endpoint::get("/apps/files/meta/{filePath}");
    let request = resolve_endpoint(&base(), &endpoint, &ctx()).expect("resolve");
    assert_eq!(
        request.url.path(),
        "/nextcloud/apps/files/meta/%2FDocuments%2FQ3%20report.md"
    );
}

#[test]
fn escapes_already_in_the_template_are_kept() {
    let url = resolve_url(&base(), "/apps/files/My%20Docs/{fileId}", &ctx()).expect("resolve");
    assert_eq!(
        url.as_str(),
        "https://cloud.example.com/nextcloud/apps/files/My%20Docs/42"
    );

    let ctx = FileContext::default().with_file_path("50% off");
    let url = resolve_url(&base(), "/apps/files/{filePath}", &ctx).expect("percent value");
    assert_eq!(url.path(), "/nextcloud/apps/files/50%25%20off");
}

#[test]
fn dot_segment_values_do_not_walk_the_path() {
    for value in ["..", "."] {
        let ctx = FileContext::default()
            .with_file_id(FileId(1))
            .with_file_path(value);
        let err = resolve_url(&base(), "/apps/files/{filePath}/x", &ctx).expect_err(value);
        assert!(matches!(err, ResolveError::InvalidUrl { .. }), "{value}: {err:?}");
    }

    let ctx = FileContext::default().with_file_path("..hidden");
    let url = resolve_url(&base(), "/apps/files/{filePath}/x", &ctx).expect("dotted name");
    assert_eq!(url.path(), "/nextcloud/apps/files/..hidden/x");
}

#[test]
fn missing_context_value_is_an_error() {
    let endpoint = Endpoint::post("/x/{fileId}");
    let err = resolve_endpoint(&base(), &endpoint, &FileContext::default()).expect_err("no id");
    assert_eq!(err, ResolveError::MissingContext("fileId".to_string()));
    assert!(err.to_string().contains("{fileId}"));
}

#[test]
fn unknown_placeholders_are_left_verbatim() {
    assert_eq!(
        substitute("{userId}-{fileId}", &ctx()).expect("substitute"),
        "{userId}-42"
    );
    assert_eq!(substitute("{{fileId}}", &ctx()).expect("nested"), "{42}");
    assert_eq!(substitute("open {brace", &ctx()).expect("unclosed"), "open {brace");
}

#[test]
fn absolute_template_ignores_base() {
    let endpoint = Endpoint::get("https://reports.example.org/render/{fileId}?v=2");
    let request = resolve_endpoint(&base(), &endpoint, &ctx()).expect("resolve");
    assert_eq!(
        request.url.as_str(),
        "https://reports.example.org/render/42?v=2"
    );
}

#[test]
fn template_query_values_are_substituted() {
    let endpoint =
        Endpoint::get("/index.php/apps/viewer?file={filePath}").with_param("id", "{fileId}");
    let request = resolve_endpoint(&base(), &endpoint, &ctx()).expect("resolve");
    let pairs: Vec<(String, String)> = request
        .url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("file".to_string(), "/Documents/Q3 report.md".to_string()),
            ("id".to_string(), "42".to_string()),
        ]
    );
}

#[test]
fn base_with_trailing_slash_does_not_double_slash() {
    let base = Url::parse("https://cloud.example.com/").expect("base");
    let url = resolve_url(&base, "/apps/analytics/", &ctx()).expect("resolve");
    assert_eq!(url.as_str(), "https://cloud.example.com/apps/analytics/");
}

#[test]
fn relative_link_is_appended_to_base() {
    let url = resolve_link(&base(), "/apps/analytics/report/{fileId}", &ctx()).expect("link");
    assert_eq!(
        url.as_str(),
        "https://cloud.example.com/nextcloud/apps/analytics/report/42"
    );
}

#[test]
fn absolute_and_non_http_links_pass_through() {
    let url = resolve_link(&base(), "https://nextcloud.com", &ctx()).expect("absolute");
    assert_eq!(url.as_str(), "https://nextcloud.com/");

    let url = resolve_link(&base(), "mailto:support@example.com?subject={fileId}", &ctx())
        .expect("mailto");
    assert_eq!(url.scheme(), "mailto");
    assert!(url.as_str().ends_with("subject=42"));
}
