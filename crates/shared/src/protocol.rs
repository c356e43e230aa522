use std::{collections::BTreeMap, fmt, str::FromStr};

use serde::{
    de::Error as _,
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};
use serde_json::Value;

use crate::error::DocumentError;

/// Highest document major version this client knows how to interpret.
pub const SUPPORTED_MAJOR_VERSION: u32 = 0;

fn default_version() -> f64 {
    0.1
}

/// A complete server-described screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeclarativeUi {
    #[serde(default = "default_version")]
    pub version: f64,
    pub root: Layout,
    /// Short message the host may surface alongside the screen.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooltip: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    #[serde(default)]
    pub orientation: Orientation,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rows: Vec<Row>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    #[default]
    #[serde(alias = "VERTICAL", alias = "Vertical")]
    Vertical,
    #[serde(alias = "HORIZONTAL", alias = "Horizontal")]
    Horizontal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    #[serde(default, deserialize_with = "null_as_default")]
    pub children: Vec<Element>,
}

/// Position of an element inside a document: row index, then index among the row's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId {
    pub row: usize,
    pub index: usize,
}

impl ElementId {
    pub fn new(row: usize, index: usize) -> Self {
        Self { row, index }
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.row, self.index)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    #[serde(deserialize_with = "lenient_string")]
    pub label: String,
    #[serde(rename = "type", default)]
    pub button_type: ButtonType,
    #[serde(default, alias = "action", skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<Endpoint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Text {
    #[serde(deserialize_with = "lenient_string")]
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    #[serde(deserialize_with = "lenient_string")]
    pub text: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

/// One widget of a row. On the wire each element is a single-key object whose key
/// names the kind, e.g. `{"Button": {"label": "Submit", "type": "primary"}}`.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Button(Button),
    Text(Text),
    Url(Link),
    Image(Image),
    /// A kind this client does not know. Kept so element positions stay stable.
    Unsupported { kind: String, body: Value },
}

impl Element {
    pub fn kind(&self) -> &str {
        match self {
            Element::Button(_) => "Button",
            Element::Text(_) => "Text",
            Element::Url(_) => "URL",
            Element::Image(_) => "Image",
            Element::Unsupported { kind, .. } => kind,
        }
    }

    pub fn endpoint(&self) -> Option<&Endpoint> {
        match self {
            Element::Button(button) => button.endpoint.as_ref(),
            _ => None,
        }
    }

    pub fn is_interactive(&self) -> bool {
        matches!(self, Element::Url(_)) || self.endpoint().is_some()
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Element::Unsupported { .. })
    }

    fn from_tagged(kind: &str, body: Value) -> Result<Self, serde_json::Error> {
        match kind.to_ascii_lowercase().as_str() {
            "button" => serde_json::from_value(body).map(Element::Button),
            "text" => serde_json::from_value(body).map(Element::Text),
            "url" | "link" => serde_json::from_value(body).map(Element::Url),
            "image" => serde_json::from_value(body).map(Element::Image),
            _ => {
                tracing::debug!(kind, "keeping unsupported declarative ui element");
                Ok(Element::Unsupported {
                    kind: kind.to_string(),
                    body,
                })
            }
        }
    }
}

impl<'de> Deserialize<'de> for Element {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let tagged = serde_json::Map::<String, Value>::deserialize(deserializer)?;
        let mut entries = tagged.into_iter();
        match (entries.next(), entries.next()) {
            (Some((kind, body)), None) => {
                Element::from_tagged(&kind, body).map_err(D::Error::custom)
            }
            (None, _) => Err(D::Error::custom("element object has no kind key")),
            (Some((first, _)), Some((second, _))) => Err(D::Error::custom(format!(
                "element object must name exactly one kind, found `{first}` and `{second}`"
            ))),
        }
    }
}

impl Serialize for Element {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            Element::Button(button) => map.serialize_entry("Button", button)?,
            Element::Text(text) => map.serialize_entry("Text", text)?,
            Element::Url(link) => map.serialize_entry("URL", link)?,
            Element::Image(image) => map.serialize_entry("Image", image)?,
            Element::Unsupported { kind, body } => map.serialize_entry(kind, body)?,
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ButtonType {
    #[default]
    Primary,
    Secondary,
    Tertiary,
    Other(String),
}

impl From<String> for ButtonType {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "primary" => ButtonType::Primary,
            "secondary" => ButtonType::Secondary,
            "tertiary" => ButtonType::Tertiary,
            _ => ButtonType::Other(value),
        }
    }
}

impl From<ButtonType> for String {
    fn from(value: ButtonType) -> Self {
        match value {
            ButtonType::Primary => "primary".to_string(),
            ButtonType::Secondary => "secondary".to_string(),
            ButtonType::Tertiary => "tertiary".to_string(),
            ButtonType::Other(raw) => raw,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    Get,
    Post,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("get") {
            Ok(Method::Get)
        } else if raw.eq_ignore_ascii_case("post") {
            Ok(Method::Post)
        } else {
            Err(format!("unsupported endpoint method `{raw}`"))
        }
    }
}

impl<'de> Deserialize<'de> for Method {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}

/// Network action declared by the server. `url` and every param value may contain
/// `{fileId}` / `{filePath}` placeholders that are bound at action time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    #[serde(default)]
    pub method: Method,
    pub url: String,
    #[serde(default, deserialize_with = "lenient_params")]
    pub params: BTreeMap<String, String>,
}

impl Endpoint {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            params: BTreeMap::new(),
        }
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            params: BTreeMap::new(),
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }
}

impl DeclarativeUi {
    pub fn new(root: Layout) -> Self {
        Self {
            version: default_version(),
            root,
            tooltip: None,
        }
    }

    /// Decodes a screen from a response body, either bare or wrapped in an OCS envelope.
    pub fn from_json(raw: &str) -> Result<Self, DocumentError> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, DocumentError> {
        let data = ocs_data(value)?;
        let document: DeclarativeUi = serde_json::from_value(data)?;
        if document.major_version() > SUPPORTED_MAJOR_VERSION {
            tracing::warn!(
                version = document.version,
                supported = SUPPORTED_MAJOR_VERSION,
                "declarative ui document is newer than this client; rendering known elements only"
            );
        }
        Ok(document)
    }

    pub fn major_version(&self) -> u32 {
        if self.version.is_finite() && self.version > 0.0 {
            self.version.trunc() as u32
        } else {
            0
        }
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.root.rows.get(id.row)?.children.get(id.index)
    }

    pub fn elements(&self) -> impl Iterator<Item = (ElementId, &Element)> {
        self.root.rows.iter().enumerate().flat_map(|(row, r)| {
            r.children
                .iter()
                .enumerate()
                .map(move |(index, element)| (ElementId::new(row, index), element))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.root.rows.iter().all(|row| row.children.is_empty())
    }
}

/// Returns true when `value` looks like a screen document (bare, not enveloped).
pub fn is_document(value: &Value) -> bool {
    value.get("root").is_some_and(Value::is_object)
}

/// Unwraps `{"ocs": {"meta": .., "data": ..}}` when present; other payloads pass through.
pub fn ocs_data(value: Value) -> Result<Value, DocumentError> {
    let Value::Object(mut top) = value else {
        return Ok(value);
    };
    let Some(Value::Object(mut ocs)) = top.remove("ocs") else {
        return Ok(Value::Object(top));
    };

    if let Some(meta) = ocs.get("meta") {
        let statuscode = meta.get("statuscode").and_then(Value::as_i64);
        let status_ok = match meta.get("status").and_then(Value::as_str) {
            Some(status) => status.eq_ignore_ascii_case("ok"),
            None => matches!(statuscode, Some(100) | Some(200) | None),
        };
        if !status_ok {
            let message = meta
                .get("message")
                .and_then(Value::as_str)
                .filter(|m| !m.is_empty())
                .unwrap_or("request failed")
                .to_string();
            return Err(DocumentError::ocs_failure(statuscode.unwrap_or(0), message));
        }
    }

    Ok(ocs.remove("data").unwrap_or(Value::Null))
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn scalar_to_string(value: Value) -> Result<Option<String>, String> {
    match value {
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Null => Ok(None),
        other => Err(format!("expected a string or scalar, got {other}")),
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    scalar_to_string(value)
        .map(Option::unwrap_or_default)
        .map_err(D::Error::custom)
}

fn lenient_params<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, Value>>::deserialize(deserializer)?;
    let mut params = BTreeMap::new();
    for (name, value) in raw.unwrap_or_default() {
        match scalar_to_string(value) {
            Ok(Some(value)) => {
                params.insert(name, value);
            }
            Ok(None) => {}
            Err(err) => {
                return Err(D::Error::custom(format!("endpoint param `{name}`: {err}")));
            }
        }
    }
    Ok(params)
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
