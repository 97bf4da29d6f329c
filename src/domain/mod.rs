use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// A tool as advertised by the upstream `GET /tools` endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteTool {
    pub name: String,
    pub description: Option<String>,
    pub schema: Option<ParameterSchema>,
}

impl RemoteTool {
    /// Decode one catalog entry. Only a string `name` is mandatory; an
    /// off-shape `description` is dropped and `schema` goes through the
    /// normalizer.
    pub fn from_value(raw: &JsonValue) -> Option<Self> {
        let name = raw.get("name").and_then(JsonValue::as_str)?.to_owned();
        let description = raw
            .get("description")
            .and_then(JsonValue::as_str)
            .map(str::to_owned);
        let schema = raw
            .get("schema")
            .filter(|v| !v.is_null())
            .cloned()
            .map(ParameterSchema::from);
        Some(Self {
            name,
            description,
            schema,
        })
    }
}

/// Source-dialect parameter map, normalized at decode time.
///
/// Any JSON shape is accepted: a non-object schema decodes to an empty map,
/// and every entry goes through [`TypeDescriptor::from_value`].
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(from = "JsonValue")]
pub struct ParameterSchema {
    entries: Vec<(String, TypeDescriptor)>,
}

impl ParameterSchema {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TypeDescriptor)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<JsonValue> for ParameterSchema {
    fn from(value: JsonValue) -> Self {
        let entries = match value {
            JsonValue::Object(map) => map
                .into_iter()
                .map(|(name, raw)| {
                    let descriptor = TypeDescriptor::from_value(&raw);
                    (name, descriptor)
                })
                .collect(),
            _ => Vec::new(),
        };
        Self { entries }
    }
}

/// Closed set of parameter types the upstream can describe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDescriptor {
    String,
    Number,
    Boolean,
    Array,
    Object,
    Enum(Vec<String>),
    Optional(Box<TypeDescriptor>),
    /// Unrecognized or missing type tag (the tag is kept for diagnostics).
    Unknown(Option<String>),
}

impl TypeDescriptor {
    /// Normalize either `{type: T, ...}` or `{def: {type: T, ...}}` into a variant.
    /// Never fails; anything unexpected becomes `Unknown`.
    pub fn from_value(raw: &JsonValue) -> Self {
        let def = raw.get("def");
        let tag = raw
            .get("type")
            .and_then(JsonValue::as_str)
            .or_else(|| def.and_then(|d| d.get("type")).and_then(JsonValue::as_str));

        match tag {
            Some("string") => Self::String,
            Some("number") => Self::Number,
            Some("boolean") => Self::Boolean,
            Some("array") => Self::Array,
            Some("object") => Self::Object,
            Some("enum") => {
                let options = raw
                    .get("options")
                    .or_else(|| def.and_then(|d| d.get("options")))
                    .and_then(JsonValue::as_array)
                    .map(|items| {
                        items
                            .iter()
                            .filter_map(|v| v.as_str().map(str::to_owned))
                            .collect()
                    })
                    .unwrap_or_default();
                Self::Enum(options)
            }
            Some("optional") => {
                let inner = def
                    .and_then(|d| d.get("innerType"))
                    .map(Self::from_value)
                    .unwrap_or(Self::Unknown(None));
                Self::Optional(Box::new(inner))
            }
            other => Self::Unknown(other.map(str::to_owned)),
        }
    }
}

/// Ordered, de-duplicated tool catalog. Built once at startup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    tools: Vec<RemoteTool>,
}

impl Catalog {
    /// Keeps the first tool for each name; later duplicates are dropped.
    pub fn from_tools(tools: impl IntoIterator<Item = RemoteTool>) -> Self {
        let mut kept: Vec<RemoteTool> = Vec::new();
        for tool in tools {
            if kept.iter().any(|t| t.name == tool.name) {
                tracing::warn!(tool = %tool.name, "duplicate tool name in catalog; keeping first");
                continue;
            }
            kept.push(tool);
        }
        Self { tools: kept }
    }

    pub fn iter(&self) -> impl Iterator<Item = &RemoteTool> {
        self.tools.iter()
    }

    pub fn get(&self, name: &str) -> Option<&RemoteTool> {
        self.tools.iter().find(|t| t.name == name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Body of `GET <base>/tools`. Any JSON body decodes; a missing or
/// non-array `tools` is an empty catalog and unusable entries are skipped.
#[derive(Debug, Deserialize)]
#[serde(from = "JsonValue")]
pub struct CatalogWire {
    pub tools: Vec<RemoteTool>,
}

impl From<JsonValue> for CatalogWire {
    fn from(body: JsonValue) -> Self {
        let entries = body
            .get("tools")
            .and_then(JsonValue::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let tools = entries
            .iter()
            .enumerate()
            .filter_map(|(index, raw)| {
                let tool = RemoteTool::from_value(raw);
                if tool.is_none() {
                    tracing::warn!(index, "catalog entry has no string name; skipping");
                }
                tool
            })
            .collect();
        Self { tools }
    }
}

impl From<CatalogWire> for Catalog {
    fn from(w: CatalogWire) -> Self {
        Catalog::from_tools(w.tools)
    }
}

/// Body of `POST <base>/tools/<name>`. Only `success` decides the outcome.
#[derive(Debug, Deserialize)]
pub struct InvocationEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub result: Option<UpstreamResult>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpstreamResult {
    #[serde(default)]
    pub content: Vec<UpstreamContent>,
    #[serde(default, rename = "isError")]
    pub is_error: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamContent {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

pub const UNKNOWN_ERROR: &str = "Unknown error";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename = "text")]
pub struct TextContent {
    pub text: String,
}

/// The only result shape handed back to stdio clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvocationResult {
    pub content: Vec<TextContent>,
    #[serde(rename = "isError")]
    pub is_error: bool,
}

impl InvocationResult {
    /// An error result always carries exactly one non-empty text item.
    pub fn error(message: impl Into<String>) -> Self {
        let mut text: String = message.into();
        if text.is_empty() {
            text = UNKNOWN_ERROR.to_string();
        }
        Self {
            content: vec![TextContent { text }],
            is_error: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn descriptor_accepts_flat_and_def_nested_tags() {
        assert_eq!(TypeDescriptor::from_value(&json!({"type":"number"})), TypeDescriptor::Number);
        assert_eq!(
            TypeDescriptor::from_value(&json!({"def":{"type":"boolean"}})),
            TypeDescriptor::Boolean
        );
    }

    #[test]
    fn descriptor_prefers_direct_type_over_def() {
        let d = TypeDescriptor::from_value(&json!({"type":"string","def":{"type":"number"}}));
        assert_eq!(d, TypeDescriptor::String);
    }

    #[test]
    fn descriptor_unknown_shapes_never_fail() {
        assert_eq!(TypeDescriptor::from_value(&json!(42)), TypeDescriptor::Unknown(None));
        assert_eq!(
            TypeDescriptor::from_value(&json!({"type":"date"})),
            TypeDescriptor::Unknown(Some("date".into()))
        );
        assert_eq!(
            TypeDescriptor::from_value(&json!({"type":"optional"})),
            TypeDescriptor::Optional(Box::new(TypeDescriptor::Unknown(None)))
        );
    }

    #[test]
    fn schema_keeps_source_order_and_tolerates_non_objects() {
        let s: ParameterSchema =
            serde_json::from_value(json!({"zeta":{"type":"string"},"alpha":{"type":"number"}})).unwrap();
        let names: Vec<&str> = s.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);

        let s: ParameterSchema = serde_json::from_value(json!("nonsense")).unwrap();
        assert!(s.is_empty());
    }

    #[test]
    fn catalog_drops_duplicate_names() {
        let wire: CatalogWire = serde_json::from_value(json!({"tools":[
            {"name":"a","description":"first"},
            {"name":"b"},
            {"name":"a","description":"second"}
        ]}))
        .unwrap();
        let catalog = Catalog::from(wire);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("a").unwrap().description.as_deref(), Some("first"));
        assert!(catalog.get("b").unwrap().schema.is_none());
    }

    #[test]
    fn off_shape_description_defaults_without_failing_catalog() {
        let wire: CatalogWire = serde_json::from_value(json!({"tools":[
            {"name":"a","description":7},
            {"name":"b"}
        ]}))
        .unwrap();
        assert_eq!(wire.tools.len(), 2);
        assert!(wire.tools[0].description.is_none());
        assert_eq!(wire.tools[1].name, "b");
    }

    #[test]
    fn entries_without_string_name_are_skipped() {
        let wire: CatalogWire = serde_json::from_value(json!({"tools":[
            {"description":"anonymous"},
            {"name":42},
            "not-an-object",
            {"name":"kept","schema":null}
        ]}))
        .unwrap();
        assert_eq!(wire.tools.len(), 1);
        assert_eq!(wire.tools[0].name, "kept");
        assert!(wire.tools[0].schema.is_none());
    }

    #[test]
    fn null_or_missing_tools_is_an_empty_catalog() {
        for body in [json!({"tools": null}), json!({}), json!({"tools": "x"}), json!([])] {
            let wire: CatalogWire = serde_json::from_value(body).unwrap();
            assert!(wire.tools.is_empty());
        }
    }

    #[test]
    fn invocation_result_serializes_protocol_shape() {
        let v = serde_json::to_value(InvocationResult::error("boom")).unwrap();
        assert_eq!(v, json!({"content":[{"type":"text","text":"boom"}],"isError":true}));
    }

    #[test]
    fn empty_error_message_falls_back() {
        let r = InvocationResult::error("");
        assert_eq!(r.content[0].text, UNKNOWN_ERROR);
    }
}
