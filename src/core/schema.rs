//! Source-dialect parameter schemas to the object/properties/required shape
//! stdio clients expect.
//!
//! The conversion is lossy on purpose: array items are always strings and
//! objects are opaque. Unknown tags become `{"type":"string"}`.

use rmcp::model::JsonObject;
use serde_json::{json, Value as JsonValue};

use crate::domain::{ParameterSchema, TypeDescriptor};

/// Target-dialect descriptor for a single property.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertySchema {
    String,
    Number,
    Boolean,
    Array,
    Object,
    Enum(Vec<String>),
}

impl PropertySchema {
    pub fn to_value(&self) -> JsonValue {
        match self {
            PropertySchema::String => json!({ "type": "string" }),
            PropertySchema::Number => json!({ "type": "number" }),
            PropertySchema::Boolean => json!({ "type": "boolean" }),
            PropertySchema::Array => json!({ "type": "array", "items": { "type": "string" } }),
            PropertySchema::Object => json!({ "type": "object" }),
            PropertySchema::Enum(options) => json!({ "type": "string", "enum": options }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolInputSchema {
    pub properties: Vec<(String, PropertySchema)>,
    pub required: Vec<String>,
}

impl ToolInputSchema {
    /// `required` is left out entirely when empty.
    pub fn to_json_object(&self) -> JsonObject {
        let mut properties = JsonObject::new();
        for (name, prop) in &self.properties {
            properties.insert(name.clone(), prop.to_value());
        }

        let mut obj = JsonObject::new();
        obj.insert("type".into(), JsonValue::String("object".into()));
        obj.insert("properties".into(), JsonValue::Object(properties));
        if !self.required.is_empty() {
            obj.insert("required".into(), json!(self.required));
        }
        obj
    }
}

pub fn translate_catalog_schema(source: Option<&ParameterSchema>) -> ToolInputSchema {
    let Some(source) = source else {
        return ToolInputSchema::default();
    };

    let mut out = ToolInputSchema::default();
    for (name, descriptor) in source.iter() {
        if !matches!(descriptor, TypeDescriptor::Optional(_)) {
            out.required.push(name.to_owned());
        }
        out.properties.push((name.to_owned(), translate_descriptor(descriptor)));
    }
    out
}

/// Optional wrappers are peeled recursively down to the innermost type.
pub fn translate_descriptor(descriptor: &TypeDescriptor) -> PropertySchema {
    match descriptor {
        TypeDescriptor::String => PropertySchema::String,
        TypeDescriptor::Number => PropertySchema::Number,
        TypeDescriptor::Boolean => PropertySchema::Boolean,
        TypeDescriptor::Array => PropertySchema::Array,
        TypeDescriptor::Object => PropertySchema::Object,
        TypeDescriptor::Enum(options) => PropertySchema::Enum(options.clone()),
        TypeDescriptor::Optional(inner) => translate_descriptor(inner),
        TypeDescriptor::Unknown(tag) => {
            tracing::debug!(tag = ?tag, "unrecognized parameter type; defaulting to string");
            PropertySchema::String
        }
    }
}
