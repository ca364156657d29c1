//! Input schema types
//!
//! The read-only schema tree as handed over by the document loader. The
//! loader owns parsing wire bytes; this module owns extracting typed nodes
//! out of the parsed `serde_json::Value` tree and indexing them by name.
//!
//! A `Schema` is immutable for the duration of one document build.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::error::{ModelError, Result};

/// Vendor extension carrying an explicit enum value list
pub const VENDOR_ENUM_EXT: &str = "x-enum-values";
/// Vendor extension overriding the item name used for array elements
pub const ITEM_NAME_EXT: &str = "x-item-name";

// =============================================================================
// Schema Kind
// =============================================================================

/// Scalar JSON types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarKind {
    String,
    Integer,
    Number,
    Boolean,
}

impl ScalarKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScalarKind::String => "string",
            ScalarKind::Integer => "integer",
            ScalarKind::Number => "number",
            ScalarKind::Boolean => "boolean",
        }
    }
}

/// Structural kind of a schema node, matched exhaustively everywhere
/// instead of runtime type inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaKind {
    Scalar(ScalarKind),
    /// `type: array` with an `items` schema
    Array,
    /// object whose `additionalProperties` is itself a schema
    Map,
    Object,
    /// bare `$ref` node
    Reference,
    /// carries allOf / oneOf / anyOf branches
    Composed,
}

// =============================================================================
// Discriminator
// =============================================================================

/// A discriminator declaration: the tag property plus an explicit
/// subtype-name -> reference mapping, in document order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discriminator {
    pub property_name: String,
    /// (mapping key, $ref pointer) pairs
    pub mapping: Vec<(String, String)>,
}

// =============================================================================
// Vendor enum entries
// =============================================================================

/// One entry of a vendor-supplied enum value list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorEnumEntry {
    pub identifier: String,
    pub value: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// =============================================================================
// Schema
// =============================================================================

/// One schema node as read from the API document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schema {
    pub kind: Option<SchemaKind>,
    /// `$ref` pointer, when this node is (or carries) a reference
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub format: Option<String>,

    /// Inline `enum` values, document order
    #[serde(default)]
    pub enum_values: Vec<serde_json::Value>,
    /// Vendor-supplied enum value list (`x-enum-values`)
    #[serde(default)]
    pub vendor_enum: Vec<VendorEnumEntry>,

    /// Array element schema
    pub items: Option<Box<Schema>>,
    /// Map value schema (`additionalProperties` as a schema)
    pub additional: Option<Box<Schema>>,

    /// Named properties in document order
    #[serde(default)]
    pub properties: Vec<(String, Schema)>,
    /// Names listed in `required`
    #[serde(default)]
    pub required: HashSet<String>,

    #[serde(default)]
    pub all_of: Vec<Schema>,
    #[serde(default)]
    pub one_of: Vec<Schema>,
    #[serde(default)]
    pub any_of: Vec<Schema>,

    pub discriminator: Option<Discriminator>,

    pub example: Option<serde_json::Value>,
    pub default_value: Option<serde_json::Value>,

    // Numeric constraints
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    #[serde(default)]
    pub exclusive_minimum: bool,
    #[serde(default)]
    pub exclusive_maximum: bool,

    // String constraints
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub pattern: Option<String>,

    // Container constraints
    pub min_items: Option<u64>,
    pub max_items: Option<u64>,

    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub read_only: bool,

    /// Uninterpreted `x-` extensions
    #[serde(default)]
    pub extensions: serde_json::Map<String, serde_json::Value>,
}

impl Schema {
    /// Extract a typed node from a parsed JSON value.
    pub fn from_value(json: &serde_json::Value) -> Self {
        let obj = match json.as_object() {
            Some(o) => o,
            None => return Schema::default(),
        };

        let mut schema = Schema {
            reference: str_field(obj, "$ref"),
            title: str_field(obj, "title"),
            description: str_field(obj, "description"),
            format: str_field(obj, "format"),
            ..Schema::default()
        };

        if let Some(values) = obj.get("enum").and_then(|v| v.as_array()) {
            schema.enum_values = values.clone();
        }
        if let Some(entries) = obj.get(VENDOR_ENUM_EXT).and_then(|v| v.as_array()) {
            schema.vendor_enum = entries
                .iter()
                .filter_map(|e| extract_vendor_entry(e))
                .collect();
        }

        if let Some(items) = obj.get("items") {
            schema.items = Some(Box::new(Schema::from_value(items)));
        }
        if let Some(add) = obj.get("additionalProperties") {
            // `additionalProperties: true/false` is not a value schema
            if add.is_object() {
                schema.additional = Some(Box::new(Schema::from_value(add)));
            }
        }

        if let Some(props) = obj.get("properties").and_then(|v| v.as_object()) {
            schema.properties = props
                .iter()
                .map(|(name, prop)| (name.clone(), Schema::from_value(prop)))
                .collect();
        }
        if let Some(req) = obj.get("required").and_then(|v| v.as_array()) {
            schema.required = req
                .iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect();
        }

        schema.all_of = branch_list(obj, "allOf");
        schema.one_of = branch_list(obj, "oneOf");
        schema.any_of = branch_list(obj, "anyOf");

        if let Some(disc) = obj.get("discriminator").and_then(|v| v.as_object()) {
            if let Some(prop_name) = disc.get("propertyName").and_then(|v| v.as_str()) {
                let mapping = disc
                    .get("mapping")
                    .and_then(|v| v.as_object())
                    .map(|m| {
                        m.iter()
                            .filter_map(|(k, v)| {
                                v.as_str().map(|s| (k.clone(), s.to_string()))
                            })
                            .collect()
                    })
                    .unwrap_or_default();
                schema.discriminator = Some(Discriminator {
                    property_name: prop_name.to_string(),
                    mapping,
                });
            }
        }

        schema.example = obj.get("example").cloned();
        schema.default_value = obj.get("default").cloned();

        schema.minimum = obj.get("minimum").and_then(|v| v.as_f64());
        schema.maximum = obj.get("maximum").and_then(|v| v.as_f64());
        schema.exclusive_minimum = bool_field(obj, "exclusiveMinimum");
        schema.exclusive_maximum = bool_field(obj, "exclusiveMaximum");
        schema.min_length = obj.get("minLength").and_then(|v| v.as_u64());
        schema.max_length = obj.get("maxLength").and_then(|v| v.as_u64());
        schema.pattern = str_field(obj, "pattern");
        schema.min_items = obj.get("minItems").and_then(|v| v.as_u64());
        schema.max_items = obj.get("maxItems").and_then(|v| v.as_u64());
        schema.nullable = bool_field(obj, "nullable");
        schema.read_only = bool_field(obj, "readOnly");

        for (key, value) in obj {
            if key.starts_with("x-") {
                schema.extensions.insert(key.clone(), value.clone());
            }
        }

        schema.kind = Some(classify(obj, &schema));
        schema
    }

    /// Structural kind, computing a fallback when the node was built by
    /// hand rather than extracted.
    pub fn kind(&self) -> SchemaKind {
        if let Some(kind) = self.kind {
            return kind;
        }
        if self.reference.is_some() {
            SchemaKind::Reference
        } else if !self.all_of.is_empty() || !self.one_of.is_empty() || !self.any_of.is_empty() {
            SchemaKind::Composed
        } else if self.items.is_some() {
            SchemaKind::Array
        } else if self.additional.is_some() {
            SchemaKind::Map
        } else if !self.properties.is_empty() {
            SchemaKind::Object
        } else {
            SchemaKind::Object
        }
    }

    pub fn is_reference(&self) -> bool {
        self.reference.is_some()
    }

    pub fn has_enum(&self) -> bool {
        !self.enum_values.is_empty() || !self.vendor_enum.is_empty()
    }

    /// Extension lookup by key
    pub fn extension(&self, key: &str) -> Option<&serde_json::Value> {
        self.extensions.get(key)
    }

    // --- construction helpers, used heavily by tests ---

    pub fn scalar(kind: ScalarKind) -> Self {
        Schema {
            kind: Some(SchemaKind::Scalar(kind)),
            ..Schema::default()
        }
    }

    pub fn reference(pointer: impl Into<String>) -> Self {
        Schema {
            kind: Some(SchemaKind::Reference),
            reference: Some(pointer.into()),
            ..Schema::default()
        }
    }

    pub fn array(items: Schema) -> Self {
        Schema {
            kind: Some(SchemaKind::Array),
            items: Some(Box::new(items)),
            ..Schema::default()
        }
    }

    pub fn map(values: Schema) -> Self {
        Schema {
            kind: Some(SchemaKind::Map),
            additional: Some(Box::new(values)),
            ..Schema::default()
        }
    }

    pub fn object(properties: Vec<(String, Schema)>) -> Self {
        Schema {
            kind: Some(SchemaKind::Object),
            properties,
            ..Schema::default()
        }
    }
}

/// Classify a raw JSON node into a `SchemaKind`
fn classify(obj: &serde_json::Map<String, serde_json::Value>, schema: &Schema) -> SchemaKind {
    if schema.reference.is_some() {
        return SchemaKind::Reference;
    }
    if !schema.all_of.is_empty() || !schema.one_of.is_empty() || !schema.any_of.is_empty() {
        return SchemaKind::Composed;
    }
    match obj.get("type").and_then(|v| v.as_str()) {
        Some("array") => SchemaKind::Array,
        Some("string") => SchemaKind::Scalar(ScalarKind::String),
        Some("integer") => SchemaKind::Scalar(ScalarKind::Integer),
        Some("number") => SchemaKind::Scalar(ScalarKind::Number),
        Some("boolean") => SchemaKind::Scalar(ScalarKind::Boolean),
        Some("object") | None => {
            if schema.additional.is_some() && schema.properties.is_empty() {
                SchemaKind::Map
            } else if schema.items.is_some() {
                SchemaKind::Array
            } else {
                SchemaKind::Object
            }
        }
        Some(_) => SchemaKind::Object,
    }
}

fn str_field(
    obj: &serde_json::Map<String, serde_json::Value>,
    key: &str,
) -> Option<String> {
    obj.get(key).and_then(|v| v.as_str()).map(String::from)
}

fn bool_field(obj: &serde_json::Map<String, serde_json::Value>, key: &str) -> bool {
    obj.get(key).and_then(|v| v.as_bool()).unwrap_or(false)
}

fn branch_list(obj: &serde_json::Map<String, serde_json::Value>, key: &str) -> Vec<Schema> {
    obj.get(key)
        .and_then(|v| v.as_array())
        .map(|arr| arr.iter().map(Schema::from_value).collect())
        .unwrap_or_default()
}

fn extract_vendor_entry(json: &serde_json::Value) -> Option<VendorEnumEntry> {
    let obj = json.as_object()?;
    let identifier = obj.get("identifier").and_then(|v| v.as_str())?.to_string();
    let value = obj
        .get("numericValue")
        .or_else(|| obj.get("value"))
        .cloned()
        .unwrap_or(serde_json::Value::Null);
    let description = obj
        .get("description")
        .and_then(|v| v.as_str())
        .map(String::from);
    Some(VendorEnumEntry {
        identifier,
        value,
        description,
    })
}

// =============================================================================
// Schema Table
// =============================================================================

/// The document's named schemas, in document order, indexed by name.
///
/// Supplied by the document loader; read-only input for one build.
#[derive(Debug, Clone, Default)]
pub struct SchemaTable {
    entries: Vec<(String, Schema)>,
    index: HashMap<String, usize>,
}

impl SchemaTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from a parsed document, looking for schemas under
    /// `components/schemas` (OpenAPI 3) then `definitions` (Swagger 2),
    /// then treating the root object itself as the table.
    pub fn from_document(json: &serde_json::Value) -> Self {
        let schemas = json
            .pointer("/components/schemas")
            .or_else(|| json.pointer("/definitions"))
            .unwrap_or(json);

        let mut table = SchemaTable::new();
        if let Some(obj) = schemas.as_object() {
            for (name, value) in obj {
                table.insert(name.clone(), Schema::from_value(value));
            }
        }
        table
    }

    /// Parse a raw JSON document and build the table from it. Fails on
    /// malformed JSON or a non-object root; everything past that point
    /// degrades per-subtree instead of erroring.
    pub fn from_json_str(document: &str) -> Result<Self> {
        let json: serde_json::Value = serde_json::from_str(document)?;
        if !json.is_object() {
            return Err(ModelError::InvalidDocument);
        }
        Ok(Self::from_document(&json))
    }

    pub fn insert(&mut self, name: String, schema: Schema) {
        if let Some(&idx) = self.index.get(&name) {
            self.entries[idx].1 = schema;
        } else {
            self.index.insert(name.clone(), self.entries.len());
            self.entries.push((name, schema));
        }
    }

    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.index.get(name).map(|&idx| &self.entries[idx].1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Names in document order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Schema)> {
        self.entries.iter().map(|(name, s)| (name.as_str(), s))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_scalar_kinds() {
        let json: serde_json::Value =
            serde_json::from_str(r#"{"type": "string", "format": "date-time"}"#).unwrap();
        let schema = Schema::from_value(&json);
        assert_eq!(schema.kind(), SchemaKind::Scalar(ScalarKind::String));
        assert_eq!(schema.format.as_deref(), Some("date-time"));
    }

    #[test]
    fn test_extract_reference() {
        let json: serde_json::Value =
            serde_json::from_str(r##"{"$ref": "#/components/schemas/Pet"}"##).unwrap();
        let schema = Schema::from_value(&json);
        assert_eq!(schema.kind(), SchemaKind::Reference);
        assert_eq!(schema.reference.as_deref(), Some("#/components/schemas/Pet"));
    }

    #[test]
    fn test_extract_map_vs_object() {
        let map: serde_json::Value = serde_json::from_str(
            r#"{"type": "object", "additionalProperties": {"type": "integer"}}"#,
        )
        .unwrap();
        assert_eq!(Schema::from_value(&map).kind(), SchemaKind::Map);

        let object: serde_json::Value = serde_json::from_str(
            r#"{"type": "object", "properties": {"id": {"type": "integer"}}}"#,
        )
        .unwrap();
        assert_eq!(Schema::from_value(&object).kind(), SchemaKind::Object);
    }

    #[test]
    fn test_property_order_preserved() {
        let json: serde_json::Value = serde_json::from_str(
            r#"{"type": "object", "properties": {"z": {"type": "string"}, "a": {"type": "string"}, "m": {"type": "string"}}}"#,
        )
        .unwrap();
        let schema = Schema::from_value(&json);
        let names: Vec<&str> = schema.properties.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_extract_discriminator() {
        let json: serde_json::Value = serde_json::from_str(
            r##"{
                "oneOf": [{"$ref": "#/Cat"}, {"$ref": "#/Dog"}],
                "discriminator": {
                    "propertyName": "type",
                    "mapping": {"cat": "#/Cat", "dog": "#/Dog"}
                }
            }"##,
        )
        .unwrap();
        let schema = Schema::from_value(&json);
        assert_eq!(schema.kind(), SchemaKind::Composed);
        let disc = schema.discriminator.unwrap();
        assert_eq!(disc.property_name, "type");
        assert_eq!(disc.mapping.len(), 2);
    }

    #[test]
    fn test_vendor_enum_extraction() {
        let json: serde_json::Value = serde_json::from_str(
            r#"{
                "type": "integer",
                "x-enum-values": [
                    {"identifier": "Low", "numericValue": 1, "description": "low priority"},
                    {"identifier": "High", "numericValue": 2}
                ]
            }"#,
        )
        .unwrap();
        let schema = Schema::from_value(&json);
        assert_eq!(schema.vendor_enum.len(), 2);
        assert_eq!(schema.vendor_enum[0].identifier, "Low");
        assert_eq!(schema.vendor_enum[1].value, serde_json::json!(2));
    }

    #[test]
    fn test_table_document_order() {
        let doc: serde_json::Value = serde_json::from_str(
            r#"{"components": {"schemas": {"B": {"type": "object"}, "A": {"type": "string"}}}}"#,
        )
        .unwrap();
        let table = SchemaTable::from_document(&doc);
        let names: Vec<&str> = table.names().collect();
        assert_eq!(names, vec!["B", "A"]);
        assert!(table.get("A").is_some());
    }
}
