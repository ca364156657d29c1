//! Property resolution
//!
//! Turns one schema node into a resolved `Property`: the declared type,
//! its container shape, and the recursive item chain for arrays and maps.
//! Inner-enum state is lifted onto the container property so renderers
//! see `list<StatusEnum>` rather than `list<string>`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::BuildOptions;
use crate::diagnostics::Diagnostics;
use crate::enums::{build_members, EnumMember};
use crate::profile::LanguageProfile;
use crate::resolver::simple_ref;
use crate::schema::{Schema, SchemaKind, ITEM_NAME_EXT};

// =============================================================================
// Property
// =============================================================================

/// Container shape of a property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerKind {
    None,
    List,
    Map,
}

/// What a property's type points at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeRef {
    /// Primitive tag from the language profile (`string`, `integer`, ...)
    Primitive(String),
    /// Named model in the registry
    Model(String),
}

impl TypeRef {
    pub fn as_str(&self) -> &str {
        match self {
            TypeRef::Primitive(tag) => tag,
            TypeRef::Model(name) => name,
        }
    }

    pub fn is_model(&self) -> bool {
        matches!(self, TypeRef::Model(_))
    }
}

/// A resolved field on a model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    /// Wire name as it appears in the document
    pub base_name: String,
    /// Target-language name (profile-escaped)
    pub name: String,
    pub description: Option<String>,

    pub container: ContainerKind,
    /// Element/value type one level down; chains for array-of-array
    pub item: Option<Box<Property>>,

    pub type_ref: TypeRef,
    pub format: Option<String>,

    pub is_enum: bool,
    /// Members of the innermost enum (lifted for containers)
    pub enum_members: Vec<EnumMember>,
    /// Name of the generated enum type, when `is_enum`
    pub enum_name: Option<String>,

    pub required: bool,
    pub default_value: Option<serde_json::Value>,
    pub example: Option<serde_json::Value>,

    /// Fixed literal set by discriminator propagation
    pub discriminant_value: Option<String>,

    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    pub exclusive_minimum: bool,
    pub exclusive_maximum: bool,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub pattern: Option<String>,
    pub max_items: Option<u64>,

    pub nullable: bool,
    pub read_only: bool,
}

impl Property {
    fn leaf(base_name: &str, type_ref: TypeRef, profile: &dyn LanguageProfile) -> Self {
        Property {
            base_name: base_name.to_string(),
            name: profile.var_name(base_name),
            description: None,
            container: ContainerKind::None,
            item: None,
            type_ref,
            format: None,
            is_enum: false,
            enum_members: Vec::new(),
            enum_name: None,
            required: false,
            default_value: None,
            example: None,
            discriminant_value: None,
            minimum: None,
            maximum: None,
            exclusive_minimum: false,
            exclusive_maximum: false,
            min_length: None,
            max_length: None,
            pattern: None,
            max_items: None,
            nullable: false,
            read_only: false,
        }
    }
}

/// Walk `item` links until a non-container property is reached. Returns
/// the property itself when it has no container nesting; O(depth).
pub fn base_items(property: &Property) -> &Property {
    let mut current = property;
    while let (ContainerKind::List | ContainerKind::Map, Some(item)) =
        (current.container, current.item.as_deref())
    {
        current = item;
    }
    current
}

// =============================================================================
// Resolution
// =============================================================================

/// Resolve one schema node into a `Property`, recursing through container
/// nesting. Reference nodes terminate the chain as model links without
/// being followed, so self-referential `items` cannot loop.
pub fn resolve_property(
    base_name: &str,
    schema: &Schema,
    options: &BuildOptions,
    profile: &dyn LanguageProfile,
    diags: &mut Diagnostics,
) -> Property {
    let mut property = match schema.kind() {
        SchemaKind::Reference => {
            let pointer = schema.reference.as_deref().unwrap_or("");
            Property::leaf(
                base_name,
                TypeRef::Model(profile.type_name(simple_ref(pointer))),
                profile,
            )
        }
        SchemaKind::Scalar(kind) => {
            let tag = profile.map_primitive(kind, schema.format.as_deref());
            let mut property = Property::leaf(base_name, TypeRef::Primitive(tag), profile);
            if schema.has_enum() {
                property.is_enum = true;
                property.enum_members =
                    build_members(base_name, schema, options, profile, diags);
                property.enum_name = Some(profile.enum_type_name(base_name));
            }
            property
        }
        SchemaKind::Array => {
            let item_name = item_name(base_name, schema, options);
            let item = schema
                .items
                .as_deref()
                .map(|items| resolve_property(&item_name, items, options, profile, diags))
                .unwrap_or_else(|| {
                    Property::leaf(&item_name, TypeRef::Primitive("object".into()), profile)
                });

            let mut property = Property::leaf(base_name, item.type_ref.clone(), profile);
            property.container = ContainerKind::List;
            property.max_items = schema.max_items;
            property.item = Some(Box::new(item));
            lift_inner_enum(&mut property, profile);
            property
        }
        SchemaKind::Map => {
            let item = schema
                .additional
                .as_deref()
                .map(|values| resolve_property("inner", values, options, profile, diags))
                .unwrap_or_else(|| {
                    Property::leaf("inner", TypeRef::Primitive("object".into()), profile)
                });

            let mut property = Property::leaf(base_name, item.type_ref.clone(), profile);
            property.container = ContainerKind::Map;
            property.item = Some(Box::new(item));
            lift_inner_enum(&mut property, profile);
            property
        }
        SchemaKind::Object | SchemaKind::Composed => {
            // Inline objects and composed property schemas are typed here
            // as plain objects; the model builder replaces the type when
            // it synthesizes a union model for the composition.
            Property::leaf(base_name, TypeRef::Primitive("object".into()), profile)
        }
    };

    property.description = schema.description.clone();
    property.format = schema.format.clone();
    property.default_value = schema.default_value.clone();
    property.example = schema.example.clone();
    property.minimum = schema.minimum;
    property.maximum = schema.maximum;
    property.exclusive_minimum = schema.exclusive_minimum;
    property.exclusive_maximum = schema.exclusive_maximum;
    property.min_length = schema.min_length;
    property.max_length = schema.max_length;
    property.pattern = schema.pattern.clone();
    property.nullable = schema.nullable;
    property.read_only = schema.read_only;
    property
}

/// Item property name: `x-item-name` extension when enabled, else the
/// enclosing property's wire name.
fn item_name(base_name: &str, schema: &Schema, options: &BuildOptions) -> String {
    if options.use_item_name_extension {
        if let Some(name) = schema.extension(ITEM_NAME_EXT).and_then(|v| v.as_str()) {
            return name.to_string();
        }
    }
    base_name.to_string()
}

/// When the innermost item is an enum, mark the container property as an
/// enum too and lift the member list onto it.
fn lift_inner_enum(property: &mut Property, profile: &dyn LanguageProfile) {
    let leaf = base_items(property);
    if !leaf.is_enum {
        return;
    }
    let members = leaf.enum_members.clone();
    debug!(property = %property.base_name, "lifting inner enum onto container");
    property.is_enum = true;
    property.enum_members = members;
    property.enum_name = Some(profile.enum_type_name(&property.base_name));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::DefaultProfile;
    use crate::schema::ScalarKind;

    fn resolve(base_name: &str, schema: &Schema) -> Property {
        let mut diags = Diagnostics::new();
        resolve_property(
            base_name,
            schema,
            &BuildOptions::default(),
            &DefaultProfile::new(),
            &mut diags,
        )
    }

    #[test]
    fn test_scalar_leaf() {
        let property = resolve("petName", &Schema::scalar(ScalarKind::String));
        assert_eq!(property.container, ContainerKind::None);
        assert_eq!(property.type_ref, TypeRef::Primitive("string".into()));
        assert_eq!(property.base_name, "petName");
        assert_eq!(property.name, "pet_name");
        assert!(property.item.is_none());
    }

    #[test]
    fn test_reference_terminates_chain() {
        let property = resolve("owner", &Schema::reference("#/components/schemas/Owner"));
        assert_eq!(property.type_ref, TypeRef::Model("Owner".into()));
        assert!(property.item.is_none());
    }

    #[test]
    fn test_nested_array_drill_down() {
        let mut leaf = Schema::scalar(ScalarKind::String);
        leaf.enum_values = vec![serde_json::json!("A"), serde_json::json!("B")];
        let schema = Schema::array(Schema::array(leaf));

        let property = resolve("tags", &schema);
        assert_eq!(property.container, ContainerKind::List);
        let inner = property.item.as_deref().unwrap();
        assert_eq!(inner.container, ContainerKind::List);

        // Two levels down sits the enum leaf
        let leaf = base_items(&property);
        assert_eq!(leaf.container, ContainerKind::None);
        assert!(leaf.is_enum);
        assert_eq!(leaf.enum_members.len(), 2);
    }

    #[test]
    fn test_base_items_identity_for_leaf() {
        let property = resolve("id", &Schema::scalar(ScalarKind::Integer));
        let leaf = base_items(&property);
        assert_eq!(leaf.base_name, "id");
    }

    #[test]
    fn test_inner_enum_lifted_onto_array() {
        let mut leaf = Schema::scalar(ScalarKind::String);
        leaf.enum_values = vec![serde_json::json!("on"), serde_json::json!("off")];
        let property = resolve("states", &Schema::array(leaf));

        assert!(property.is_enum);
        assert_eq!(property.enum_members.len(), 2);
        assert_eq!(property.enum_name.as_deref(), Some("StatesEnum"));
    }

    #[test]
    fn test_map_of_enum_lifted() {
        let mut leaf = Schema::scalar(ScalarKind::String);
        leaf.enum_values = vec![serde_json::json!("x")];
        let property = resolve("labels", &Schema::map(leaf));

        assert_eq!(property.container, ContainerKind::Map);
        assert!(property.is_enum);
    }

    #[test]
    fn test_item_name_extension() {
        let mut schema = Schema::array(Schema::scalar(ScalarKind::String));
        schema.extensions.insert(
            ITEM_NAME_EXT.to_string(),
            serde_json::json!("entry"),
        );
        let property = resolve("list", &schema);
        assert_eq!(property.item.as_deref().unwrap().base_name, "entry");
    }

    #[test]
    fn test_constraints_carried() {
        let mut schema = Schema::scalar(ScalarKind::Number);
        schema.minimum = Some(50.0);
        schema.maximum = Some(1000.0);
        let property = resolve("price", &schema);
        assert_eq!(property.minimum, Some(50.0));
        assert_eq!(property.maximum, Some(1000.0));
    }
}
