//! Composed schema handling
//!
//! Two jobs live here: allOf merging (single-parent inheritance with
//! property flattening) and oneOf/anyOf union synthesis. Both operate on
//! a model under construction plus the document's schema table, and both
//! degrade instead of failing on malformed input.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::config::BuildOptions;
use crate::diagnostics::{DiagnosticCode, Diagnostics};
use crate::model::{Model, ModelRegistry};
use crate::profile::{to_pascal_case, LanguageProfile};
use crate::property::resolve_property;
use crate::resolver::{simple_ref, RefResolver, Resolution};
use crate::schema::Schema;

// =============================================================================
// allOf merging
// =============================================================================

/// Merge an allOf composition into `model`.
///
/// The first referenced branch becomes the parent. Every other branch,
/// referenced or inline, has its properties flattened into the model,
/// except those the parent chain already defines. Referenced non-parent
/// branches are additionally recorded as interfaces. A discriminator
/// declared on a referenced branch is inherited when the composition
/// itself declares none.
///
/// With [`BuildOptions::flatten_composed`] set, no branch becomes the
/// parent: every branch is flattened, for targets without inheritance.
pub fn merge_all_of(
    model: &mut Model,
    schema: &Schema,
    resolver: &mut RefResolver<'_>,
    options: &BuildOptions,
    profile: &dyn LanguageProfile,
    diagnostics: &mut Diagnostics,
) {
    let mut parent_pointer: Option<&str> = None;
    let mut inherited = HashSet::new();

    if !options.flatten_composed {
        for branch in &schema.all_of {
            let Some(pointer) = branch.reference.as_deref() else {
                continue;
            };
            if parent_pointer.is_none() {
                parent_pointer = Some(pointer);
                model.parent_name = Some(profile.type_name(simple_ref(pointer)));
                collect_property_names(pointer, resolver, &mut inherited, diagnostics, &model.name);
                debug!(model = %model.name, parent = ?model.parent_name, "allOf parent selected");
            } else {
                model.interfaces.push(profile.type_name(simple_ref(pointer)));
            }
        }

        if schema.all_of.iter().filter(|b| b.is_reference()).count() > 1 {
            diagnostics.record(
                model.name.clone(),
                DiagnosticCode::MultipleParents,
                "allOf names several referenced branches; only the first becomes the parent",
            );
        }
    }

    // Flatten every non-parent branch, then the composition's own
    // top-level properties, skipping names the parent chain defines.
    for branch in &schema.all_of {
        if branch.reference.as_deref() == parent_pointer && parent_pointer.is_some() {
            continue;
        }
        let resolved = match branch.reference.as_deref() {
            Some(pointer) => match resolver.resolve(pointer) {
                Resolution::Resolved(target) => {
                    let out = Some(target);
                    resolver.finish(pointer);
                    out
                }
                Resolution::Cycle => {
                    diagnostics.record(
                        model.name.clone(),
                        DiagnosticCode::CycleDetected,
                        format!("allOf branch '{}' cycles back; already-merged properties kept", pointer),
                    );
                    None
                }
                Resolution::NotFound => {
                    diagnostics.unresolved_ref(model.name.clone(), pointer);
                    None
                }
            },
            None => Some(branch),
        };
        if let Some(branch_schema) = resolved {
            flatten_properties(
                model,
                branch_schema,
                &inherited,
                options,
                profile,
                diagnostics,
            );
        }
    }
    flatten_properties(model, schema, &inherited, options, profile, diagnostics);

    if model.discriminator.is_none() {
        model.discriminator = schema.discriminator.clone();
    }
    if model.discriminator.is_none() {
        model.discriminator = inherited_discriminator(schema, resolver);
    }
    if let Some(pointer) = parent_pointer {
        redeclare_discriminant_tag(model, pointer, resolver, options, profile, diagnostics);
    }

    if model.parent_name.is_none() && model.properties.is_empty() {
        diagnostics.record(
            model.name.clone(),
            DiagnosticCode::EmptyComposition,
            "allOf resolves to no parent and no properties; treated as an empty object",
        );
    }
}

/// A discriminated parent's tag property is the one exception to the
/// no-redeclare rule: every subtype carries its own copy so the
/// propagation pass can pin a literal onto it.
fn redeclare_discriminant_tag(
    model: &mut Model,
    parent_pointer: &str,
    resolver: &mut RefResolver<'_>,
    options: &BuildOptions,
    profile: &dyn LanguageProfile,
    diagnostics: &mut Diagnostics,
) {
    let Resolution::Resolved(parent) = resolver.resolve(parent_pointer) else {
        return;
    };
    resolver.finish(parent_pointer);
    let Some(discriminator) = &parent.discriminator else {
        return;
    };
    if model.has_property(&discriminator.property_name) {
        return;
    }
    let Some((tag_name, tag_schema)) = parent
        .properties
        .iter()
        .find(|(name, _)| name == &discriminator.property_name)
    else {
        return;
    };
    let mut tag = resolve_property(tag_name, tag_schema, options, profile, diagnostics);
    tag.required = parent.required.contains(tag_name);
    model.properties.push(tag);
}

/// Names of every property defined by the schema behind `pointer`,
/// following its own allOf chain. Cycles and dangling refs contribute
/// nothing.
fn collect_property_names(
    pointer: &str,
    resolver: &mut RefResolver<'_>,
    out: &mut HashSet<String>,
    diagnostics: &mut Diagnostics,
    schema_name: &str,
) {
    match resolver.resolve(pointer) {
        Resolution::Resolved(schema) => {
            for (name, _) in &schema.properties {
                out.insert(name.clone());
            }
            let branch_pointers: Vec<String> = schema
                .all_of
                .iter()
                .filter_map(|b| b.reference.clone())
                .collect();
            for (name, _) in schema.all_of.iter().flat_map(|b| b.properties.iter()) {
                out.insert(name.clone());
            }
            for branch in branch_pointers {
                collect_property_names(&branch, resolver, out, diagnostics, schema_name);
            }
            resolver.finish(pointer);
        }
        Resolution::Cycle => {}
        Resolution::NotFound => diagnostics.unresolved_ref(schema_name, pointer),
    }
}

fn flatten_properties(
    model: &mut Model,
    source: &Schema,
    inherited: &HashSet<String>,
    options: &BuildOptions,
    profile: &dyn LanguageProfile,
    diagnostics: &mut Diagnostics,
) {
    for (name, property_schema) in &source.properties {
        if inherited.contains(name) {
            debug!(model = %model.name, property = %name, "skipping parent-defined property");
            continue;
        }
        let mut property = resolve_property(name, property_schema, options, profile, diagnostics);
        property.required = source.required.contains(name);
        if !model.push_property(property) {
            diagnostics.record(
                model.name.clone(),
                DiagnosticCode::DuplicateProperty,
                format!("property '{}' defined by more than one allOf branch", name),
            );
        }
    }
}

/// First discriminator declared by a referenced allOf branch
fn inherited_discriminator(
    schema: &Schema,
    resolver: &mut RefResolver<'_>,
) -> Option<crate::schema::Discriminator> {
    for branch in &schema.all_of {
        let Some(pointer) = branch.reference.as_deref() else {
            if branch.discriminator.is_some() {
                return branch.discriminator.clone();
            }
            continue;
        };
        if let Resolution::Resolved(target) = resolver.resolve(pointer) {
            let found = target.discriminator.clone();
            resolver.finish(pointer);
            if found.is_some() {
                return found;
            }
        }
    }
    None
}

// =============================================================================
// oneOf / anyOf union synthesis
// =============================================================================

/// Which composition keyword a synthetic union stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnionKind {
    OneOf,
    AnyOf,
}

impl UnionKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            UnionKind::OneOf => "OneOf",
            UnionKind::AnyOf => "AnyOf",
        }
    }
}

/// Member model names of a union, document order. Array branches are
/// recorded by their element type. Inline (non-reference) branches
/// cannot be named and are reported instead of silently dropped.
pub fn union_member_names(
    context: &str,
    branches: &[Schema],
    profile: &dyn LanguageProfile,
    diagnostics: &mut Diagnostics,
) -> Vec<String> {
    let mut members = Vec::with_capacity(branches.len());
    for branch in branches {
        match member_pointer(branch) {
            Some(pointer) => members.push(profile.type_name(simple_ref(pointer))),
            None => diagnostics.record(
                context,
                DiagnosticCode::UnknownPattern,
                "inline union branch has no name and was skipped",
            ),
        }
    }
    members
}

/// A branch's nameable pointer: its own `$ref`, or the element `$ref`
/// when the branch is an array.
fn member_pointer(branch: &Schema) -> Option<&str> {
    if let Some(pointer) = branch.reference.as_deref() {
        return Some(pointer);
    }
    branch
        .items
        .as_deref()
        .and_then(|items| items.reference.as_deref())
}

/// Ensure a synthetic union model for the given member set exists,
/// returning its name. Synthesis is idempotent per kind and ordered
/// member list: a second composition over the same members reuses the
/// first model.
pub fn ensure_union(
    kind: UnionKind,
    context: &str,
    members: Vec<String>,
    registry: &mut ModelRegistry,
    diagnostics: &mut Diagnostics,
) -> Option<String> {
    if members.is_empty() {
        diagnostics.record(
            context,
            DiagnosticCode::EmptyComposition,
            "union composition has no nameable members",
        );
        return None;
    }

    let key = format!("{}:{}", kind.prefix(), members.join("|"));
    if let Some(existing) = registry.synthetic_for(&key) {
        debug!(context, existing, "reusing synthetic union");
        return Some(existing.to_string());
    }

    let name = union_name(kind, context, registry);
    let mut model = Model::new(name.clone(), name.clone());
    model.is_synthetic = true;
    model.interfaces = members;
    registry.register(model);
    registry.index_synthetic(key, name.clone());
    Some(name)
}

/// `OneOf<Context>` / `AnyOf<Context>`, suffixed on the rare collision
/// with a document-defined model of the same name.
fn union_name(kind: UnionKind, context: &str, registry: &ModelRegistry) -> String {
    let base = format!("{}{}", kind.prefix(), to_pascal_case(context));
    if !registry.contains(&base) {
        return base;
    }
    let mut counter = 2;
    loop {
        let candidate = format!("{}{}", base, counter);
        if !registry.contains(&candidate) {
            warn!(base, candidate, "synthetic union name collided with a document model");
            return candidate;
        }
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BuildOptions;
    use crate::profile::DefaultProfile;
    use crate::schema::{ScalarKind, Schema, SchemaTable};

    fn pet_table() -> SchemaTable {
        let mut table = SchemaTable::new();
        table.insert(
            "Pet".to_string(),
            Schema::object(vec![
                ("id".to_string(), Schema::scalar(ScalarKind::Integer)),
                ("name".to_string(), Schema::scalar(ScalarKind::String)),
            ]),
        );
        table
    }

    #[test]
    fn test_all_of_sets_parent_and_flattens() {
        let table = pet_table();
        let mut resolver = RefResolver::new(&table);
        let mut diags = Diagnostics::new();
        let profile = DefaultProfile::new();

        let mut schema = Schema::default();
        schema.all_of = vec![
            Schema::reference("#/components/schemas/Pet"),
            Schema::object(vec![(
                "bark".to_string(),
                Schema::scalar(ScalarKind::Boolean),
            )]),
        ];

        let mut model = Model::new("Dog", "Dog");
        merge_all_of(
            &mut model,
            &schema,
            &mut resolver,
            &BuildOptions::default(),
            &profile,
            &mut diags,
        );

        assert_eq!(model.parent_name.as_deref(), Some("Pet"));
        assert!(model.has_property("bark"));
        // Parent-defined properties are not duplicated onto the child
        assert!(!model.has_property("id"));
        assert!(!model.has_property("name"));
    }

    #[test]
    fn test_all_of_child_cannot_override_parent_property() {
        let table = pet_table();
        let mut resolver = RefResolver::new(&table);
        let mut diags = Diagnostics::new();
        let profile = DefaultProfile::new();

        let mut schema = Schema::default();
        schema.all_of = vec![Schema::reference("#/components/schemas/Pet")];
        schema.properties = vec![
            ("name".to_string(), Schema::scalar(ScalarKind::Integer)),
            ("age".to_string(), Schema::scalar(ScalarKind::Integer)),
        ];

        let mut model = Model::new("Dog", "Dog");
        merge_all_of(
            &mut model,
            &schema,
            &mut resolver,
            &BuildOptions::default(),
            &profile,
            &mut diags,
        );

        assert!(model.has_property("age"));
        assert!(!model.has_property("name"));
    }

    #[test]
    fn test_flatten_composed_inlines_the_parent_branch() {
        let table = pet_table();
        let mut resolver = RefResolver::new(&table);
        let mut diags = Diagnostics::new();
        let profile = DefaultProfile::new();

        let mut schema = Schema::default();
        schema.all_of = vec![
            Schema::reference("#/components/schemas/Pet"),
            Schema::object(vec![(
                "bark".to_string(),
                Schema::scalar(ScalarKind::Boolean),
            )]),
        ];

        let options = BuildOptions {
            flatten_composed: true,
            ..BuildOptions::default()
        };
        let mut model = Model::new("Dog", "Dog");
        merge_all_of(&mut model, &schema, &mut resolver, &options, &profile, &mut diags);

        assert!(model.parent_name.is_none());
        assert!(model.has_property("id"));
        assert!(model.has_property("name"));
        assert!(model.has_property("bark"));
    }

    #[test]
    fn test_empty_all_of_degrades_to_empty_object() {
        let table = SchemaTable::new();
        let mut resolver = RefResolver::new(&table);
        let mut diags = Diagnostics::new();

        let mut schema = Schema::default();
        schema.all_of = vec![];

        let mut model = Model::new("Nothing", "Nothing");
        merge_all_of(
            &mut model,
            &schema,
            &mut resolver,
            &BuildOptions::default(),
            &DefaultProfile::new(),
            &mut diags,
        );

        assert!(model.parent_name.is_none());
        assert!(model.properties.is_empty());
        assert_eq!(diags.warning_count(), 1);
    }

    #[test]
    fn test_union_synthesis_is_idempotent() {
        let mut registry = ModelRegistry::new();
        let mut diags = Diagnostics::new();

        let first = ensure_union(
            UnionKind::OneOf,
            "Pet",
            vec!["Cat".to_string(), "Dog".to_string()],
            &mut registry,
            &mut diags,
        );
        let second = ensure_union(
            UnionKind::OneOf,
            "Shelter",
            vec!["Cat".to_string(), "Dog".to_string()],
            &mut registry,
            &mut diags,
        );

        assert_eq!(first.as_deref(), Some("OneOfPet"));
        assert_eq!(second.as_deref(), Some("OneOfPet"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_union_distinct_member_sets_get_distinct_models() {
        let mut registry = ModelRegistry::new();
        let mut diags = Diagnostics::new();

        ensure_union(
            UnionKind::OneOf,
            "Pet",
            vec!["Cat".to_string(), "Dog".to_string()],
            &mut registry,
            &mut diags,
        );
        ensure_union(
            UnionKind::OneOf,
            "Garage",
            vec!["Car".to_string(), "Bike".to_string()],
            &mut registry,
            &mut diags,
        );

        assert_eq!(registry.len(), 2);
        assert!(registry.contains("OneOfGarage"));
    }

    #[test]
    fn test_union_with_no_members_returns_none() {
        let mut registry = ModelRegistry::new();
        let mut diags = Diagnostics::new();

        let name = ensure_union(UnionKind::AnyOf, "Empty", vec![], &mut registry, &mut diags);
        assert!(name.is_none());
        assert_eq!(diags.warning_count(), 1);
    }
}
