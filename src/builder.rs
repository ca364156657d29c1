//! Whole-document model construction
//!
//! Drives one pass over the schema table: every named schema gets a
//! placeholder registered before its body resolves (register-then-fill),
//! property-level compositions get synthetic unions, dangling references
//! get empty stand-in models, and the discriminator pass runs last. The
//! outcome is a registry the caller owns outright plus the diagnostics
//! accumulated along the way.

use tracing::{debug, warn};

use crate::compose::{self, UnionKind};
use crate::config::BuildOptions;
use crate::diagnostics::Diagnostics;
use crate::discriminator;
use crate::enums::build_members;
use crate::model::{Model, ModelRegistry};
use crate::profile::{to_pascal_case, LanguageProfile};
use crate::property::{resolve_property, Property, TypeRef};
use crate::resolver::RefResolver;
use crate::schema::{Schema, SchemaKind, SchemaTable};

/// Result of one document build: the registry is complete (possibly
/// degraded in places) even when diagnostics carry warnings.
#[derive(Debug)]
pub struct BuildOutcome {
    pub registry: ModelRegistry,
    pub diagnostics: Diagnostics,
}

/// One-shot builder over a loaded schema table.
pub struct ModelBuilder<'a> {
    table: &'a SchemaTable,
    profile: &'a dyn LanguageProfile,
    options: &'a BuildOptions,
}

impl<'a> ModelBuilder<'a> {
    pub fn new(
        table: &'a SchemaTable,
        profile: &'a dyn LanguageProfile,
        options: &'a BuildOptions,
    ) -> Self {
        Self {
            table,
            profile,
            options,
        }
    }

    /// Build every named schema in document order, then run the
    /// discriminator pass. Never fails: malformed subtrees degrade and
    /// are reported through the returned diagnostics.
    pub fn build_document(&self) -> BuildOutcome {
        let mut registry = ModelRegistry::new();
        let mut diagnostics = Diagnostics::new();
        let mut resolver = RefResolver::new(self.table);

        for (name, schema) in self.table.iter() {
            resolver.reset();
            self.build_model(name, schema, &mut registry, &mut resolver, &mut diagnostics);
        }

        self.register_dangling_targets(&mut registry, &mut diagnostics);
        discriminator::propagate_all(&mut registry, self.profile, &mut diagnostics);

        debug!(
            models = registry.len(),
            warnings = diagnostics.warning_count(),
            errors = diagnostics.error_count(),
            "document build finished"
        );
        BuildOutcome {
            registry,
            diagnostics,
        }
    }

    fn build_model(
        &self,
        name: &str,
        schema: &Schema,
        registry: &mut ModelRegistry,
        resolver: &mut RefResolver<'_>,
        diagnostics: &mut Diagnostics,
    ) {
        let class_name = self.profile.type_name(name);
        if registry.contains(&class_name) {
            return;
        }
        // Placeholder first: a re-entrant visit through a reference cycle
        // links to this entry by name instead of recursing.
        registry.register(Model::new(class_name.clone(), class_name.clone()));

        let mut model = Model::new(class_name.clone(), class_name.clone());
        model.description = schema.description.clone();
        model.discriminator = schema.discriminator.clone();

        if schema.has_enum() || schema.extension(crate::schema::VENDOR_ENUM_EXT).is_some() {
            model.is_enum = true;
            model.enum_members =
                build_members(&class_name, schema, self.options, self.profile, diagnostics);
        } else if !schema.all_of.is_empty() {
            compose::merge_all_of(
                &mut model,
                schema,
                resolver,
                self.options,
                self.profile,
                diagnostics,
            );
            self.attach_property_unions(&mut model, schema, registry, diagnostics);
        } else if !schema.one_of.is_empty() || !schema.any_of.is_empty() {
            self.build_union_alias(&mut model, schema, registry, diagnostics);
        } else {
            match schema.kind() {
                SchemaKind::Array | SchemaKind::Map => {
                    // Alias model wrapping a container; the single
                    // property carries the element chain.
                    let property =
                        resolve_property(name, schema, self.options, self.profile, diagnostics);
                    model.properties.push(property);
                }
                _ => {
                    for (property_name, property_schema) in &schema.properties {
                        let mut property = resolve_property(
                            property_name,
                            property_schema,
                            self.options,
                            self.profile,
                            diagnostics,
                        );
                        property.required = schema.required.contains(property_name);
                        model.push_property(property);
                    }
                    self.attach_property_unions(&mut model, schema, registry, diagnostics);
                }
            }
        }

        registry.register(model);
    }

    /// Top-level oneOf/anyOf: the document name becomes an alias of a
    /// synthetic union so identical member-sets elsewhere reuse it.
    fn build_union_alias(
        &self,
        model: &mut Model,
        schema: &Schema,
        registry: &mut ModelRegistry,
        diagnostics: &mut Diagnostics,
    ) {
        let (kind, branches) = if schema.one_of.is_empty() {
            (UnionKind::AnyOf, &schema.any_of)
        } else {
            (UnionKind::OneOf, &schema.one_of)
        };
        let members =
            compose::union_member_names(&model.name, branches, self.profile, diagnostics);
        match compose::ensure_union(kind, &model.name, members, registry, diagnostics) {
            Some(union_name) => {
                debug!(model = %model.name, union = %union_name, "document model aliases union");
                model.parent_name = Some(union_name);
            }
            None => {
                warn!(model = %model.name, "union with no members degrades to empty object");
            }
        }
    }

    /// Replace object-typed leaves with synthetic unions for properties
    /// whose schema (or element chain) carries oneOf/anyOf.
    fn attach_property_unions(
        &self,
        model: &mut Model,
        schema: &Schema,
        registry: &mut ModelRegistry,
        diagnostics: &mut Diagnostics,
    ) {
        for (property_name, property_schema) in &schema.properties {
            let base_schema = base_item_schema(property_schema);
            let (kind, branches) = if !base_schema.one_of.is_empty() {
                (UnionKind::OneOf, &base_schema.one_of)
            } else if !base_schema.any_of.is_empty() {
                (UnionKind::AnyOf, &base_schema.any_of)
            } else {
                continue;
            };

            let context = format!("{}{}", model.name, to_pascal_case(property_name));
            let members =
                compose::union_member_names(&context, branches, self.profile, diagnostics);
            let Some(union_name) =
                compose::ensure_union(kind, &context, members, registry, diagnostics)
            else {
                continue;
            };
            if let Some(property) = model.property_mut(property_name) {
                let leaf = base_items_mut(property);
                leaf.type_ref = TypeRef::Model(union_name);
            }
        }
    }

    /// Register an empty stand-in model for every referenced name that
    /// exists in neither the table nor the registry, so sibling models
    /// and example synthesis keep working.
    fn register_dangling_targets(
        &self,
        registry: &mut ModelRegistry,
        diagnostics: &mut Diagnostics,
    ) {
        let mut dangling: Vec<(String, String)> = Vec::new();
        for model in registry.models() {
            for property in &model.properties {
                let mut current = Some(property);
                while let Some(p) = current {
                    if let TypeRef::Model(target) = &p.type_ref {
                        if !registry.contains(target) && !self.table.contains(target) {
                            dangling.push((model.name.clone(), target.clone()));
                        }
                    }
                    current = p.item.as_deref();
                }
            }
        }
        for (source, target) in dangling {
            if registry.contains(&target) {
                continue;
            }
            diagnostics.unresolved_ref(source, &target);
            registry.register(Model::new(target.clone(), target));
        }
    }
}

/// Schema analogue of [`base_items`]: the element schema at the bottom
/// of an array/map chain.
fn base_item_schema(schema: &Schema) -> &Schema {
    let mut current = schema;
    loop {
        let next = match current.kind() {
            SchemaKind::Array => current.items.as_deref(),
            SchemaKind::Map => current.additional.as_deref(),
            _ => None,
        };
        match next {
            Some(inner) => current = inner,
            None => return current,
        }
    }
}

fn base_items_mut(property: &mut Property) -> &mut Property {
    use crate::property::ContainerKind;
    let mut current = property;
    // is_some() in the condition keeps the unwrap total
    while current.container != ContainerKind::None && current.item.is_some() {
        current = current.item.as_deref_mut().unwrap();
    }
    current
}
