//! Resolved models and the per-build registry
//!
//! The registry is an arena keyed by model name. Cycle breaking relies on
//! register-then-fill ordering: a model's name is registered before its
//! properties finish resolving, so a re-entrant visit links to the
//! (possibly still incomplete) entry by name instead of recursing.
//!
//! One registry belongs to exactly one document build. It is handed off
//! by value to the rendering stage and discarded afterwards.

use petgraph::algo::kosaraju_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::enums::EnumMember;
use crate::property::{ContainerKind, Property, TypeRef};
use crate::schema::Discriminator;

// =============================================================================
// Model
// =============================================================================

/// A resolved, named record type in the intermediate representation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Model {
    /// Registry key (document name, reserved-word escaped)
    pub name: String,
    /// Target-language type name
    pub class_name: String,
    pub description: Option<String>,

    /// Resolved fields in document order; wire names are unique
    pub properties: Vec<Property>,

    /// Parent set by allOf merge (single-parent inheritance)
    pub parent_name: Option<String>,

    pub is_enum: bool,
    pub enum_members: Vec<EnumMember>,

    /// For a document model: referenced allOf branches beyond the parent,
    /// properties flattened in. For a synthetic union: the member model
    /// names in document order.
    pub interfaces: Vec<String>,

    pub discriminator: Option<Discriminator>,

    /// True for generated `OneOf*`/`AnyOf*` wrappers
    pub is_synthetic: bool,
}

impl Model {
    pub fn new(name: impl Into<String>, class_name: impl Into<String>) -> Self {
        Model {
            name: name.into(),
            class_name: class_name.into(),
            description: None,
            properties: Vec::new(),
            parent_name: None,
            is_enum: false,
            enum_members: Vec::new(),
            interfaces: Vec::new(),
            discriminator: None,
            is_synthetic: false,
        }
    }

    pub fn property(&self, base_name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.base_name == base_name)
    }

    pub fn property_mut(&mut self, base_name: &str) -> Option<&mut Property> {
        self.properties.iter_mut().find(|p| p.base_name == base_name)
    }

    pub fn has_property(&self, base_name: &str) -> bool {
        self.property(base_name).is_some()
    }

    /// Push a property unless one with the same wire name already exists.
    /// Returns false on the duplicate.
    pub fn push_property(&mut self, property: Property) -> bool {
        if self.has_property(&property.base_name) {
            return false;
        }
        self.properties.push(property);
        true
    }

    /// Model names this model depends on: parent, property types through
    /// their item chains, and interfaces.
    fn dependencies(&self) -> Vec<&str> {
        let mut deps = Vec::new();
        if let Some(parent) = &self.parent_name {
            deps.push(parent.as_str());
        }
        for property in &self.properties {
            let mut current = Some(property);
            while let Some(p) = current {
                if let TypeRef::Model(name) = &p.type_ref {
                    deps.push(name.as_str());
                }
                current = match p.container {
                    ContainerKind::None => None,
                    _ => p.item.as_deref(),
                };
            }
        }
        for interface in &self.interfaces {
            deps.push(interface.as_str());
        }
        deps
    }
}

// =============================================================================
// Model Registry
// =============================================================================

/// Arena of models for one document build.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: HashMap<String, Model>,
    /// Registration order, for deterministic iteration
    order: Vec<String>,
    /// union member-set key -> synthetic model name
    synthetic_index: HashMap<String, String>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model, placeholder or complete. Overwrites a placeholder
    /// with the same name (the fill step of register-then-fill).
    pub fn register(&mut self, model: Model) {
        if !self.models.contains_key(&model.name) {
            self.order.push(model.name.clone());
        }
        self.models.insert(model.name.clone(), model);
    }

    pub fn get(&self, name: &str) -> Option<&Model> {
        self.models.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Model> {
        self.models.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    /// Model names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn models(&self) -> impl Iterator<Item = &Model> {
        self.order.iter().filter_map(|name| self.models.get(name))
    }

    /// Synthetic union/interface models, registration order
    pub fn synthetic_models(&self) -> impl Iterator<Item = &Model> {
        self.models().filter(|m| m.is_synthetic)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Look up an already-synthesized union model by member-set key
    pub fn synthetic_for(&self, member_key: &str) -> Option<&str> {
        self.synthetic_index.get(member_key).map(String::as_str)
    }

    /// Record a synthesized union model under its member-set key
    pub fn index_synthetic(&mut self, member_key: String, model_name: String) {
        self.synthetic_index.insert(member_key, model_name);
    }

    /// Model names ordered dependencies-first, SCC members grouped
    /// together. Renderers that emit forward declarations rely on this.
    pub fn dependency_order(&self) -> Vec<&str> {
        let graph = self.dependency_graph();

        // kosaraju_scc returns SCCs in reverse topological order of the
        // condensation; with edges pointing model -> dependency that is
        // dependencies-first.
        let mut result = Vec::with_capacity(self.order.len());
        for scc in kosaraju_scc(&graph) {
            for idx in scc {
                result.push(graph[idx]);
            }
        }
        result
    }

    /// Groups of mutually referential models (size > 1)
    pub fn cycle_groups(&self) -> Vec<Vec<&str>> {
        let graph = self.dependency_graph();
        kosaraju_scc(&graph)
            .into_iter()
            .filter(|scc| scc.len() > 1)
            .map(|scc| scc.into_iter().map(|idx| graph[idx]).collect())
            .collect()
    }

    fn dependency_graph(&self) -> DiGraph<&str, ()> {
        let mut graph = DiGraph::with_capacity(self.order.len(), self.order.len() * 2);
        let mut indices: HashMap<&str, NodeIndex> = HashMap::with_capacity(self.order.len());

        for name in &self.order {
            let idx = graph.add_node(name.as_str());
            indices.insert(name.as_str(), idx);
        }
        for model in self.models() {
            let from = indices[model.name.as_str()];
            for dep in model.dependencies() {
                // dangling links (unresolved refs) get no edge
                if let Some(&to) = indices.get(dep) {
                    graph.add_edge(from, to, ());
                }
            }
        }

        graph
    }
}
