//! Model Generation Core
//!
//! Resolves a loaded JSON schema document into an intermediate model
//! representation for API code generators, and synthesizes deterministic
//! example payloads for documentation and generated tests.
//!
//! ## Features
//!
//! - **Reference Resolution**: cycle-safe `$ref` lookup over the document's
//!   schema table
//! - **Composition**: allOf single-parent inheritance with property
//!   flattening, oneOf/anyOf synthetic union models
//! - **Enum Construction**: vendor value lists and inline enums with
//!   common-prefix stripping
//! - **Discriminators**: mapping literals pinned onto subtype properties
//!   for tagged-union emission
//! - **Example Synthesis**: seeded, reproducible sample payloads per
//!   media type
//!
//! ## Pipeline
//!
//! ```text
//! parsed document (serde_json::Value)
//!   └─ SchemaTable::from_document
//!        └─ ModelBuilder::build_document ── Diagnostics
//!             └─ ModelRegistry (frozen) ──> rendering stage
//!   └─ ExampleGenerator::generate ──> (content type, body) entries
//! ```
//!
//! The build never aborts on malformed input: degraded subtrees become
//! empty models or placeholder examples, reported through [`Diagnostics`].

pub mod builder;
pub mod compose;
pub mod config;
pub mod diagnostics;
pub mod discriminator;
pub mod enums;
pub mod error;
pub mod example;
pub mod model;
pub mod profile;
pub mod property;
pub mod resolver;
pub mod schema;

pub use builder::{BuildOutcome, ModelBuilder};
pub use config::BuildOptions;
pub use diagnostics::{DiagnosticCode, DiagnosticItem, Diagnostics, Severity};
pub use enums::EnumMember;
pub use error::{ModelError, Result};
pub use example::{ExampleGenerator, MediaExample};
pub use model::{Model, ModelRegistry};
pub use profile::{DefaultProfile, LanguageProfile};
pub use property::{base_items, ContainerKind, Property, TypeRef};
pub use resolver::{RefResolver, Resolution};
pub use schema::{Discriminator, ScalarKind, Schema, SchemaKind, SchemaTable};
