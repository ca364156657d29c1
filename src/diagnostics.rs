//! Diagnostics
//!
//! Collects warnings and errors recorded while a document is resolved.
//! The build itself never aborts on these: a degraded subtree records an
//! item here and resolution continues with the siblings.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Diagnostic Codes
// =============================================================================

/// Diagnostic code for categorizing issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticCode {
    // === Reference resolution ===
    /// $ref target not found in the schema table
    UnresolvedRef,
    /// Reference cycle hit during traversal (informational, handled)
    CycleDetected,

    // === Composition ===
    /// allOf/oneOf/anyOf with no resolvable branch
    EmptyComposition,
    /// More than one referenced allOf parent; only the first is honored
    MultipleParents,

    // === Enums ===
    /// Both vendor value list and inline enum present; vendor list wins
    AmbiguousEnumStrategy,
    /// Enum members would collide after prefix stripping
    EnumMemberConflict,

    // === Discriminators ===
    /// Discriminator mapping names a property the child model lacks
    MissingDiscriminantProperty,

    // === General ===
    /// Two properties with the same wire name merged into one model
    DuplicateProperty,
    /// Schema pattern the builder does not recognize
    UnknownPattern,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnresolvedRef => "W001",
            Self::CycleDetected => "I001",
            Self::EmptyComposition => "W002",
            Self::MultipleParents => "W003",
            Self::AmbiguousEnumStrategy => "W004",
            Self::EnumMemberConflict => "E001",
            Self::MissingDiscriminantProperty => "W005",
            Self::DuplicateProperty => "W006",
            Self::UnknownPattern => "W007",
        }
    }

    pub fn severity(&self) -> Severity {
        match self {
            Self::EnumMemberConflict => Severity::Error,

            Self::UnresolvedRef
            | Self::EmptyComposition
            | Self::MultipleParents
            | Self::AmbiguousEnumStrategy
            | Self::MissingDiscriminantProperty
            | Self::DuplicateProperty
            | Self::UnknownPattern => Severity::Warning,

            Self::CycleDetected => Severity::Info,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Severity
// =============================================================================

/// Diagnostic severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

// =============================================================================
// Diagnostic Item
// =============================================================================

/// A single diagnostic item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticItem {
    /// Schema that caused this diagnostic
    pub schema_name: String,
    /// Diagnostic code
    pub code: DiagnosticCode,
    /// Human-readable message
    pub message: String,
    /// Additional context (related schemas, property names)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<String>,
}

impl DiagnosticItem {
    pub fn new(
        schema_name: impl Into<String>,
        code: DiagnosticCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            schema_name: schema_name.into(),
            code,
            message: message.into(),
            context: Vec::new(),
        }
    }

    pub fn with_context(mut self, ctx: impl Into<String>) -> Self {
        self.context.push(ctx.into());
        self
    }

    pub fn severity(&self) -> Severity {
        self.code.severity()
    }
}

impl fmt::Display for DiagnosticItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {} ({})",
            self.code,
            self.code.severity(),
            self.message,
            self.schema_name
        )?;

        for ctx in &self.context {
            write!(f, "\n  - {}", ctx)?;
        }

        Ok(())
    }
}

// =============================================================================
// Diagnostics Collection
// =============================================================================

/// Collection of diagnostics from one document build
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    items: Vec<DiagnosticItem>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic item
    pub fn push(&mut self, item: DiagnosticItem) {
        self.items.push(item);
    }

    /// Record a diagnostic by code
    pub fn record(
        &mut self,
        schema_name: impl Into<String>,
        code: DiagnosticCode,
        message: impl Into<String>,
    ) {
        self.push(DiagnosticItem::new(schema_name, code, message));
    }

    /// Record an unresolved $ref
    pub fn unresolved_ref(&mut self, schema_name: impl Into<String>, pointer: &str) {
        self.push(DiagnosticItem::new(
            schema_name,
            DiagnosticCode::UnresolvedRef,
            format!("$ref target '{}' not found in schema table", pointer),
        ));
    }

    /// Record a missing discriminant property on a mapped subtype
    pub fn missing_discriminant(
        &mut self,
        child: impl Into<String>,
        property_name: &str,
        parent: &str,
    ) {
        self.push(
            DiagnosticItem::new(
                child,
                DiagnosticCode::MissingDiscriminantProperty,
                format!("discriminant property '{}' not present", property_name),
            )
            .with_context(format!("discriminator declared on '{}'", parent)),
        );
    }

    /// Check if there are any errors
    pub fn has_errors(&self) -> bool {
        self.items.iter().any(|i| i.severity() == Severity::Error)
    }

    /// Get all errors
    pub fn errors(&self) -> impl Iterator<Item = &DiagnosticItem> {
        self.items.iter().filter(|i| i.severity() == Severity::Error)
    }

    /// Get all warnings
    pub fn warnings(&self) -> impl Iterator<Item = &DiagnosticItem> {
        self.items
            .iter()
            .filter(|i| i.severity() == Severity::Warning)
    }

    /// Get all items
    pub fn all(&self) -> &[DiagnosticItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    /// Merge another Diagnostics into this one
    pub fn merge(&mut self, other: Diagnostics) {
        self.items.extend(other.items);
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for item in &self.items {
            writeln!(f, "{}", item)?;
        }
        if !self.is_empty() {
            writeln!(
                f,
                "{} error(s), {} warning(s)",
                self.error_count(),
                self.warning_count()
            )?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a DiagnosticItem;
    type IntoIter = std::slice::Iter<'a, DiagnosticItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_mapping() {
        assert_eq!(DiagnosticCode::UnresolvedRef.severity(), Severity::Warning);
        assert_eq!(DiagnosticCode::CycleDetected.severity(), Severity::Info);
        assert_eq!(
            DiagnosticCode::EnumMemberConflict.severity(),
            Severity::Error
        );
    }

    #[test]
    fn test_collection() {
        let mut diags = Diagnostics::new();
        diags.unresolved_ref("Pet", "#/components/schemas/Missing");
        diags.record(
            "Order",
            DiagnosticCode::AmbiguousEnumStrategy,
            "vendor list wins",
        );

        assert_eq!(diags.warning_count(), 2);
        assert!(!diags.has_errors());
    }
}
