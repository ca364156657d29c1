//! Language profiles
//!
//! Per-target-language naming and type policy, injected into the core as a
//! single capability trait. The core owns no naming policy itself: it asks
//! the profile to escape reserved words, case identifiers, and map
//! primitive types, and records whatever comes back.

use std::collections::HashSet;

use crate::schema::ScalarKind;

/// Per-target naming/escaping/type-mapping rules.
///
/// Implemented once per target language by the rendering stage; the model
/// builder, composition resolver and enum builder call into it.
pub trait LanguageProfile {
    /// Escape a reserved word into a usable identifier
    fn escape_reserved(&self, name: &str) -> String;

    /// Whether a raw identifier is reserved in the target language
    fn is_reserved(&self, name: &str) -> bool;

    /// Type name for a model (PascalCase in most targets)
    fn type_name(&self, raw: &str) -> String {
        let candidate = to_pascal_case(raw);
        if self.is_reserved(&candidate) {
            self.escape_reserved(&candidate)
        } else {
            candidate
        }
    }

    /// Variable/property name
    fn var_name(&self, raw: &str) -> String {
        let candidate = to_snake_case(raw);
        if self.is_reserved(&candidate) {
            self.escape_reserved(&candidate)
        } else {
            candidate
        }
    }

    /// Member name for an enum value
    fn enum_member_name(&self, raw: &str) -> String {
        let candidate = sanitize_member(raw);
        if self.is_reserved(&candidate) {
            self.escape_reserved(&candidate)
        } else {
            candidate
        }
    }

    /// Name of the enum type derived from the property carrying it
    fn enum_type_name(&self, property_name: &str) -> String {
        format!("{}Enum", to_pascal_case(property_name))
    }

    /// Map a scalar kind + optional format to the target's primitive tag
    fn map_primitive(&self, kind: ScalarKind, format: Option<&str>) -> String;
}

// =============================================================================
// Default profile
// =============================================================================

/// Target-neutral profile used when no renderer has been wired up yet.
/// Primitive tags stay wire-level (`string`, `integer`, ...), reserved
/// words are the small set shared across common targets.
#[derive(Debug, Clone)]
pub struct DefaultProfile {
    reserved: HashSet<String>,
}

impl Default for DefaultProfile {
    fn default() -> Self {
        let reserved = [
            "type", "class", "enum", "default", "static", "const", "return",
            "break", "continue", "for", "while", "if", "else", "match", "new",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        Self { reserved }
    }
}

impl DefaultProfile {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LanguageProfile for DefaultProfile {
    fn escape_reserved(&self, name: &str) -> String {
        format!("_{}", name)
    }

    fn is_reserved(&self, name: &str) -> bool {
        self.reserved.contains(name)
    }

    fn map_primitive(&self, kind: ScalarKind, _format: Option<&str>) -> String {
        kind.as_str().to_string()
    }
}

// =============================================================================
// Casing helpers
// =============================================================================

/// Convert to PascalCase, splitting on `_`, `-` and spaces.
/// Identifiers without separators keep their existing casing so that
/// already-PascalCase names round-trip unchanged.
pub fn to_pascal_case(s: &str) -> String {
    if !s.contains('_') && !s.contains('-') && !s.contains(' ') {
        let mut chars = s.chars();
        return match chars.next() {
            None => String::new(),
            Some(first) => first.to_uppercase().chain(chars).collect(),
        };
    }

    let mut result = String::with_capacity(s.len());
    let mut capitalize_next = true;
    for c in s.chars() {
        if c == '_' || c == '-' || c == ' ' {
            capitalize_next = true;
        } else if capitalize_next {
            result.extend(c.to_uppercase());
            capitalize_next = false;
        } else {
            result.push(c);
        }
    }
    result
}

/// Convert to snake_case
pub fn to_snake_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    let mut prev_lower = false;
    for c in s.chars() {
        if c == '-' || c == ' ' {
            result.push('_');
            prev_lower = false;
        } else if c.is_ascii_uppercase() {
            if prev_lower {
                result.push('_');
            }
            result.push(c.to_ascii_lowercase());
            prev_lower = false;
        } else {
            prev_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
            result.push(c);
        }
    }
    result
}

/// Sanitize an enum member name: replace characters that cannot appear in
/// identifiers, prefix a leading digit.
fn sanitize_member(raw: &str) -> String {
    let mut name: String = raw
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    if name.chars().next().map(|c| c.is_ascii_digit()).unwrap_or(false) {
        name.insert(0, '_');
    }
    if name.is_empty() {
        name.push('_');
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pascal_case() {
        assert_eq!(to_pascal_case("pet_store"), "PetStore");
        assert_eq!(to_pascal_case("pet-store"), "PetStore");
        assert_eq!(to_pascal_case("Pet"), "Pet");
        // Already PascalCase round-trips, acronyms intact
        assert_eq!(to_pascal_case("APIResponse"), "APIResponse");
    }

    #[test]
    fn test_snake_case() {
        assert_eq!(to_snake_case("petStore"), "pet_store");
        assert_eq!(to_snake_case("PetStore"), "pet_store");
        assert_eq!(to_snake_case("pet-store"), "pet_store");
    }

    #[test]
    fn test_reserved_escaping() {
        let profile = DefaultProfile::new();
        assert_eq!(profile.var_name("type"), "_type");
        assert_eq!(profile.var_name("name"), "name");
    }

    #[test]
    fn test_enum_member_sanitization() {
        let profile = DefaultProfile::new();
        assert_eq!(profile.enum_member_name("RED"), "RED");
        assert_eq!(profile.enum_member_name("in progress"), "in_progress");
        assert_eq!(profile.enum_member_name("1st"), "_1st");
    }
}
