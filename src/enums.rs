//! Enum member construction
//!
//! Two mutually exclusive strategies, tried in order:
//!
//! 1. vendor-supplied value list (`x-enum-values`), when enabled
//! 2. inline `enum` values, with the longest common prefix stripped from
//!    member names so `COLOR_RED, COLOR_GREEN` become `RED, GREEN`
//!
//! Member order always matches the source document.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

use crate::config::BuildOptions;
use crate::diagnostics::{DiagnosticCode, Diagnostics};
use crate::profile::LanguageProfile;
use crate::schema::Schema;

/// One resolved enum member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumMember {
    /// Target-language member name (profile-escaped)
    pub name: String,
    /// Literal value on the wire
    pub value: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Build the ordered member list for an enum schema.
///
/// Returns an empty list when the schema carries no enum values at all.
pub fn build_members(
    schema_name: &str,
    schema: &Schema,
    options: &BuildOptions,
    profile: &dyn LanguageProfile,
    diags: &mut Diagnostics,
) -> Vec<EnumMember> {
    if options.use_vendor_enum_extension && !schema.vendor_enum.is_empty() {
        if !schema.enum_values.is_empty() {
            diags.record(
                schema_name,
                DiagnosticCode::AmbiguousEnumStrategy,
                "both vendor value list and inline enum present; vendor list wins",
            );
        }
        debug!(schema = schema_name, "building enum from vendor value list");
        return schema
            .vendor_enum
            .iter()
            .map(|entry| EnumMember {
                name: profile.enum_member_name(&entry.identifier),
                value: entry.value.clone(),
                description: entry.description.clone(),
            })
            .collect();
    }

    if schema.enum_values.is_empty() {
        return Vec::new();
    }

    let stringified: Vec<String> = schema.enum_values.iter().map(stringify).collect();
    let prefix = common_member_prefix(&stringified);
    let truncate = prefix.len();

    let members: Vec<EnumMember> = stringified
        .iter()
        .zip(schema.enum_values.iter())
        .map(|(text, value)| {
            let member = member_name(text, truncate);
            EnumMember {
                name: profile.enum_member_name(&member),
                value: value.clone(),
                description: None,
            }
        })
        .collect();

    // The per-member fallback can collide with another member's suffix
    let mut seen = HashSet::new();
    for member in &members {
        if !seen.insert(member.name.as_str()) {
            diags.record(
                schema_name,
                DiagnosticCode::EnumMemberConflict,
                format!("member name '{}' produced more than once", member.name),
            );
        }
    }
    members
}

/// Member name after prefix stripping. A member whose stripped name would
/// be empty keeps its unstripped value; the rest still strip.
fn member_name(value: &str, truncate: usize) -> String {
    if truncate == 0 || truncate >= value.len() {
        // Stripping would empty this one member; keep it whole.
        return value.to_string();
    }
    value[truncate..].to_string()
}

/// Longest common prefix across all stringified values, with the trailing
/// alphanumeric run excluded so the cut lands on a separator:
/// `["status-on", "status-off"]` yields `"status-"`, not `"status-o"`.
/// Empty when fewer than two values are present.
fn common_member_prefix(values: &[String]) -> String {
    if values.len() < 2 {
        return String::new();
    }

    let first = &values[0];
    let mut len = first.len();
    for value in &values[1..] {
        len = first
            .bytes()
            .zip(value.bytes())
            .take(len)
            .take_while(|(a, b)| a == b)
            .count();
        if len == 0 {
            return String::new();
        }
    }
    while !first.is_char_boundary(len) {
        len -= 1;
    }

    let mut prefix = &first[..len];
    while let Some(last) = prefix.chars().last() {
        if !last.is_ascii_alphanumeric() {
            break;
        }
        prefix = &prefix[..prefix.len() - last.len_utf8()];
    }
    prefix.to_string()
}

fn stringify(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::DefaultProfile;

    fn inline_enum(values: &[&str]) -> Schema {
        let mut schema = Schema::scalar(crate::schema::ScalarKind::String);
        schema.enum_values = values
            .iter()
            .map(|v| serde_json::Value::String(v.to_string()))
            .collect();
        schema
    }

    fn build(schema: &Schema) -> Vec<EnumMember> {
        let mut diags = Diagnostics::new();
        build_members(
            "Test",
            schema,
            &BuildOptions::default(),
            &DefaultProfile::new(),
            &mut diags,
        )
    }

    #[test]
    fn test_common_prefix_stripping() {
        let schema = inline_enum(&["COLOR_RED", "COLOR_GREEN", "COLOR_BLUE"]);
        let members = build(&schema);
        let names: Vec<&str> = members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["RED", "GREEN", "BLUE"]);
        // Values stay unstripped
        assert_eq!(members[0].value, serde_json::json!("COLOR_RED"));
    }

    #[test]
    fn test_prefix_cut_lands_on_separator() {
        let schema = inline_enum(&["status-on", "status-off"]);
        let members = build(&schema);
        let names: Vec<&str> = members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["on", "off"]);
    }

    #[test]
    fn test_no_stripping_that_empties_a_name() {
        // Common prefix "A" is all alphanumeric, so nothing is stripped.
        let schema = inline_enum(&["A", "AB"]);
        let members = build(&schema);
        let names: Vec<&str> = members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["A", "AB"]);
    }

    #[test]
    fn test_per_member_fallback() {
        // Prefix "X_" strips cleanly from two members; the member that is
        // exactly the prefix keeps its unstripped value.
        let schema = inline_enum(&["X_", "X_A", "X_B"]);
        let members = build(&schema);
        let names: Vec<&str> = members.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["X_", "A", "B"]);
    }

    #[test]
    fn test_colliding_fallback_reports_conflict() {
        // The fallback member "X_" collides with the stripped "X_X_".
        let schema = inline_enum(&["X_", "X_X_"]);
        let mut diags = Diagnostics::new();
        let members = build_members(
            "Test",
            &schema,
            &BuildOptions::default(),
            &DefaultProfile::new(),
            &mut diags,
        );

        assert_eq!(members[0].name, members[1].name);
        assert!(diags.has_errors());
    }

    #[test]
    fn test_single_value_not_stripped() {
        let schema = inline_enum(&["ONLY_ONE"]);
        let members = build(&schema);
        assert_eq!(members[0].name, "ONLY_ONE");
    }

    #[test]
    fn test_vendor_list_wins_with_warning() {
        let mut schema = inline_enum(&["LOW", "HIGH"]);
        schema.vendor_enum = vec![
            crate::schema::VendorEnumEntry {
                identifier: "Low".to_string(),
                value: serde_json::json!(1),
                description: Some("low priority".to_string()),
            },
            crate::schema::VendorEnumEntry {
                identifier: "High".to_string(),
                value: serde_json::json!(2),
                description: None,
            },
        ];

        let mut diags = Diagnostics::new();
        let members = build_members(
            "Priority",
            &schema,
            &BuildOptions::default(),
            &DefaultProfile::new(),
            &mut diags,
        );

        assert_eq!(members.len(), 2);
        assert_eq!(members[0].name, "Low");
        assert_eq!(members[0].value, serde_json::json!(1));
        assert_eq!(diags.warning_count(), 1);
    }

    #[test]
    fn test_numeric_enum_members() {
        let mut schema = Schema::scalar(crate::schema::ScalarKind::Integer);
        schema.enum_values = vec![serde_json::json!(1), serde_json::json!(2)];
        let members = build(&schema);
        // Leading digits are escaped by the profile
        assert_eq!(members[0].name, "_1");
        assert_eq!(members[0].value, serde_json::json!(1));
    }
}
