//! Build configuration
//!
//! Boolean switches and knobs passed in by the orchestrating caller. These
//! only select which resolution branch is taken; they carry no naming or
//! rendering policy of their own.

use serde::{Deserialize, Serialize};

/// Options for one document build
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    /// Flatten allOf branches into the child instead of recording a parent
    pub flatten_composed: bool,

    /// Honor the `x-enum-values` vendor extension when present
    pub use_vendor_enum_extension: bool,

    /// Honor the `x-item-name` extension when naming array item properties
    pub use_item_name_extension: bool,

    /// Media types requested when none are passed explicitly
    pub default_media_types: Vec<String>,

    /// Recursion ceiling for example synthesis of pathological documents
    pub max_example_depth: usize,

    /// Seed for the example synthesizer's pseudo-random source
    pub example_seed: u64,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            flatten_composed: false,
            use_vendor_enum_extension: true,
            use_item_name_extension: true,
            default_media_types: vec!["application/json".to_string()],
            max_example_depth: 16,
            example_seed: 0x6d6f_6465_6c67,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = BuildOptions::default();
        assert!(!opts.flatten_composed);
        assert!(opts.use_vendor_enum_extension);
        assert_eq!(opts.default_media_types, vec!["application/json"]);
    }

    #[test]
    fn test_partial_deserialization() {
        let opts: BuildOptions =
            serde_json::from_str(r#"{"flatten_composed": true}"#).unwrap();
        assert!(opts.flatten_composed);
        assert!(opts.use_vendor_enum_extension);
    }
}
