//! Discriminator propagation
//!
//! Runs after every model is registered. For each parent carrying a
//! discriminator, the mapping entries pin the discriminant property on
//! each mapped subtype to the mapping key, so renderers can emit the tag
//! as a compile-time constant. The parent itself is never touched.

use tracing::debug;

use crate::diagnostics::Diagnostics;
use crate::model::ModelRegistry;
use crate::profile::LanguageProfile;
use crate::resolver::simple_ref;
use crate::schema::Discriminator;

/// Pin discriminant literals on every subtype mapped by `parent`'s
/// discriminator. A mapped schema that is missing from the registry, or
/// a subtype without the discriminant property, is reported and skipped.
pub fn propagate(
    parent: &str,
    discriminator: &Discriminator,
    registry: &mut ModelRegistry,
    profile: &dyn LanguageProfile,
    diagnostics: &mut Diagnostics,
) {
    for (value, target) in &discriminator.mapping {
        let child_name = profile.type_name(simple_ref(target));
        let Some(child) = registry.get_mut(&child_name) else {
            diagnostics.unresolved_ref(parent, target);
            continue;
        };
        match child.property_mut(&discriminator.property_name) {
            Some(property) => {
                debug!(
                    child = %child_name,
                    property = %discriminator.property_name,
                    value = %value,
                    "pinned discriminant literal"
                );
                property.discriminant_value = Some(value.clone());
            }
            None => {
                diagnostics.missing_discriminant(
                    child_name.clone(),
                    &discriminator.property_name,
                    parent,
                );
            }
        }
    }
}

/// Run [`propagate`] for every discriminator in the registry.
pub fn propagate_all(
    registry: &mut ModelRegistry,
    profile: &dyn LanguageProfile,
    diagnostics: &mut Diagnostics,
) {
    let discriminated: Vec<(String, Discriminator)> = registry
        .models()
        .filter_map(|m| m.discriminator.clone().map(|d| (m.name.clone(), d)))
        .collect();
    for (parent, discriminator) in discriminated {
        propagate(&parent, &discriminator, registry, profile, diagnostics);
    }
}
