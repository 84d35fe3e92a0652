//! Resource classification.

use std::collections::BTreeMap;

use radify_common::types::ResourceKind;

use crate::detector;
use crate::manifest::ManifestResource;

/// Determines the kind of a manifest resource.
///
/// Precedence:
///
/// 1. An explicit override for `name`.
/// 2. `container.v*`: a detected backing service, otherwise a container.
/// 3. `project.v*`: a container (its image comes from the image mappings).
/// 4. `value.v0`: an inlined value.
/// 5. `parameter.v0`: a parameter.
/// 6. Anything else is unsupported.
#[must_use]
pub fn classify(
    name: &str,
    resource: &ManifestResource,
    overrides: &BTreeMap<String, ResourceKind>,
) -> ResourceKind {
    if let Some(&kind) = overrides.get(name) {
        tracing::debug!(resource = name, %kind, "using resource override");
        return kind;
    }

    let resource_type = resource.resource_type.as_str();
    if resource.is_container() {
        return resource
            .image
            .as_deref()
            .and_then(detector::detect)
            .map_or(ResourceKind::Container, ResourceKind::Portable);
    }
    if resource.is_project() {
        return ResourceKind::Container;
    }
    match resource_type {
        "value.v0" => ResourceKind::Value,
        "parameter.v0" => ResourceKind::Parameter,
        _ => ResourceKind::Unsupported,
    }
}
