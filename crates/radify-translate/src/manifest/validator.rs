//! Structural validation of a decoded manifest.

use radify_common::error::{RadifyError, Result};

use super::model::Manifest;

/// Validates a decoded manifest.
///
/// # Checks performed
///
/// 1. Every resource has a non-blank `type`, unless the producer recorded an
///    `error` for it.
///
/// # Errors
///
/// Returns [`RadifyError::MissingRequiredField`] naming the first offending
/// resource in name order.
pub fn validate(manifest: &Manifest) -> Result<()> {
    tracing::debug!("validating manifest structure");
    check_resource_types(manifest)
}

fn check_resource_types(manifest: &Manifest) -> Result<()> {
    for (name, resource) in &manifest.resources {
        if resource.is_producer_error() {
            continue;
        }
        if resource.resource_type.trim().is_empty() {
            return Err(RadifyError::MissingRequiredField {
                resource: Some(name.clone()),
                field: "type",
            });
        }
    }
    Ok(())
}
