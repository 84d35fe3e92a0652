//! Unified error types for the radify workspace.
//!
//! Every fatal condition of the translation pipeline maps to exactly one
//! variant. Non-fatal conditions (skipped resources) are reported as warning
//! strings alongside a successful result and never appear here.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum RadifyError {
    /// The manifest file does not exist.
    #[error("manifest file not found: {}", path.display())]
    FileNotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// An I/O operation failed.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The manifest bytes are not valid JSON for the manifest model.
    #[error("failed to parse manifest: {message}")]
    MalformedInput {
        /// Decoder message, including line and column.
        message: String,
    },

    /// A required manifest field is absent.
    #[error("failed to parse manifest: {}", describe_missing(resource.as_deref(), field))]
    MissingRequiredField {
        /// Resource lacking the field, or `None` for a top-level field.
        resource: Option<String>,
        /// Name of the missing field.
        field: &'static str,
    },

    /// A project resource has no externally supplied image.
    #[error("project resource \"{name}\" requires an image mapping")]
    MissingImageMapping {
        /// Resource name from the manifest.
        name: String,
    },

    /// A container resource has no image.
    #[error("container resource \"{name}\" has no image")]
    MissingImage {
        /// Resource name from the manifest.
        name: String,
    },

    /// An expression references a resource absent from the manifest.
    #[error("expression in resource \"{source_resource}\" references unknown resource \"{target}\"")]
    UnknownResource {
        /// Resource containing the expression.
        source_resource: String,
        /// Name that could not be found.
        target: String,
    },

    /// An expression references a binding the target does not declare.
    #[error("expression {expression} references unknown binding \"{binding}\" on resource \"{resource}\"")]
    UnknownBinding {
        /// Referenced resource.
        resource: String,
        /// Binding name that could not be found.
        binding: String,
        /// Raw expression text.
        expression: String,
    },

    /// An expression uses a property path the resolver does not understand.
    #[error("unsupported expression syntax in resource \"{resource}\": {expression}")]
    UnsupportedExpression {
        /// Referenced resource.
        resource: String,
        /// Raw expression text.
        expression: String,
    },

    /// Two resource names sanitize to the same identifier.
    #[error("identifier collision: resources \"{first}\" and \"{second}\" both produce identifier \"{identifier}\"")]
    IdentifierCollision {
        /// First resource name (in sorted order).
        first: String,
        /// Second resource name.
        second: String,
        /// Shared sanitized identifier.
        identifier: String,
    },

    /// The connection-string reference graph contains a cycle.
    #[error("circular reference detected: {}", chain.join(" -> "))]
    CircularReference {
        /// Cycle path; the last element repeats an earlier one.
        chain: Vec<String>,
    },

    /// A resource override names an unknown resource kind.
    #[error("invalid resource override \"{value}\": expected a Radius resource type or alias")]
    InvalidOverride {
        /// Text that failed to parse.
        value: String,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// Bicep rendering failed.
    #[error("failed to render Bicep output: {message}")]
    RenderFailure {
        /// Description of the failure.
        message: String,
    },
}

fn describe_missing(resource: Option<&str>, field: &str) -> String {
    resource.map_or_else(
        || format!("missing required field \"{field}\""),
        |name| format!("resource \"{name}\" missing required field \"{field}\""),
    )
}

impl From<std::fmt::Error> for RadifyError {
    fn from(err: std::fmt::Error) -> Self {
        Self::RenderFailure {
            message: err.to_string(),
        }
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, RadifyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collision_message_names_both_resources() {
        let err = RadifyError::IdentifierCollision {
            first: "api-service".into(),
            second: "api_service".into(),
            identifier: "api_service".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("\"api-service\""), "got: {msg}");
        assert!(msg.contains("\"api_service\" both"), "got: {msg}");
    }

    #[test]
    fn circular_reference_message_lists_chain() {
        let err = RadifyError::CircularReference {
            chain: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "circular reference detected: a -> b -> a");
    }

    #[test]
    fn missing_field_message_with_and_without_resource() {
        let top = RadifyError::MissingRequiredField {
            resource: None,
            field: "resources",
        };
        assert!(top.to_string().contains("missing required field \"resources\""));

        let nested = RadifyError::MissingRequiredField {
            resource: Some("cache".into()),
            field: "type",
        };
        assert!(nested.to_string().contains("resource \"cache\" missing"));
    }

    #[test]
    fn fmt_error_converts_to_render_failure() {
        let err = RadifyError::from(std::fmt::Error);
        assert!(matches!(err, RadifyError::RenderFailure { .. }));
    }
}
