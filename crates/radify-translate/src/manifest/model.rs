//! Typed model of an Aspire manifest document.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Root node of a parsed manifest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    /// Optional `$schema` URL.
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    /// Resources keyed by their unique name.
    pub resources: BTreeMap<String, ManifestResource>,
}

/// A single resource entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ManifestResource {
    /// Type discriminator (e.g. `container.v0`, `project.v1`, `parameter.v0`).
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Container image reference.
    pub image: Option<String>,
    /// Entrypoint override.
    pub entrypoint: Option<String>,
    /// Project file path for project resources.
    pub path: Option<String>,
    /// Connection-string template; may embed expressions.
    pub connection_string: Option<String>,
    /// Environment variables; values may embed expressions.
    pub env: BTreeMap<String, String>,
    /// Network bindings in declaration order.
    pub bindings: IndexMap<String, Binding>,
    /// Container arguments; may embed expressions.
    pub args: Vec<String>,
    /// Named volume mounts.
    pub volumes: Vec<VolumeMount>,
    /// Host bind mounts.
    pub bind_mounts: Vec<BindMount>,
    /// Literal value for value and parameter resources.
    pub value: Option<String>,
    /// Input descriptors for parameter resources.
    pub inputs: BTreeMap<String, ParameterInput>,
    /// Build configuration for containers built from a Dockerfile.
    pub build: Option<BuildConfig>,
    /// Error recorded by the manifest producer; such resources have no type.
    pub error: Option<String>,
}

impl ManifestResource {
    /// Returns `true` if the producer failed to generate this resource.
    #[must_use]
    pub fn is_producer_error(&self) -> bool {
        self.error.as_deref().is_some_and(|e| !e.trim().is_empty())
    }

    /// Returns `true` for `project.v*` resources.
    #[must_use]
    pub fn is_project(&self) -> bool {
        self.resource_type.starts_with("project.v")
    }

    /// Returns `true` for `container.v*` resources.
    #[must_use]
    pub fn is_container(&self) -> bool {
        self.resource_type.starts_with("container.v")
    }

    /// Returns `true` for containers that only produce a build artifact.
    #[must_use]
    pub fn is_build_only(&self) -> bool {
        self.build.as_ref().is_some_and(|b| b.build_only)
    }

    /// Returns the first binding in declaration order.
    #[must_use]
    pub fn first_binding(&self) -> Option<&Binding> {
        self.bindings.values().next()
    }

    /// Iterates over every string field that may embed expressions.
    pub fn expression_values(&self) -> impl Iterator<Item = &str> {
        self.env
            .values()
            .chain(self.args.iter())
            .chain(self.connection_string.iter())
            .map(String::as_str)
    }
}

/// A named network endpoint on a resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Binding {
    /// Protocol scheme (`http`, `https`, `tcp`).
    pub scheme: Option<String>,
    /// Network protocol (`tcp`, `udp`).
    pub protocol: Option<String>,
    /// Transport (`http`, `http2`, `tcp`).
    pub transport: Option<String>,
    /// Host-side port.
    pub port: Option<u16>,
    /// Container-side port.
    pub target_port: Option<u16>,
    /// Whether the endpoint is reachable from outside the application.
    pub external: bool,
}

impl Binding {
    /// Returns the target port, falling back to the port, or `0` if neither is set.
    #[must_use]
    pub fn resolved_port(&self) -> u16 {
        self.target_port.or(self.port).unwrap_or(0)
    }

    /// Returns the scheme, defaulting to `http`.
    #[must_use]
    pub fn scheme_or_default(&self) -> &str {
        self.scheme
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(radify_common::constants::DEFAULT_SCHEME)
    }

    /// Builds `scheme://host:port` for this binding.
    #[must_use]
    pub fn url(&self, host: &str) -> String {
        format!("{}://{host}:{}", self.scheme_or_default(), self.resolved_port())
    }
}

/// A named volume mount.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VolumeMount {
    /// Volume name.
    pub name: String,
    /// Mount path inside the container.
    pub target: String,
    /// Whether the mount is read-only.
    pub read_only: bool,
}

/// A host bind mount.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BindMount {
    /// Host path.
    pub source: String,
    /// Mount path inside the container.
    pub target: String,
    /// Whether the mount is read-only.
    pub read_only: bool,
}

/// Input descriptor of a parameter resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParameterInput {
    /// Input type (usually `string`).
    #[serde(rename = "type")]
    pub input_type: Option<String>,
    /// Whether the value is a secret.
    pub secret: bool,
    /// Human-readable description.
    pub description: Option<String>,
    /// Default value configuration.
    pub default: Option<ParameterDefault>,
}

/// Default value of a parameter input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParameterDefault {
    /// Literal default value.
    pub value: Option<String>,
    /// Generation settings for producer-generated values.
    pub generate: Option<GenerateSpec>,
}

/// Generation settings for a parameter default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GenerateSpec {
    /// Minimum generated length.
    pub min_length: Option<u32>,
    /// Whether special characters are allowed.
    pub special: Option<bool>,
}

/// Build configuration for a container built from source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BuildConfig {
    /// Build context directory.
    pub context: Option<String>,
    /// Dockerfile path relative to the context.
    pub dockerfile: Option<String>,
    /// Whether the image is only a build artifact with no runtime.
    pub build_only: bool,
}
