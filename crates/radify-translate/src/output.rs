//! Output records produced by the mapper and synthesizer and consumed by the
//! emitter.

use std::collections::BTreeMap;

use radify_common::types::{OutputKind, PortableKind};
use serde::Serialize;

/// One segment of a resolved value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedSegment {
    /// Literal text, escaped at render time.
    Text(String),
    /// A Bicep expression rendered as `${expr}`.
    Symbol(String),
}

/// A string value after expression resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedValue {
    segments: Vec<ResolvedSegment>,
}

impl ResolvedValue {
    /// Creates a value made of literal text only.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        let mut value = Self::default();
        value.push_text(text);
        value
    }

    /// Creates a value made of a single Bicep expression.
    #[must_use]
    pub fn symbol(expr: impl Into<String>) -> Self {
        Self {
            segments: vec![ResolvedSegment::Symbol(expr.into())],
        }
    }

    /// Appends literal text, merging with a preceding text segment.
    pub fn push_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text.is_empty() {
            return;
        }
        if let Some(ResolvedSegment::Text(last)) = self.segments.last_mut() {
            last.push_str(&text);
        } else {
            self.segments.push(ResolvedSegment::Text(text));
        }
    }

    /// Appends every segment of `other`.
    pub fn append(&mut self, other: Self) {
        for segment in other.segments {
            match segment {
                ResolvedSegment::Text(text) => self.push_text(text),
                symbol @ ResolvedSegment::Symbol(_) => self.segments.push(symbol),
            }
        }
    }

    /// Returns the segments in order.
    #[must_use]
    pub fn segments(&self) -> &[ResolvedSegment] {
        &self.segments
    }

    /// Returns `true` if any segment is a Bicep expression.
    #[must_use]
    pub fn is_interpolated(&self) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, ResolvedSegment::Symbol(_)))
    }

    /// Returns the value as plain text if it holds no expressions.
    #[must_use]
    pub fn as_literal(&self) -> Option<String> {
        if self.is_interpolated() {
            return None;
        }
        Some(
            self.segments
                .iter()
                .map(|s| match s {
                    ResolvedSegment::Text(t) | ResolvedSegment::Symbol(t) => t.as_str(),
                })
                .collect(),
        )
    }
}

/// A dependency edge from a container to another resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSpec {
    /// Literal address or Bicep expression.
    pub source: String,
    /// Whether `source` is a Bicep expression rather than a string literal.
    pub symbolic: bool,
}

impl ConnectionSpec {
    /// A connection whose source is a literal address.
    #[must_use]
    pub fn literal(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            symbolic: false,
        }
    }

    /// A connection whose source is a Bicep expression.
    #[must_use]
    pub fn symbolic(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            symbolic: true,
        }
    }
}

/// Connections keyed by the referenced resource name.
pub type Connections = BTreeMap<String, ConnectionSpec>;

/// A container port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortSpec {
    /// Port inside the container.
    pub container_port: u16,
    /// Upper-cased protocol; `TCP` is implied when empty.
    pub protocol: Option<String>,
    /// URL scheme.
    pub scheme: Option<String>,
}

/// A container volume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumeSpec {
    /// Volume kind.
    pub kind: String,
    /// Mount path inside the container.
    pub mount_path: String,
    /// Whether the mount is read-only.
    pub read_only: bool,
}

/// Properties of a container resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerSpec {
    /// Image reference.
    pub image: String,
    /// Command override.
    pub command: Vec<String>,
    /// Resolved arguments.
    pub args: Vec<ResolvedValue>,
    /// Ports keyed by binding name.
    pub ports: BTreeMap<String, PortSpec>,
    /// Resolved environment keyed by variable name.
    pub env: BTreeMap<String, ResolvedValue>,
    /// Volumes keyed by volume name.
    pub volumes: BTreeMap<String, VolumeSpec>,
    /// Outgoing connections.
    pub connections: Connections,
}

/// A gateway route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayRoute {
    /// Route path prefix.
    pub path: String,
    /// Destination URL.
    pub destination: String,
}

/// Variant-specific payload of an output resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputBody {
    /// A container.
    Container(ContainerSpec),
    /// A recipe-provisioned backing service.
    Portable {
        /// Backing-service kind.
        kind: PortableKind,
        /// Recipe name.
        recipe: String,
    },
    /// The gateway, with ordered routes.
    Gateway {
        /// Routes in emission order.
        routes: Vec<GatewayRoute>,
    },
    /// The application root.
    Application,
}

/// A resource declaration in the generated document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputResource {
    /// Bicep identifier.
    pub identifier: String,
    /// Runtime name (the original manifest name for mapped resources).
    pub name: String,
    /// Variant payload.
    pub body: OutputBody,
}

impl OutputResource {
    /// Returns the summary kind of this resource.
    #[must_use]
    pub const fn kind(&self) -> OutputKind {
        match &self.body {
            OutputBody::Container(_) => OutputKind::Container,
            OutputBody::Portable { kind, .. } => OutputKind::Portable(*kind),
            OutputBody::Gateway { .. } => OutputKind::Gateway,
            OutputBody::Application => OutputKind::Application,
        }
    }

    /// Returns `true` for resources that were not in the manifest.
    #[must_use]
    pub const fn is_synthesized(&self) -> bool {
        matches!(self.body, OutputBody::Gateway { .. } | OutputBody::Application)
    }
}

/// A Bicep parameter declaration derived from a manifest parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BicepParameter {
    /// Original manifest name.
    pub source: String,
    /// Bicep identifier.
    pub name: String,
    /// Default value; always `None` for secure parameters.
    pub default_value: Option<String>,
    /// Whether the parameter carries `@secure()`.
    pub secure: bool,
    /// Text of the `@description` decorator.
    pub description: String,
}

/// Summary entry for one generated declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslatedResource {
    /// Original manifest name, or the runtime name of a synthesized resource.
    pub name: String,
    /// Bicep identifier.
    pub identifier: String,
    /// Output kind.
    pub kind: OutputKind,
    /// Whether the declaration was synthesized rather than mapped.
    pub synthesized: bool,
}

impl From<&OutputResource> for TranslatedResource {
    fn from(resource: &OutputResource) -> Self {
        Self {
            name: resource.name.clone(),
            identifier: resource.identifier.clone(),
            kind: resource.kind(),
            synthesized: resource.is_synthesized(),
        }
    }
}

impl From<&BicepParameter> for TranslatedResource {
    fn from(param: &BicepParameter) -> Self {
        Self {
            name: param.source.clone(),
            identifier: param.name.clone(),
            kind: OutputKind::Parameter,
            synthesized: false,
        }
    }
}
