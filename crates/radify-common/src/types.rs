//! Resource kind discriminators shared by the pipeline and the CLI.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RadifyError;

/// Radius type of a generic container.
pub const CONTAINER_TYPE: &str = "Applications.Core/containers";
/// Radius type of the gateway resource.
pub const GATEWAY_TYPE: &str = "Applications.Core/gateways";
/// Radius type of the application resource.
pub const APPLICATION_TYPE: &str = "Applications.Core/applications";

/// A recipe-provisioned backing service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PortableKind {
    /// `Applications.Datastores/redisCaches`.
    RedisCache,
    /// `Applications.Datastores/sqlDatabases`.
    SqlDatabase,
    /// `Applications.Datastores/mongoDatabases`.
    MongoDatabase,
    /// `Applications.Messaging/rabbitMQQueues`.
    RabbitMqQueue,
}

impl PortableKind {
    /// Returns the fully qualified Radius resource type.
    #[must_use]
    pub const fn radius_type(self) -> &'static str {
        match self {
            Self::RedisCache => "Applications.Datastores/redisCaches",
            Self::SqlDatabase => "Applications.Datastores/sqlDatabases",
            Self::MongoDatabase => "Applications.Datastores/mongoDatabases",
            Self::RabbitMqQueue => "Applications.Messaging/rabbitMQQueues",
        }
    }
}

/// Classification assigned to every manifest resource.
///
/// Serialized through its [`Display`](fmt::Display) form, so configuration
/// files may use either full Radius type names or short aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ResourceKind {
    /// A generic container.
    Container,
    /// A backing service provisioned by a recipe.
    Portable(PortableKind),
    /// A value resource, inlined into its consumers.
    Value,
    /// A parameter resource, emitted as a Bicep parameter.
    Parameter,
    /// A resource type the translator does not handle.
    Unsupported,
}

impl ResourceKind {
    /// Returns `true` for recipe-provisioned backing services.
    #[must_use]
    pub const fn is_portable(self) -> bool {
        matches!(self, Self::Portable(_))
    }

    /// Returns `true` if the kind produces a Bicep resource declaration.
    #[must_use]
    pub const fn is_materialized(self) -> bool {
        matches!(self, Self::Container | Self::Portable(_))
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Container => f.write_str(CONTAINER_TYPE),
            Self::Portable(kind) => f.write_str(kind.radius_type()),
            Self::Value => f.write_str("value"),
            Self::Parameter => f.write_str("parameter"),
            Self::Unsupported => f.write_str("unsupported"),
        }
    }
}

impl FromStr for ResourceKind {
    type Err = RadifyError;

    /// Parses a full Radius type name or a short alias, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = match s.trim().to_ascii_lowercase().as_str() {
            "applications.core/containers" | "container" => Self::Container,
            "applications.datastores/rediscaches" | "redis" => {
                Self::Portable(PortableKind::RedisCache)
            }
            "applications.datastores/sqldatabases" | "sql" | "postgres" | "mysql" => {
                Self::Portable(PortableKind::SqlDatabase)
            }
            "applications.datastores/mongodatabases" | "mongo" | "mongodb" => {
                Self::Portable(PortableKind::MongoDatabase)
            }
            "applications.messaging/rabbitmqqueues" | "rabbitmq" => {
                Self::Portable(PortableKind::RabbitMqQueue)
            }
            "value" => Self::Value,
            "parameter" => Self::Parameter,
            _ => {
                return Err(RadifyError::InvalidOverride {
                    value: s.to_string(),
                });
            }
        };
        Ok(kind)
    }
}

impl TryFrom<String> for ResourceKind {
    type Error = RadifyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ResourceKind> for String {
    fn from(kind: ResourceKind) -> Self {
        kind.to_string()
    }
}

/// Kind of an entry in the translation summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OutputKind {
    /// A container resource.
    Container,
    /// A recipe-provisioned backing service.
    Portable(PortableKind),
    /// The synthesized gateway.
    Gateway,
    /// The synthesized application root.
    Application,
    /// A Bicep parameter declaration.
    Parameter,
}

impl OutputKind {
    /// Returns the Radius type, or `None` for parameters.
    #[must_use]
    pub const fn radius_type(self) -> Option<&'static str> {
        match self {
            Self::Container => Some(CONTAINER_TYPE),
            Self::Portable(kind) => Some(kind.radius_type()),
            Self::Gateway => Some(GATEWAY_TYPE),
            Self::Application => Some(APPLICATION_TYPE),
            Self::Parameter => None,
        }
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.radius_type().unwrap_or("parameter"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_type_names() {
        assert_eq!(
            "Applications.Datastores/redisCaches".parse::<ResourceKind>().expect("parse"),
            ResourceKind::Portable(PortableKind::RedisCache)
        );
        assert_eq!(
            "Applications.Core/containers".parse::<ResourceKind>().expect("parse"),
            ResourceKind::Container
        );
        assert_eq!(
            "Applications.Messaging/rabbitMQQueues".parse::<ResourceKind>().expect("parse"),
            ResourceKind::Portable(PortableKind::RabbitMqQueue)
        );
    }

    #[test]
    fn parse_aliases_case_insensitively() {
        assert_eq!(
            "Postgres".parse::<ResourceKind>().expect("parse"),
            ResourceKind::Portable(PortableKind::SqlDatabase)
        );
        assert_eq!(
            " mongo ".parse::<ResourceKind>().expect("parse"),
            ResourceKind::Portable(PortableKind::MongoDatabase)
        );
        assert_eq!("VALUE".parse::<ResourceKind>().expect("parse"), ResourceKind::Value);
    }

    #[test]
    fn parse_rejects_synthesized_and_unknown_kinds() {
        for text in ["Applications.Core/gateways", "unsupported", "kafka", ""] {
            let err = text.parse::<ResourceKind>().unwrap_err();
            assert!(matches!(err, RadifyError::InvalidOverride { .. }), "{text}");
        }
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for kind in [
            ResourceKind::Container,
            ResourceKind::Portable(PortableKind::RedisCache),
            ResourceKind::Portable(PortableKind::SqlDatabase),
            ResourceKind::Portable(PortableKind::MongoDatabase),
            ResourceKind::Portable(PortableKind::RabbitMqQueue),
            ResourceKind::Value,
            ResourceKind::Parameter,
        ] {
            let back: ResourceKind = kind.to_string().parse().expect("parse");
            assert_eq!(back, kind);
        }
    }

    #[test]
    fn only_containers_and_portables_materialize() {
        assert!(ResourceKind::Container.is_materialized());
        assert!(ResourceKind::Portable(PortableKind::RedisCache).is_materialized());
        assert!(!ResourceKind::Value.is_materialized());
        assert!(!ResourceKind::Parameter.is_materialized());
        assert!(!ResourceKind::Unsupported.is_materialized());
    }

    #[test]
    fn output_kind_display() {
        assert_eq!(OutputKind::Gateway.to_string(), GATEWAY_TYPE);
        assert_eq!(OutputKind::Parameter.to_string(), "parameter");
    }
}
