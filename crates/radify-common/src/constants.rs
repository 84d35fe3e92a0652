//! Fixed names and values used in generated output.

/// API version tag applied to every resource type in the generated document.
pub const API_VERSION: &str = "2023-10-01-preview";

/// Bicep extension declared at the top of the generated document.
pub const BICEP_EXTENSION: &str = "radius";

/// Application name used when none is configured.
pub const DEFAULT_APP_NAME: &str = "app";

/// Environment name used when none is configured.
pub const DEFAULT_ENVIRONMENT: &str = "default";

/// Recipe name used for recipe-provisioned backing services.
pub const DEFAULT_RECIPE: &str = "default";

/// Bicep identifier of the synthesized application resource.
pub const APP_IDENTIFIER: &str = "app";

/// Bicep identifier and runtime name of the synthesized gateway resource.
pub const GATEWAY_IDENTIFIER: &str = "gateway";

/// Name of the Bicep parameter holding the environment ID.
pub const ENVIRONMENT_PARAM: &str = "environment";

/// Name of the Bicep parameter holding the application name.
pub const APPLICATION_PARAM: &str = "application";

/// Identifiers owned by synthesized declarations.
///
/// Manifest resources that sanitize to one of these are prefixed.
pub const RESERVED_IDENTIFIERS: &[&str] = &[
    APP_IDENTIFIER,
    GATEWAY_IDENTIFIER,
    ENVIRONMENT_PARAM,
    APPLICATION_PARAM,
];

/// Prefix applied to identifiers that start with a digit or are reserved.
pub const IDENTIFIER_PREFIX: &str = "r_";

/// Identifier substituted when a name has no valid characters.
pub const PLACEHOLDER_IDENTIFIER: &str = "r_unnamed";

/// Scheme used when a binding does not declare one.
pub const DEFAULT_SCHEME: &str = "http";

/// Route path used for every gateway route.
pub const GATEWAY_ROUTE_PATH: &str = "/";

/// Volume kind assigned to mapped volumes and bind mounts.
pub const VOLUME_KIND: &str = "ephemeral";

/// File name written by the CLI.
pub const OUTPUT_FILE: &str = "app.bicep";

/// Manifest file name assumed by the CLI when none is given.
pub const DEFAULT_MANIFEST: &str = "aspire-manifest.json";

/// Warning returned when nothing in the manifest can be translated.
pub const EMPTY_MANIFEST_WARNING: &str = "No translatable resources found in manifest";

/// Binary name for the CLI.
pub const BIN_NAME: &str = "radify";
